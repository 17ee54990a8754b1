use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch, telemetry,
};
use anyhow::Result;

/// Parse the command line, install logging and return the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be installed or required arguments are missing
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches
        .get_one::<u8>(logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);

    telemetry::init(logging::level_for(verbosity))?;

    dispatch::handler(&matches)
}
