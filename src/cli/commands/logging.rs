use clap::{builder::ValueParser, Arg, ArgAction, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Log levels by `-v` count; `-v` is warn, `-vvvv` and above is trace.
const LEVELS: [(&str, Level); 5] = [
    ("error", Level::ERROR),
    ("warn", Level::WARN),
    ("info", Level::INFO),
    ("debug", Level::DEBUG),
    ("trace", Level::TRACE),
];

/// Accept either a level name or its `-v` count, yielding the count.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        let level = level.trim().to_lowercase();
        if let Ok(count) = level.parse::<u8>() {
            return (usize::from(count) < LEVELS.len())
                .then_some(count)
                .ok_or_else(|| format!("log level count must be below {}", LEVELS.len()));
        }
        LEVELS
            .iter()
            .position(|(name, _)| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level: {level}"))
    })
}

/// Level for a `-v` count. `None` leaves the filter at its error default.
#[must_use]
pub fn level_for(count: u8) -> Option<Level> {
    match count {
        0 => None,
        count => LEVELS
            .get(usize::from(count))
            .or_else(|| LEVELS.last())
            .map(|(_, level)| *level),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("WEBAUTH_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
