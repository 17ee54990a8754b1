//! # Webauth (session + CSRF authentication)
//!
//! `webauth` registers users, authenticates credentials and issues a session
//! token plus a CSRF token per login. Both tokens are persisted next to the
//! user's bcrypt hash and validated on every protected request.
//!
//! ## Tokens
//!
//! - **Session token:** travels only in the `HttpOnly` `session_token` cookie.
//! - **CSRF token:** set in the script-readable `csrf_token` cookie and echoed
//!   back by the client in the `X-CSRF-Token` header (or a `csrf_token` form
//!   field). The cookie value itself is never accepted as proof.
//!
//! A user has at most one live session; logging in again overwrites the
//! previous tokens. Expired tokens are not purged, they are rejected when
//! presented.

pub mod cli;
pub mod webauth;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
