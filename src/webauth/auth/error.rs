//! Error taxonomy for the auth core and its HTTP mapping.
//!
//! Response bodies are fixed strings. Whatever detail an error carries (deny
//! reason, store error chain) is for logs only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::{error, warn};

/// Why the Session Authorizer rejected a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    MissingSessionToken,
    UnknownSession,
    ExpiredOrMismatchedSession,
    MissingCsrfToken,
    InvalidCsrfToken,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::MissingSessionToken => "missing session token",
            Self::UnknownSession => "unknown session",
            Self::ExpiredOrMismatchedSession => "expired or mismatched session",
            Self::MissingCsrfToken => "missing csrf token",
            Self::InvalidCsrfToken => "invalid csrf token",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("user already exists")]
    DuplicateUser,

    /// Same variant for an unknown username and a wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("unauthorized: {0}")]
    Unauthorized(DenyReason),

    #[error("credential store failure")]
    Persistence(#[source] anyhow::Error),

    #[error("password hashing failure")]
    Hashing(#[source] bcrypt::BcryptError),

    #[error("token generation failure")]
    TokenGeneration(#[source] rand::Error),

    #[error("session expiry out of range")]
    ExpiryOutOfRange,

    #[error("background task failure")]
    Internal(#[source] tokio::task::JoinError),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateUser => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Persistence(_)
            | Self::Hashing(_)
            | Self::TokenGeneration(_)
            | Self::ExpiryOutOfRange
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(message) => *message,
            Self::DuplicateUser => "User already exists",
            Self::InvalidCredentials => "Invalid username or password",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Persistence(_)
            | Self::Hashing(_)
            | Self::TokenGeneration(_)
            | Self::ExpiryOutOfRange
            | Self::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::Persistence(err) => error!("Credential store failure: {err:#}"),
            Self::Hashing(err) => error!("Password hashing failure: {err}"),
            Self::TokenGeneration(err) => error!("Token generation failure: {err}"),
            Self::ExpiryOutOfRange => error!("Session expiry does not fit in a timestamp"),
            Self::Internal(err) => error!("Background task failure: {err}"),
            Self::Unauthorized(reason) => warn!("Request denied: {reason}"),
            Self::InvalidInput(_) | Self::DuplicateUser | Self::InvalidCredentials => {}
        }

        (self.status(), self.public_message().to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn unauthorized_is_opaque_for_every_reason() {
        let reasons = [
            DenyReason::MissingSessionToken,
            DenyReason::UnknownSession,
            DenyReason::ExpiredOrMismatchedSession,
            DenyReason::MissingCsrfToken,
            DenyReason::InvalidCsrfToken,
        ];
        for reason in reasons {
            let err = AuthError::Unauthorized(reason);
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.public_message(), "Unauthorized");
        }
    }

    #[test]
    fn persistence_detail_stays_internal() {
        let err = AuthError::Persistence(anyhow!("connection refused to 10.0.0.7"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("10.0.0.7"));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AuthError::InvalidInput("Invalid username").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateUser.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn expiry_overflow_is_internal() {
        let err = AuthError::ExpiryOutOfRange;
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn deny_reason_display() {
        assert_eq!(
            DenyReason::ExpiredOrMismatchedSession.to_string(),
            "expired or mismatched session"
        );
        assert_eq!(DenyReason::MissingCsrfToken.to_string(), "missing csrf token");
    }
}
