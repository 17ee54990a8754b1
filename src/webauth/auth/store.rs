//! Credential Store seam.
//!
//! One row per username holding the password hash and the current session
//! triple. Implementations must write the triple in a single statement so the
//! three fields are never observed partially set.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::token::SessionTokens;

/// Outcome of inserting a new user row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

/// Session fields currently stored for a user. `None` when logged out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_token: String,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionTokens> for SessionRecord {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            session_token: tokens.session_token,
            csrf_token: tokens.csrf_token,
            expires_at: tokens.expires_at,
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user with null session fields.
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome>;

    /// Stored bcrypt hash, `None` if the user does not exist.
    async fn password_hash(&self, username: &str) -> Result<Option<String>>;

    /// Overwrite the session triple. Returns `false` if the user does not exist.
    async fn set_session(&self, username: &str, tokens: &SessionTokens) -> Result<bool>;

    /// Owner of a session token, regardless of expiry.
    async fn username_for_session(&self, session_token: &str) -> Result<Option<String>>;

    /// Current session triple for a user.
    async fn session(&self, username: &str) -> Result<Option<SessionRecord>>;

    /// Null the session triple. Succeeds for unknown or logged-out users.
    async fn clear_session(&self, username: &str) -> Result<()>;

    /// Round trip to the backing store, used by the health check.
    async fn ping(&self) -> Result<()>;
}
