//! Registration, credential checks and session issuance.

use chrono::Duration;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument};

use super::error::AuthError;
use super::password::{self, MAX_PASSWORD_BYTES};
use super::store::{CredentialStore, InsertOutcome};
use super::token::{self, SessionTokens};

static USERNAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Usernames are 1-64 characters of letters, digits, `.`, `_`, `-` or `@`.
pub fn valid_username(username: &str) -> bool {
    USERNAME_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._@-]{1,64}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(username))
}

pub fn valid_password(password: &str) -> bool {
    !password.is_empty() && password.len() <= MAX_PASSWORD_BYTES
}

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    session_ttl: Duration,
}

impl Authenticator {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    /// Create a user with a bcrypt hash and no session.
    ///
    /// # Errors
    /// `InvalidInput` for a bad username or password, `DuplicateUser` when the
    /// username is taken, `Persistence`/`Hashing` on internal failures.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if !valid_username(username) {
            return Err(AuthError::InvalidInput("Invalid username"));
        }
        if !valid_password(password) {
            return Err(AuthError::InvalidInput("Invalid password"));
        }

        let hash = hash_blocking(password.to_string()).await?;

        match self
            .store
            .insert_user(username, &hash)
            .await
            .map_err(AuthError::Persistence)?
        {
            InsertOutcome::Created => {
                info!("User registered");
                Ok(())
            }
            InsertOutcome::Conflict => {
                debug!("Username already taken");
                Err(AuthError::DuplicateUser)
            }
        }
    }

    /// Verify credentials, then issue and persist a fresh session pair.
    ///
    /// Any earlier session of the same user is overwritten.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown user or wrong password (the two are
    /// indistinguishable), `Persistence`/`Hashing`/`TokenGeneration` otherwise.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionTokens, AuthError> {
        if username.is_empty() || !valid_password(password) {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(hash) = self
            .store
            .password_hash(username)
            .await
            .map_err(AuthError::Persistence)?
        else {
            debug!("Unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(password.to_string(), hash).await? {
            debug!("Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = token::issue_session_pair(self.session_ttl)?;

        if !self
            .store
            .set_session(username, &tokens)
            .await
            .map_err(AuthError::Persistence)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        info!(expires_at = %tokens.expires_at, "Session issued");
        Ok(tokens)
    }

    /// Drop the user's session. Logging out twice is not an error.
    ///
    /// # Errors
    /// `Persistence` if the store update fails.
    #[instrument(skip(self))]
    pub async fn logout(&self, username: &str) -> Result<(), AuthError> {
        self.store
            .clear_session(username)
            .await
            .map_err(AuthError::Persistence)?;
        info!("Session cleared");
        Ok(())
    }
}

// bcrypt is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(AuthError::Internal)?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(AuthError::Internal)?
}
