//! In-process credential store backed by a map.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::store::{CredentialStore, InsertOutcome, SessionRecord};
use super::token::SessionTokens;

#[derive(Clone, Debug)]
struct UserRow {
    password_hash: String,
    session: Option<SessionRecord>,
}

/// Map-backed `CredentialStore`. Each operation takes the lock once, so the
/// session triple changes atomically like a single-row update.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, UserRow>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Ok(InsertOutcome::Conflict);
        }
        users.insert(
            username.to_string(),
            UserRow {
                password_hash: password_hash.to_string(),
                session: None,
            },
        );
        Ok(InsertOutcome::Created)
    }

    async fn password_hash(&self, username: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users.get(username).map(|row| row.password_hash.clone()))
    }

    async fn set_session(&self, username: &str, tokens: &SessionTokens) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(row) = users.get_mut(username) else {
            return Ok(false);
        };
        row.session = Some(SessionRecord::from(tokens.clone()));
        Ok(true)
    }

    async fn username_for_session(&self, session_token: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users.iter().find_map(|(username, row)| {
            row.session
                .as_ref()
                .filter(|session| session.session_token == session_token)
                .map(|_| username.clone())
        }))
    }

    async fn session(&self, username: &str) -> Result<Option<SessionRecord>> {
        let users = self.users.read().await;
        Ok(users.get(username).and_then(|row| row.session.clone()))
    }

    async fn clear_session(&self, username: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(row) = users.get_mut(username) {
            row.session = None;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
