//! Session Authorizer.
//!
//! Flow: session cookie → owning user → stored session must match and be
//! unexpired → CSRF header must match the stored CSRF token. Every rejection
//! carries a `DenyReason` for the logs; callers map them all to one 401.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::cookies::PresentedTokens;
use super::error::{AuthError, DenyReason};
use super::store::CredentialStore;

pub struct SessionAuthorizer {
    store: Arc<dyn CredentialStore>,
}

impl SessionAuthorizer {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolve and fully authorize the request, returning the username.
    ///
    /// # Errors
    /// `Unauthorized` on any failed check, `Persistence` on store failure.
    pub async fn authorize(&self, presented: &PresentedTokens) -> Result<String, AuthError> {
        self.authorize_at(presented, Utc::now()).await
    }

    /// Same as [`Self::authorize`] with an explicit clock.
    ///
    /// # Errors
    /// `Unauthorized` on any failed check, `Persistence` on store failure.
    #[instrument(skip_all)]
    pub async fn authorize_at(
        &self,
        presented: &PresentedTokens,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let session_token = presented
            .session_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthorized(DenyReason::MissingSessionToken))?;

        let username = self
            .store
            .username_for_session(session_token)
            .await
            .map_err(AuthError::Persistence)?
            .ok_or(AuthError::Unauthorized(DenyReason::UnknownSession))?;

        // Re-read the row by username; the token may have been rotated or
        // cleared between the two lookups.
        let record = self
            .store
            .session(&username)
            .await
            .map_err(AuthError::Persistence)?
            .filter(|record| {
                tokens_match(&record.session_token, session_token) && now <= record.expires_at
            })
            .ok_or(AuthError::Unauthorized(
                DenyReason::ExpiredOrMismatchedSession,
            ))?;

        let csrf_token = presented
            .csrf_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthorized(DenyReason::MissingCsrfToken))?;

        if !tokens_match(&record.csrf_token, csrf_token) {
            return Err(AuthError::Unauthorized(DenyReason::InvalidCsrfToken));
        }

        debug!(username = %username, "Request authorized");
        Ok(username)
    }
}

/// Compare without short-circuiting on the first differing byte.
fn tokens_match(stored: &str, presented: &str) -> bool {
    let stored = stored.as_bytes();
    let presented = presented.as_bytes();
    if stored.len() != presented.len() {
        return false;
    }
    stored
        .iter()
        .zip(presented)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::super::memory::MemoryCredentialStore;
    use super::super::token::SessionTokens;
    use super::*;
    use chrono::{Duration, TimeZone};

    struct Fixture {
        store: Arc<MemoryCredentialStore>,
        authorizer: SessionAuthorizer,
        tokens: SessionTokens,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryCredentialStore::new());
        let tokens = SessionTokens {
            session_token: "session-alice".to_string(),
            csrf_token: "csrf-alice".to_string(),
            expires_at: Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap(),
        };
        store.insert_user("alice", "hash").await.ok();
        store.set_session("alice", &tokens).await.ok();
        let authorizer = SessionAuthorizer::new(store.clone());
        Fixture {
            store,
            authorizer,
            tokens,
        }
    }

    fn presented(session: Option<&str>, csrf: Option<&str>) -> PresentedTokens {
        PresentedTokens {
            session_token: session.map(str::to_string),
            csrf_token: csrf.map(str::to_string),
        }
    }

    fn reason(result: Result<String, AuthError>) -> Option<DenyReason> {
        match result {
            Err(AuthError::Unauthorized(reason)) => Some(reason),
            _ => None,
        }
    }

    #[tokio::test]
    async fn both_tokens_valid_resolves_user() {
        let f = fixture().await;
        let now = f.tokens.expires_at - Duration::hours(1);
        let result = f
            .authorizer
            .authorize_at(&presented(Some("session-alice"), Some("csrf-alice")), now)
            .await;
        assert_eq!(result.ok().as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn missing_session_token() {
        let f = fixture().await;
        let now = f.tokens.expires_at - Duration::hours(1);
        for session in [None, Some("")] {
            let result = f
                .authorizer
                .authorize_at(&presented(session, Some("csrf-alice")), now)
                .await;
            assert_eq!(reason(result), Some(DenyReason::MissingSessionToken));
        }
    }

    #[tokio::test]
    async fn wrong_session_token_is_unknown() {
        let f = fixture().await;
        let now = f.tokens.expires_at - Duration::hours(1);
        let result = f
            .authorizer
            .authorize_at(&presented(Some("session-mallory"), Some("csrf-alice")), now)
            .await;
        assert_eq!(reason(result), Some(DenyReason::UnknownSession));
    }

    #[tokio::test]
    async fn wrong_csrf_token_fails() {
        let f = fixture().await;
        let now = f.tokens.expires_at - Duration::hours(1);
        let result = f
            .authorizer
            .authorize_at(&presented(Some("session-alice"), Some("csrf-mallory")), now)
            .await;
        assert_eq!(reason(result), Some(DenyReason::InvalidCsrfToken));
    }

    #[tokio::test]
    async fn missing_csrf_token_fails() {
        let f = fixture().await;
        let now = f.tokens.expires_at - Duration::hours(1);
        let result = f
            .authorizer
            .authorize_at(&presented(Some("session-alice"), None), now)
            .await;
        assert_eq!(reason(result), Some(DenyReason::MissingCsrfToken));
    }

    #[tokio::test]
    async fn expiry_boundary() {
        let f = fixture().await;
        let tokens = presented(Some("session-alice"), Some("csrf-alice"));

        let before = f.tokens.expires_at - Duration::seconds(1);
        assert!(f.authorizer.authorize_at(&tokens, before).await.is_ok());

        let at = f.tokens.expires_at;
        assert!(f.authorizer.authorize_at(&tokens, at).await.is_ok());

        let after = f.tokens.expires_at + Duration::seconds(1);
        let result = f.authorizer.authorize_at(&tokens, after).await;
        assert_eq!(reason(result), Some(DenyReason::ExpiredOrMismatchedSession));
    }

    #[tokio::test]
    async fn cleared_session_is_rejected() {
        let f = fixture().await;
        f.store.clear_session("alice").await.ok();
        let now = f.tokens.expires_at - Duration::hours(1);
        let result = f
            .authorizer
            .authorize_at(&presented(Some("session-alice"), Some("csrf-alice")), now)
            .await;
        assert_eq!(reason(result), Some(DenyReason::UnknownSession));
    }

    #[test]
    fn tokens_match_compares_exactly() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "abcd"));
        assert!(!tokens_match("", "a"));
    }
}
