use chrono::Duration;
use std::sync::Arc;

use super::authenticator::Authenticator;
use super::authorizer::SessionAuthorizer;
use super::store::CredentialStore;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: i64,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    /// Clamped to `1..=MAX_SESSION_TTL_SECONDS`.
    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds.clamp(1, MAX_SESSION_TTL_SECONDS);
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_seconds)
    }

    /// Only mark cookies `Secure` when the site is served over HTTPS.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the handlers need, shared behind an `Arc` extension.
pub struct AuthState {
    config: AuthConfig,
    store: Arc<dyn CredentialStore>,
    authenticator: Authenticator,
    authorizer: SessionAuthorizer,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        let authenticator = Authenticator::new(store.clone(), config.session_ttl());
        let authorizer = SessionAuthorizer::new(store.clone());
        Self {
            config,
            store,
            authenticator,
            authorizer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn authorizer(&self) -> &SessionAuthorizer {
        &self.authorizer
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory::MemoryCredentialStore;
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl(), Duration::hours(24));
        assert!(!config.cookie_secure());

        let config = config
            .with_session_ttl_seconds(60)
            .with_cookie_secure(true);
        assert_eq!(config.session_ttl(), Duration::seconds(60));
        assert!(config.cookie_secure());
    }

    #[test]
    fn session_ttl_is_clamped() {
        let config = AuthConfig::new().with_session_ttl_seconds(10_000_000_000_000);
        assert_eq!(config.session_ttl_seconds(), MAX_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl(), Duration::days(365));

        let config = AuthConfig::new().with_session_ttl_seconds(i64::MAX);
        assert_eq!(config.session_ttl_seconds(), MAX_SESSION_TTL_SECONDS);

        let config = AuthConfig::new().with_session_ttl_seconds(-5);
        assert_eq!(config.session_ttl_seconds(), 1);
    }

    #[test]
    fn auth_state_constructs_with_memory_store() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let state = AuthState::new(AuthConfig::new().with_session_ttl_seconds(5), store);
        assert_eq!(state.config().session_ttl_seconds(), 5);
    }
}
