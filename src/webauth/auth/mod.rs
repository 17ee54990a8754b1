//! Auth core: password hashing, token issuance, the credential store seam,
//! the Authenticator and the Session Authorizer.
//!
//! ## Session model
//!
//! Each user row holds at most one session triple (session token, CSRF token,
//! expiry). Login overwrites it, logout nulls it, and expiry is checked lazily
//! when a token is presented.
//!
//! ## Error posture
//!
//! Authorization failures are logged with their `DenyReason` but surface to
//! clients as a bare `401 Unauthorized`. Login never reveals whether the
//! username or the password was wrong.

pub mod authenticator;
pub mod authorizer;
pub mod cookies;
pub mod error;
pub mod memory;
pub mod password;
mod state;
pub mod storage;
pub mod store;
pub mod token;

pub use authenticator::Authenticator;
pub use authorizer::SessionAuthorizer;
pub use cookies::PresentedTokens;
pub use error::{AuthError, DenyReason};
pub use memory::MemoryCredentialStore;
pub use state::{AuthConfig, AuthState, MAX_SESSION_TTL_SECONDS};
pub use storage::PgCredentialStore;
pub use store::{CredentialStore, InsertOutcome, SessionRecord};
pub use token::SessionTokens;
