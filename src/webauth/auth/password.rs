//! Password hashing and verification (bcrypt).

use super::error::AuthError;

/// bcrypt work factor: 2^10 rounds.
pub const BCRYPT_COST: u32 = 10;

/// bcrypt only consumes the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with a fresh salt.
///
/// # Errors
/// Returns `AuthError::Hashing` if bcrypt fails internally.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(AuthError::Hashing)
}

/// Check a password against a stored hash.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
///
/// # Errors
/// Returns `AuthError::Hashing` if `hash` is not a valid bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(AuthError::Hashing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_own_hash() {
        let hash = hash_password("secret1").expect("hash");
        assert!(verify_password("secret1", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_other_password() {
        let hash = hash_password("secret1").expect("hash");
        assert!(!verify_password("secret2", &hash).expect("verify"));
    }

    #[test]
    fn hash_is_salted_and_uses_cost() {
        let first = hash_password("secret1").expect("hash");
        let second = hash_password("secret1").expect("hash");
        assert_ne!(first, second);
        assert!(first.starts_with("$2b$10$"), "unexpected hash prefix: {first}");
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let result = verify_password("secret1", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }
}
