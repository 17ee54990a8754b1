//! Session and CSRF token issuance.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::{rngs::OsRng, RngCore};

use super::error::AuthError;

/// Entropy per token: 32 bytes = 256 bits.
pub const TOKEN_BYTES: usize = 32;

/// Session and CSRF tokens issued together at login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionTokens {
    pub session_token: String,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Draw `byte_len` bytes from the OS CSPRNG and encode them as unpadded
/// URL-safe base64.
///
/// # Errors
/// Returns `AuthError::TokenGeneration` if the OS random source fails. There is
/// no weaker fallback.
pub fn new_token(byte_len: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; byte_len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(AuthError::TokenGeneration)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Issue an independent session/CSRF pair valid for `ttl` from now.
///
/// The expiry is truncated to whole seconds so it survives a round trip
/// through the store and the cookie `Expires` attribute unchanged.
///
/// # Errors
/// Returns `AuthError::TokenGeneration` if either token cannot be drawn and
/// `AuthError::ExpiryOutOfRange` if `now + ttl` is not a representable time.
pub fn issue_session_pair(ttl: Duration) -> Result<SessionTokens, AuthError> {
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(AuthError::ExpiryOutOfRange)?
        .trunc_subsecs(0);

    Ok(SessionTokens {
        session_token: new_token(TOKEN_BYTES)?,
        csrf_token: new_token(TOKEN_BYTES)?,
        expires_at,
    })
}
