//! Cookie and header transport for the session and CSRF tokens.
//!
//! The session token only ever travels in an `HttpOnly` cookie. The CSRF token
//! is handed out in a script-readable cookie but is only accepted back from the
//! `X-CSRF-Token` header or a `csrf_token` form field.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::{DateTime, Utc};

use super::state::AuthConfig;
use super::token::SessionTokens;

pub const SESSION_COOKIE_NAME: &str = "session_token";
pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Tokens a request presents to the Session Authorizer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentedTokens {
    pub session_token: Option<String>,
    pub csrf_token: Option<String>,
}

impl PresentedTokens {
    /// Session token from the cookie, CSRF token from the header.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            session_token: cookie_value(headers, SESSION_COOKIE_NAME),
            csrf_token: csrf_header(headers),
        }
    }

    /// Use a form-submitted CSRF token when the header is absent.
    #[must_use]
    pub fn with_form_csrf(mut self, form_token: Option<String>) -> Self {
        if self.csrf_token.is_none() {
            self.csrf_token = form_token.filter(|token| !token.is_empty());
        }
        self
    }
}

/// Find a cookie by name across every `Cookie` header. Empty values count as missing.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

fn csrf_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CSRF_HEADER_NAME)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn build_cookie(
    name: &str,
    value: &str,
    expires: &str,
    max_age: i64,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; SameSite=Lax; Expires={expires}; Max-Age={max_age}");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` values for a fresh login: the `HttpOnly` session cookie and the
/// script-readable CSRF cookie, both expiring with the stored expiry.
///
/// # Errors
/// Returns an error if a token is not a valid header value.
pub fn session_cookies(
    config: &AuthConfig,
    tokens: &SessionTokens,
    now: DateTime<Utc>,
) -> Result<[HeaderValue; 2], InvalidHeaderValue> {
    let expires = http_date(tokens.expires_at);
    let max_age = (tokens.expires_at - now).num_seconds().max(0);
    let secure = config.cookie_secure();
    Ok([
        build_cookie(
            SESSION_COOKIE_NAME,
            &tokens.session_token,
            &expires,
            max_age,
            true,
            secure,
        )?,
        build_cookie(
            CSRF_COOKIE_NAME,
            &tokens.csrf_token,
            &expires,
            max_age,
            false,
            secure,
        )?,
    ])
}

/// `Set-Cookie` values that make the browser drop both token cookies.
///
/// # Errors
/// Returns an error if the header value cannot be built.
pub fn clear_cookies(config: &AuthConfig) -> Result<[HeaderValue; 2], InvalidHeaderValue> {
    let secure = config.cookie_secure();
    Ok([
        build_cookie(SESSION_COOKIE_NAME, "", EXPIRED, 0, true, secure)?,
        build_cookie(CSRF_COOKIE_NAME, "", EXPIRED, 0, false, secure)?,
    ])
}
