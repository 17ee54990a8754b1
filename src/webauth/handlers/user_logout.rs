use axum::{
    extract::{Extension, Form},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{presented_tokens, CsrfForm};
use crate::webauth::auth::{cookies::clear_cookies, AuthState};

#[utoipa::path(
    post,
    path= "/user/logout",
    params(
        ("x-csrf-token" = String, Header, description = "CSRF token issued at login"),
    ),
    responses (
        (status = 204, description = "Session cleared, token cookies expired"),
        (status = 401, description = "Missing, expired or mismatched session or CSRF token"),
    ),
    tag= "logout"
)]
#[instrument(skip_all)]
pub async fn logout(
    auth: Extension<Arc<AuthState>>,
    headers: HeaderMap,
    form: Option<Form<CsrfForm>>,
) -> impl IntoResponse {
    let presented = presented_tokens(&headers, form);

    let username = match auth.authorizer().authorize(&presented).await {
        Ok(username) => username,
        Err(err) => return err.into_response(),
    };

    if let Err(err) = auth.authenticator().logout(&username).await {
        return err.into_response();
    }

    info!("Logged out user: {username}");

    let mut response_headers = HeaderMap::new();
    match clear_cookies(auth.config()) {
        Ok(cookies) => {
            for cookie in cookies {
                response_headers.append(SET_COOKIE, cookie);
            }
        }
        Err(err) => error!("Failed to build expired cookies: {err}"),
    }

    (StatusCode::NO_CONTENT, response_headers).into_response()
}
