use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::Payload;
use crate::webauth::auth::{cookies::session_cookies, AuthState};

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    username: String,
    #[schema(value_type = String)]
    password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path= "/user/login",
    request_body(
        content = UserLogin,
        description = "JSON or `application/x-www-form-urlencoded` form fields"
    ),
    responses (
        (status = 200, description = "Login successful, session and CSRF cookies set", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Invalid username or password"),
    ),
    tag= "login"
)]
#[instrument(skip_all)]
pub async fn login(
    auth: Extension<Arc<AuthState>>,
    payload: Option<Payload<UserLogin>>,
) -> impl IntoResponse {
    let user: UserLogin = match payload {
        Some(Payload(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("user: {:?}", user);

    let tokens = match auth
        .authenticator()
        .login(&user.username, user.password.expose_secret())
        .await
    {
        Ok(tokens) => tokens,
        Err(err) => return err.into_response(),
    };

    let cookies = match session_cookies(auth.config(), &tokens, Utc::now()) {
        Ok(cookies) => cookies,
        Err(err) => {
            error!("Failed to build session cookies: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }

    let body = LoginResponse {
        username: user.username,
        expires_at: tokens.expires_at,
    };

    (StatusCode::OK, headers, Json(body)).into_response()
}
