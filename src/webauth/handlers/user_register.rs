use axum::{extract::Extension, http::StatusCode, response::IntoResponse};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::Payload;
use crate::webauth::auth::AuthState;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserRegister {
    username: String,
    #[schema(value_type = String)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path= "/user/register",
    request_body(
        content = UserRegister,
        description = "JSON or `application/x-www-form-urlencoded` form fields"
    ),
    responses (
        (status = 201, description = "Registration successful"),
        (status = 400, description = "Missing payload, invalid username or invalid password"),
        (status = 409, description = "User with the specified username already exists"),
    ),
    tag= "register"
)]
#[instrument(skip_all)]
pub async fn register(
    auth: Extension<Arc<AuthState>>,
    payload: Option<Payload<UserRegister>>,
) -> impl IntoResponse {
    let user: UserRegister = match payload {
        Some(Payload(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("user: {:?}", user);

    match auth
        .authenticator()
        .register(&user.username, user.password.expose_secret())
        .await
    {
        Ok(()) => (StatusCode::CREATED, "User created".to_string()).into_response(),
        Err(err) => err.into_response(),
    }
}
