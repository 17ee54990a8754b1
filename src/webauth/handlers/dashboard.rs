use axum::{
    extract::{Extension, Form},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::{presented_tokens, CsrfForm};
use crate::webauth::auth::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Dashboard {
    pub username: String,
}

#[utoipa::path(
    get,
    path= "/dashboard",
    params(
        ("x-csrf-token" = String, Header, description = "CSRF token issued at login"),
    ),
    responses (
        (status = 200, description = "Authorized", body = Dashboard, content_type = "application/json"),
        (status = 401, description = "Missing, expired or mismatched session or CSRF token"),
    ),
    tag= "dashboard"
)]
#[instrument(skip_all)]
pub async fn dashboard(
    auth: Extension<Arc<AuthState>>,
    headers: HeaderMap,
    form: Option<Form<CsrfForm>>,
) -> impl IntoResponse {
    let presented = presented_tokens(&headers, form);

    match auth.authorizer().authorize(&presented).await {
        Ok(username) => (StatusCode::OK, Json(Dashboard { username })).into_response(),
        Err(err) => err.into_response(),
    }
}
