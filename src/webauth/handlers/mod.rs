pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod user_logout;
pub use self::user_logout::logout;

pub mod dashboard;
pub use self::dashboard::dashboard;

// common types for the handlers
use axum::{
    async_trait,
    extract::{Form, FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;

use crate::webauth::auth::PresentedTokens;

/// Request body sent either as JSON or as an HTML form post
/// (`application/x-www-form-urlencoded`), picked by `Content-Type`.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Optional url-encoded body carrying the CSRF token for plain HTML forms.
#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct CsrfForm {
    pub csrf_token: Option<String>,
}

/// Session cookie plus CSRF header, falling back to the form field.
pub fn presented_tokens(headers: &HeaderMap, form: Option<Form<CsrfForm>>) -> PresentedTokens {
    let form_token = form.and_then(|Form(form)| form.csrf_token);
    PresentedTokens::from_headers(headers).with_form_csrf(form_token)
}
