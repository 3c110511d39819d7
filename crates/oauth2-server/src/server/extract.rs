//! Request extraction helpers for the protocol endpoints.

use axum::Json;
use axum::extract::{Form, FromRequest, Request};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;

use super::protocol_error;
use crate::error::OAuthError;

/// Body extractor accepting `application/x-www-form-urlencoded` or JSON.
///
/// RFC 6749 mandates form bodies on the token endpoint; JSON is accepted
/// as well because introspection callers commonly post it.
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let value = if content_type.starts_with("application/json") {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|_| malformed_body())?
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .map_err(|_| malformed_body())?
        };

        Ok(Self(value))
    }
}

fn malformed_body() -> Response {
    protocol_error(StatusCode::BAD_REQUEST, &OAuthError::invalid_request("Malformed request body"))
}
