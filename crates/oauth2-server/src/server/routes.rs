//! Handlers for the authorization server endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Basic;
use serde_json::json;

use super::extract::FormOrJson;
use super::{AppState, now_rfc3339, protocol_error};
use crate::error::OAuthError;
use crate::models::{AuthorizeRequest, IntrospectRequest, TokenRequest};

// ─── Authorization Endpoint ────────────────────────────────────────────────

/// `GET /oauth/authorize`
///
/// Success is a 302 pointing back at the client's redirect URI with the
/// authorization code (and any echoed state) in the query string.
pub(super) async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(request): Query<AuthorizeRequest>,
) -> Response {
    match state.authorization.authorize(request).await {
        Ok(redirect) => {
            (StatusCode::FOUND, [(header::LOCATION, redirect.location)]).into_response()
        }
        Err(err) => protocol_error(authorize_status(&err), &err),
    }
}

// The authorization endpoint reports a bad client as 400, not 401: there are
// no credentials to challenge on this endpoint.
fn authorize_status(err: &OAuthError) -> StatusCode {
    match err {
        OAuthError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

// ─── Token Endpoint ────────────────────────────────────────────────────────

/// `POST /oauth/token`
///
/// Credentials come from the body; an HTTP Basic header fills in only when
/// the body carries neither client_id nor client_secret.
pub(super) async fn token(
    State(state): State<Arc<AppState>>,
    basic: Option<TypedHeader<Authorization<Basic>>>,
    FormOrJson(mut request): FormOrJson<TokenRequest>,
) -> Response {
    if request.client_id.is_none() && request.client_secret.is_none() {
        if let Some(TypedHeader(header)) = basic {
            request.client_id = Some(header.username().to_string());
            request.client_secret = Some(header.password().to_string());
        }
    }

    match state.token_engine.exchange(request).await {
        Ok(tokens) => token_success(&tokens),
        Err(err) => protocol_error(token_status(&err), &err),
    }
}

fn token_status(err: &OAuthError) -> StatusCode {
    match err {
        OAuthError::InvalidClient(_) => StatusCode::UNAUTHORIZED,
        OAuthError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

// Token responses must not be cached anywhere along the way (RFC 6749 5.1).
fn token_success(tokens: &crate::models::TokenResponse) -> Response {
    let mut response = (StatusCode::OK, Json(tokens)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

// ─── Introspection Endpoint ────────────────────────────────────────────────

/// `POST /oauth/introspect`
///
/// Inactive tokens get `{"active": false}` with nothing else attached.
pub(super) async fn introspect(
    State(state): State<Arc<AppState>>,
    FormOrJson(request): FormOrJson<IntrospectRequest>,
) -> Response {
    match state.token_engine.introspect(request).await {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(err) => protocol_error(StatusCode::BAD_REQUEST, &err),
    }
}

// ─── Health ────────────────────────────────────────────────────────────────

/// `GET /health` with live store counts.
pub(super) async fn health(State(state): State<Arc<AppState>>) -> Response {
    let body = json!({
        "status": "OK",
        "service": "oauth2-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": now_rfc3339(),
        "active_tokens": state.tokens.active_token_count().await,
        "active_codes": state.grants.active_count().await,
    });
    (StatusCode::OK, Json(body)).into_response()
}
