//! Resource server role: scope-gated API endpoints behind bearer auth.
//!
//! Every `/api` route validates its bearer token against the authorization
//! server's introspection endpoint before the handler runs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::now_rfc3339;
use crate::client::IntrospectionClient;
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::IntrospectionResponse;

/// Shared state of the resource server.
#[derive(Debug)]
pub struct ResourceState {
    introspection: IntrospectionClient,
    oauth_server_url: String,
}

impl ResourceState {
    /// Build resource state pointed at the configured authorization server.
    ///
    /// # Errors
    ///
    /// Returns an error if the introspection client cannot be constructed.
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            introspection: IntrospectionClient::new(config)?,
            oauth_server_url: config.oauth_server_url.clone(),
        })
    }
}

/// Build the resource server router.
pub fn create_resource_router(state: Arc<ResourceState>) -> Router {
    let protected = Router::new()
        .route("/api/protected", get(protected_resource))
        .route("/api/user/profile", get(user_profile))
        .route("/api/user/update", post(update_user))
        .route("/api/data", get(list_data))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), require_token));

    Router::new()
        .merge(protected)
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Bearer Middleware ─────────────────────────────────────────────────────

/// Reject requests without a live bearer token; stash the introspection
/// verdict for the handler.
///
/// Anything other than a `Bearer` authorization header counts as missing.
async fn require_token(
    State(state): State<Arc<ResourceState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return resource_error(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Missing or invalid authorization header",
        );
    };

    let verdict = match state.introspection.introspect(token).await {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::error!(error = %err, "Token introspection failed");
            return resource_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "Failed to validate token",
            );
        }
    };

    if !verdict.active {
        return resource_error(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired access token",
        );
    }

    request.extensions_mut().insert(verdict);
    next.run(request).await
}

fn resource_error(status: StatusCode, error: &str, description: &str) -> Response {
    (status, Json(json!({ "error": error, "error_description": description }))).into_response()
}

// ─── Protected Endpoints ───────────────────────────────────────────────────

async fn protected_resource(Extension(token): Extension<IntrospectionResponse>) -> Response {
    let body = json!({
        "message": "This is a protected resource!",
        "client_id": token.client_id.as_deref().unwrap_or_default(),
        "scope": token.scope.as_deref().unwrap_or_default(),
        "timestamp": now_rfc3339(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

async fn user_profile(Extension(token): Extension<IntrospectionResponse>) -> Response {
    if !token.has_scope("read") {
        return resource_error(
            StatusCode::FORBIDDEN,
            "insufficient_scope",
            "Token does not have required scope",
        );
    }

    let body = json!({
        "user": {
            "id": "123",
            "username": "demo_user",
            "email": "user@example.com",
            "name": "Demo User",
        },
        "client_id": token.client_id.as_deref().unwrap_or_default(),
        "timestamp": now_rfc3339(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
}

async fn update_user(
    Extension(token): Extension<IntrospectionResponse>,
    body: Option<Json<UpdateUserRequest>>,
) -> Response {
    if !token.has_scope("write") {
        return resource_error(
            StatusCode::FORBIDDEN,
            "insufficient_scope",
            "Token does not have write scope",
        );
    }

    let update = body.map(|Json(update)| update).unwrap_or_default();
    let body = json!({
        "message": "User updated successfully",
        "updated": { "name": update.name, "email": update.email },
        "client_id": token.client_id.as_deref().unwrap_or_default(),
        "timestamp": now_rfc3339(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

async fn list_data(Extension(token): Extension<IntrospectionResponse>) -> Response {
    let body = json!({
        "data": [
            { "id": 1, "value": "Item 1" },
            { "id": 2, "value": "Item 2" },
            { "id": 3, "value": "Item 3" },
        ],
        "client_id": token.client_id.as_deref().unwrap_or_default(),
        "timestamp": now_rfc3339(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

// ─── Health ────────────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<ResourceState>>) -> Response {
    let body = json!({
        "status": "OK",
        "service": "api-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": now_rfc3339(),
        "oauth_server": state.oauth_server_url,
    });
    (StatusCode::OK, Json(body)).into_response()
}
