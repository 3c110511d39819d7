//! HTTP servers: the authorization server and the resource server role.

mod extract;
pub mod resource;
mod routes;

pub use resource::{ResourceState, create_resource_router};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::engine::{AuthorizationEngine, TokenEngine};
use crate::error::OAuthError;
use crate::store::{
    ClientRegistry, GrantStore, MemoryClientRegistry, MemoryGrantStore, MemoryTokenStore,
    TokenStore,
};

/// Shared state of the authorization server.
pub struct AppState {
    pub clients: Arc<dyn ClientRegistry>,
    pub grants: Arc<dyn GrantStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub authorization: AuthorizationEngine,
    pub token_engine: TokenEngine,
}

impl AppState {
    /// Assemble state over existing stores.
    #[must_use]
    pub fn new(
        config: &Config,
        clients: Arc<dyn ClientRegistry>,
        grants: Arc<dyn GrantStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            authorization: AuthorizationEngine::new(Arc::clone(&clients), Arc::clone(&grants)),
            token_engine: TokenEngine::new(
                Arc::clone(&clients),
                Arc::clone(&grants),
                Arc::clone(&tokens),
            )
            .with_rotation(config.rotate_refresh_tokens),
            clients,
            grants,
            tokens,
        }
    }

    /// State over fresh in-memory stores with the configured lifetimes.
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        let clients: Arc<dyn ClientRegistry> = Arc::new(MemoryClientRegistry::new());
        let grants: Arc<dyn GrantStore> =
            Arc::new(MemoryGrantStore::with_ttl(config.auth_code_ttl));
        let tokens: Arc<dyn TokenStore> =
            Arc::new(MemoryTokenStore::with_ttl(config.access_token_ttl));
        Self::new(config, clients, grants, tokens)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}

/// Build the authorization server router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/oauth/authorize", get(routes::authorize))
        .route("/oauth/token", post(routes::token))
        .route("/oauth/introspect", post(routes::introspect))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the authorization server until shutdown.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_auth_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Authorization server listening on {addr}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Authorization server shut down");
    Ok(())
}

/// Run the resource server until shutdown.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_resource_server(state: Arc<ResourceState>, port: u16) -> anyhow::Result<()> {
    let app = create_resource_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Resource server listening on {addr}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Resource server shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}

/// Millisecond-precision UTC timestamp for response bodies.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a protocol error as `{error, error_description}` JSON.
pub(crate) fn protocol_error(status: StatusCode, error: &OAuthError) -> Response {
    (
        status,
        Json(json!({
            "error": error.code(),
            "error_description": error.description(),
        })),
    )
        .into_response()
}
