//! OAuth 2.0 Authorization Server
//!
//! An authorization server implementing the authorization code and refresh
//! token grants with opaque tokens, plus RFC 7662-style introspection and a
//! small resource server that validates bearer tokens against it.
//!
//! # Features
//!
//! - **Authorization code flow**: single-use, short-lived codes bound to a
//!   client and redirect URI
//! - **Opaque tokens**: random hex access and refresh tokens, no JWT parsing
//! - **Introspection**: active/inactive verdicts that leak nothing for
//!   unknown or expired tokens
//! - **In-memory stores**: trait-based storage behind `Arc<dyn ...>` seams
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use oauth2_server::config::Config;
//! use oauth2_server::server::{AppState, run_auth_server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = Arc::new(AppState::in_memory(&config));
//!
//!     run_auth_server(state, 3000).await
//! }
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod secrets;
pub mod server;
pub mod store;

pub use client::IntrospectionClient;
pub use config::Config;
pub use error::{ClientError, OAuthError, RedeemError, RegistryError};
