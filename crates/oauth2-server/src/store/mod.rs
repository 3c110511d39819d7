//! Storage interfaces and the in-memory implementations behind them.
//!
//! Every table sits behind a trait so the engines never touch a concrete map.
//! The shipped backend is in-memory ([`memory`]); nothing survives a restart,
//! which keeps the trait surface the single seam for a persistent backend.

mod memory;
mod types;

pub use memory::{MemoryClientRegistry, MemoryGrantStore, MemoryTokenStore, spawn_sweeper};
pub use types::{AccessTokenRecord, Client, Grant, RefreshTokenRecord};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{RedeemError, RegistryError};

/// Client registration, lookup, and validation.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Register a client. Fails if the client id is already taken; the
    /// existing registration is left untouched.
    async fn register(&self, client: Client) -> Result<(), RegistryError>;

    /// Look up a client by id.
    async fn lookup(&self, client_id: &str) -> Option<Client>;

    /// Check client credentials. Returns false for unknown clients. The
    /// secret comparison runs in constant time.
    async fn validate_credentials(&self, client_id: &str, client_secret: &str) -> bool;

    /// Check that `redirect_uri` exactly matches the registered one.
    async fn validate_redirect(&self, client_id: &str, redirect_uri: &str) -> bool;
}

/// Authorization code issuance and single-use redemption.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Issue a fresh code bound to a client, redirect URI, and scope.
    async fn issue(&self, client_id: &str, redirect_uri: &str, scope: &str) -> Grant;

    /// Atomically look up and remove a grant.
    ///
    /// At most one caller ever receives a given grant; concurrent redemptions
    /// of the same code leave a single winner. An expired grant is removed on
    /// observation and reported as [`RedeemError::Expired`] exactly once.
    async fn redeem(&self, code: &str) -> Result<Grant, RedeemError>;

    /// Number of live (unexpired) grants.
    async fn active_count(&self) -> usize;

    /// Drop expired grants, returning how many were removed.
    async fn sweep(&self) -> usize;
}

/// Access and refresh token issuance and lookup.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Mint an access token for a client and scope.
    async fn issue_access_token(&self, client_id: &str, scope: &str) -> String;

    /// Mint a refresh token for a client and scope.
    async fn issue_refresh_token(&self, client_id: &str, scope: &str) -> String;

    /// Look up an access token. `None` for unknown or expired tokens.
    async fn get_access_token(&self, token: &str) -> Option<AccessTokenRecord>;

    /// Look up a refresh token. `None` if unknown.
    async fn get_refresh_token(&self, token: &str) -> Option<RefreshTokenRecord>;

    /// Whether an access token exists and has not expired.
    async fn is_access_token_valid(&self, token: &str) -> bool;

    /// Remove a refresh token, returning whether it existed. Only used when
    /// refresh token rotation is enabled.
    async fn revoke_refresh_token(&self, token: &str) -> bool;

    /// Configured access token lifetime, surfaced to clients as `expires_in`.
    fn access_token_ttl(&self) -> Duration;

    /// Number of live (unexpired) access tokens.
    async fn active_token_count(&self) -> usize;

    /// Drop expired access tokens, returning how many were removed.
    async fn sweep(&self) -> usize;
}
