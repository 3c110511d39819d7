//! In-memory store implementations backed by `RwLock`-guarded maps.
//!
//! Mutations on each table serialize through its write lock, which is what
//! makes [`GrantStore::redeem`] a single atomic lookup-and-remove step.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{AccessTokenRecord, Client, Grant, RefreshTokenRecord};
use super::{ClientRegistry, GrantStore, TokenStore};
use crate::config::defaults;
use crate::error::{RedeemError, RegistryError};
use crate::secrets;

// ─── Client Registry ───────────────────────────────────────────────────────

/// Client table with constant-time credential checks.
#[derive(Default)]
pub struct MemoryClientRegistry {
    clients: RwLock<HashMap<String, Client>>,
}

impl MemoryClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClientRegistry").finish()
    }
}

#[async_trait]
impl ClientRegistry for MemoryClientRegistry {
    async fn register(&self, client: Client) -> Result<(), RegistryError> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(RegistryError::DuplicateClient(client.client_id));
        }
        debug!(client_id = %client.client_id, "Registered client");
        clients.insert(client.client_id.clone(), client);
        Ok(())
    }

    async fn lookup(&self, client_id: &str) -> Option<Client> {
        self.clients.read().await.get(client_id).cloned()
    }

    async fn validate_credentials(&self, client_id: &str, client_secret: &str) -> bool {
        let clients = self.clients.read().await;
        clients
            .get(client_id)
            .is_some_and(|client| secrets::constant_time_eq(&client.client_secret, client_secret))
    }

    async fn validate_redirect(&self, client_id: &str, redirect_uri: &str) -> bool {
        let clients = self.clients.read().await;
        clients.get(client_id).is_some_and(|client| client.redirect_uri == redirect_uri)
    }
}

// ─── Grant Store ───────────────────────────────────────────────────────────

/// Authorization code table. Codes are single use and short lived.
pub struct MemoryGrantStore {
    grants: RwLock<HashMap<String, Grant>>,
    ttl: Duration,
}

impl MemoryGrantStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(defaults::AUTH_CODE_TTL)
    }

    /// Build with a custom code lifetime. Tests use very short lifetimes.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { grants: RwLock::new(HashMap::new()), ttl }
    }
}

impl Default for MemoryGrantStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryGrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGrantStore").field("ttl", &self.ttl).finish()
    }
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn issue(&self, client_id: &str, redirect_uri: &str, scope: &str) -> Grant {
        let grant = Grant {
            code: secrets::authorization_code(),
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scope: scope.to_string(),
            expires_at: Utc::now() + self.ttl,
        };
        let mut grants = self.grants.write().await;
        grants.insert(grant.code.clone(), grant.clone());
        grant
    }

    async fn redeem(&self, code: &str) -> Result<Grant, RedeemError> {
        // Remove under a single write lock so two callers can never both win.
        let mut grants = self.grants.write().await;
        let Some(grant) = grants.remove(code) else {
            return Err(RedeemError::NotFound);
        };
        if grant.is_expired() {
            return Err(RedeemError::Expired);
        }
        Ok(grant)
    }

    async fn active_count(&self) -> usize {
        self.grants.read().await.values().filter(|grant| !grant.is_expired()).count()
    }

    async fn sweep(&self) -> usize {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|_, grant| !grant.is_expired());
        before - grants.len()
    }
}

// ─── Token Store ───────────────────────────────────────────────────────────

/// Access and refresh token tables.
///
/// Access token reads treat expired entries as absent without removing them;
/// the sweeper reclaims the memory. Refresh tokens never expire.
pub struct MemoryTokenStore {
    access_tokens: RwLock<HashMap<String, AccessTokenRecord>>,
    refresh_tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
    access_ttl: Duration,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(defaults::ACCESS_TOKEN_TTL)
    }

    /// Build with a custom access token lifetime.
    #[must_use]
    pub fn with_ttl(access_ttl: Duration) -> Self {
        Self {
            access_tokens: RwLock::new(HashMap::new()),
            refresh_tokens: RwLock::new(HashMap::new()),
            access_ttl,
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore").field("access_ttl", &self.access_ttl).finish()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn issue_access_token(&self, client_id: &str, scope: &str) -> String {
        let token = secrets::access_token();
        let record = AccessTokenRecord {
            client_id: client_id.to_string(),
            scope: scope.to_string(),
            expires_at: Utc::now() + self.access_ttl,
        };
        self.access_tokens.write().await.insert(token.clone(), record);
        token
    }

    async fn issue_refresh_token(&self, client_id: &str, scope: &str) -> String {
        let token = secrets::refresh_token();
        let record =
            RefreshTokenRecord { client_id: client_id.to_string(), scope: scope.to_string() };
        self.refresh_tokens.write().await.insert(token.clone(), record);
        token
    }

    async fn get_access_token(&self, token: &str) -> Option<AccessTokenRecord> {
        let tokens = self.access_tokens.read().await;
        tokens.get(token).filter(|record| !record.is_expired()).cloned()
    }

    async fn get_refresh_token(&self, token: &str) -> Option<RefreshTokenRecord> {
        self.refresh_tokens.read().await.get(token).cloned()
    }

    async fn is_access_token_valid(&self, token: &str) -> bool {
        self.get_access_token(token).await.is_some()
    }

    async fn revoke_refresh_token(&self, token: &str) -> bool {
        self.refresh_tokens.write().await.remove(token).is_some()
    }

    fn access_token_ttl(&self) -> Duration {
        self.access_ttl
    }

    async fn active_token_count(&self) -> usize {
        self.access_tokens.read().await.values().filter(|record| !record.is_expired()).count()
    }

    async fn sweep(&self) -> usize {
        let mut tokens = self.access_tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, record| !record.is_expired());
        before - tokens.len()
    }
}

// ─── Expiry Sweeper ────────────────────────────────────────────────────────

/// Start the periodic expiry sweeper.
///
/// Correctness never depends on it running: reads already treat expired
/// entries as absent. The sweeper only reclaims memory.
pub fn spawn_sweeper(
    grants: Arc<dyn GrantStore>,
    tokens: Arc<dyn TokenStore>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // the first tick completes immediately
        loop {
            interval.tick().await;
            let swept_grants = grants.sweep().await;
            let swept_tokens = tokens.sweep().await;
            if swept_grants > 0 || swept_tokens > 0 {
                debug!(grants = swept_grants, tokens = swept_tokens, "Swept expired entries");
            }
        }
    })
}
