//! Configuration for the authorization and resource servers.

use std::time::Duration;

use anyhow::Context;

/// Protocol and runtime defaults.
pub mod defaults {
    use std::time::Duration;

    /// Authorization code lifetime (10 minutes).
    pub const AUTH_CODE_TTL: Duration = Duration::from_secs(600);

    /// Access token lifetime (1 hour).
    pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(3600);

    /// Period of the background expiry sweeper.
    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Authorization server port.
    pub const AUTH_PORT: u16 = 3000;

    /// Resource server port.
    pub const RESOURCE_PORT: u16 = 3002;

    /// Base URL the resource server introspects against.
    pub const OAUTH_SERVER_URL: &str = "http://localhost:3000";

    /// Introspection request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Introspection connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// TTL of cached active-token verdicts. Kept short so revocation-adjacent
    /// changes surface quickly while bursts of calls share one lookup.
    pub const INTROSPECTION_CACHE_TTL: Duration = Duration::from_secs(30);

    /// Maximum cached introspection verdicts.
    pub const INTROSPECTION_CACHE_MAX_SIZE: u64 = 10_000;
}

/// The client registered at startup for demos and interop tests.
pub mod demo_client {
    pub const CLIENT_ID: &str = "test-client";
    pub const CLIENT_SECRET: &str = "test-secret";
    pub const REDIRECT_URI: &str = "http://localhost:3001/callback";
    pub const SCOPES: &[&str] = &["read", "write"];
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Authorization code lifetime.
    pub auth_code_ttl: Duration,

    /// Access token lifetime.
    pub access_token_ttl: Duration,

    /// Period of the expiry sweeper.
    pub sweep_interval: Duration,

    /// Whether the refresh grant rotates refresh tokens.
    pub rotate_refresh_tokens: bool,

    /// Base URL of the authorization server (used by the resource role).
    pub oauth_server_url: String,

    /// Introspection request timeout.
    pub request_timeout: Duration,

    /// Introspection connection timeout.
    pub connect_timeout: Duration,

    /// TTL of cached introspection verdicts.
    pub cache_ttl: Duration,

    /// Maximum cached introspection verdicts.
    pub cache_max_size: u64,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self {
            auth_code_ttl: defaults::AUTH_CODE_TTL,
            access_token_ttl: defaults::ACCESS_TOKEN_TTL,
            sweep_interval: defaults::SWEEP_INTERVAL,
            rotate_refresh_tokens: false,
            oauth_server_url: defaults::OAUTH_SERVER_URL.to_string(),
            request_timeout: defaults::REQUEST_TIMEOUT,
            connect_timeout: defaults::CONNECT_TIMEOUT,
            cache_ttl: defaults::INTROSPECTION_CACHE_TTL,
            cache_max_size: defaults::INTROSPECTION_CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration pointed at a mock authorization server.
    #[must_use]
    pub fn for_testing(oauth_server_url: &str) -> Self {
        Self {
            auth_code_ttl: Duration::from_secs(5),
            access_token_ttl: Duration::from_secs(5),
            sweep_interval: Duration::from_millis(50),
            rotate_refresh_tokens: false,
            oauth_server_url: oauth_server_url.to_string(),
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration variable is set but not a number of
    /// seconds.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();
        if let Some(secs) = env_secs("OAUTH_CODE_TTL")? {
            config.auth_code_ttl = secs;
        }
        if let Some(secs) = env_secs("OAUTH_ACCESS_TOKEN_TTL")? {
            config.access_token_ttl = secs;
        }
        if let Ok(value) = std::env::var("OAUTH_ROTATE_REFRESH_TOKENS") {
            config.rotate_refresh_tokens = matches!(value.as_str(), "1" | "true" | "yes");
        }
        if let Ok(url) = std::env::var("OAUTH_SERVER_URL") {
            config.oauth_server_url = url;
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_secs(name: &str) -> anyhow::Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(value) => {
            let secs: u64 =
                value.parse().with_context(|| format!("{name} must be a number of seconds"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
