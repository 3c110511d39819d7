//! HTTP client the resource server uses to introspect bearer tokens.

use std::time::Duration;

use moka::future::Cache;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde_json::json;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::IntrospectionResponse;
use crate::secrets;

/// Client for `POST /oauth/introspect` on the authorization server.
///
/// Transient transport failures are retried with exponential backoff. Active
/// verdicts are cached briefly, keyed by token digest so raw tokens never sit
/// in the cache; inactive verdicts are not cached, so a token issued a moment
/// ago is never misreported.
pub struct IntrospectionClient {
    client: ClientWithMiddleware,
    introspect_url: String,
    cache: Cache<String, IntrospectionResponse>,
}

impl IntrospectionClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(100), Duration::from_secs(2))
            .build_with_max_retries(2);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        let base = config.oauth_server_url.trim_end_matches('/');
        Ok(Self { client, introspect_url: format!("{base}/oauth/introspect"), cache })
    }

    /// Ask the authorization server whether a token is active.
    ///
    /// An inactive token is a successful call, not an error.
    ///
    /// # Errors
    ///
    /// Fails when the request cannot be delivered or the endpoint answers
    /// with a non-success status.
    pub async fn introspect(&self, token: &str) -> ClientResult<IntrospectionResponse> {
        let cache_key = secrets::digest(token);
        if let Some(verdict) = self.cache.get(&cache_key).await {
            return Ok(verdict);
        }

        let response = self
            .client
            .post(&self.introspect_url)
            .json(&json!({ "token": token, "token_type_hint": "access_token" }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus { status: status.as_u16() });
        }

        let verdict: IntrospectionResponse = response.json().await?;

        // Only active verdicts are cached; inactive ones may flip at any
        // moment when the token in question gets issued.
        if verdict.active {
            self.cache.insert(cache_key, verdict.clone()).await;
        }

        Ok(verdict)
    }
}

impl std::fmt::Debug for IntrospectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrospectionClient")
            .field("introspect_url", &self.introspect_url)
            .finish_non_exhaustive()
    }
}
