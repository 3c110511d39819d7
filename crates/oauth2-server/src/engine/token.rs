//! Token endpoint engine: grant exchange, refresh, and introspection.

use std::sync::Arc;

use super::non_empty;
use crate::error::{OAuthError, OAuthResult, RedeemError};
use crate::models::{IntrospectRequest, IntrospectionResponse, TokenRequest, TokenResponse};
use crate::secrets;
use crate::store::{ClientRegistry, GrantStore, TokenStore};

/// Handles the token endpoint grants and token introspection.
pub struct TokenEngine {
    clients: Arc<dyn ClientRegistry>,
    grants: Arc<dyn GrantStore>,
    tokens: Arc<dyn TokenStore>,
    rotate_refresh_tokens: bool,
}

impl TokenEngine {
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientRegistry>,
        grants: Arc<dyn GrantStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self { clients, grants, tokens, rotate_refresh_tokens: false }
    }

    /// Enable refresh token rotation. Off by default: a presented refresh
    /// token stays valid and the refresh response carries no new one.
    #[must_use]
    pub fn with_rotation(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }

    /// Exchange a grant for tokens.
    ///
    /// Parameter presence is checked before client authentication, so an
    /// unauthenticated probe without a grant_type still sees
    /// `invalid_request`, not `invalid_client`.
    pub async fn exchange(&self, request: TokenRequest) -> OAuthResult<TokenResponse> {
        let params = (
            non_empty(request.grant_type.as_deref()),
            non_empty(request.client_id.as_deref()),
        );
        let (Some(grant_type), Some(client_id)) = params else {
            return Err(OAuthError::invalid_request("Missing grant_type or client_id"));
        };

        let client_secret = request.client_secret.as_deref().unwrap_or_default();
        if !self.clients.validate_credentials(client_id, client_secret).await {
            tracing::warn!(client_id = %client_id, "Client authentication failed");
            return Err(OAuthError::invalid_client("Client authentication failed"));
        }

        match grant_type {
            "authorization_code" => self.authorization_code_grant(client_id, &request).await,
            "refresh_token" => self.refresh_token_grant(client_id, &request).await,
            other => {
                Err(OAuthError::unsupported_grant_type(format!("Unsupported grant type: {other}")))
            }
        }
    }

    async fn authorization_code_grant(
        &self,
        client_id: &str,
        request: &TokenRequest,
    ) -> OAuthResult<TokenResponse> {
        let Some(code) = non_empty(request.code.as_deref()) else {
            return Err(OAuthError::invalid_grant("Missing authorization code"));
        };

        let grant = self.grants.redeem(code).await.map_err(|err| match err {
            RedeemError::NotFound => OAuthError::invalid_grant("Invalid authorization code"),
            RedeemError::Expired => OAuthError::invalid_grant("Authorization code expired"),
        })?;

        // The code is consumed either way; a mismatched retry cannot succeed.
        if request.redirect_uri.as_deref() != Some(grant.redirect_uri.as_str()) {
            return Err(OAuthError::invalid_grant("Redirect URI mismatch"));
        }

        let access_token = self.tokens.issue_access_token(client_id, &grant.scope).await;
        let refresh_token = self.tokens.issue_refresh_token(client_id, &grant.scope).await;

        tracing::info!(
            client_id = %client_id,
            scope = %grant.scope,
            access_token = %secrets::fingerprint(&access_token),
            "Exchanged authorization code for tokens"
        );

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_ttl().as_secs(),
            refresh_token: Some(refresh_token),
            scope: grant.scope,
        })
    }

    async fn refresh_token_grant(
        &self,
        client_id: &str,
        request: &TokenRequest,
    ) -> OAuthResult<TokenResponse> {
        let Some(refresh_token) = non_empty(request.refresh_token.as_deref()) else {
            return Err(OAuthError::invalid_grant("Missing refresh token"));
        };

        let Some(record) = self.tokens.get_refresh_token(refresh_token).await else {
            return Err(OAuthError::invalid_grant("Invalid refresh token"));
        };

        let access_token = self.tokens.issue_access_token(client_id, &record.scope).await;

        // With rotation off the presented token stays valid for reuse and the
        // response omits the refresh_token field.
        let rotated = if self.rotate_refresh_tokens {
            self.tokens.revoke_refresh_token(refresh_token).await;
            Some(self.tokens.issue_refresh_token(client_id, &record.scope).await)
        } else {
            None
        };

        tracing::info!(
            client_id = %client_id,
            scope = %record.scope,
            rotated = rotated.is_some(),
            access_token = %secrets::fingerprint(&access_token),
            "Refreshed access token"
        );

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_ttl().as_secs(),
            refresh_token: rotated,
            scope: record.scope,
        })
    }

    /// Answer an introspection request.
    ///
    /// Unknown and expired tokens produce the same minimal inactive verdict;
    /// refresh tokens are never reported active.
    pub async fn introspect(
        &self,
        request: IntrospectRequest,
    ) -> OAuthResult<IntrospectionResponse> {
        let Some(token) = non_empty(request.token.as_deref()) else {
            return Err(OAuthError::invalid_request("Missing token"));
        };

        match self.tokens.get_access_token(token).await {
            Some(record) => {
                let exp = record.exp();
                Ok(IntrospectionResponse::active(record.client_id, record.scope, exp))
            }
            None => Ok(IntrospectionResponse::inactive()),
        }
    }
}
