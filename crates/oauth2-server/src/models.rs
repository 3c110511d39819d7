//! Wire-level request and response types for the protocol endpoints.
//!
//! Request fields are all optional so the engines own the required-parameter
//! errors; missing and empty values are treated alike there.

use serde::{Deserialize, Serialize};

/// Query parameters of `GET /oauth/authorize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeRequest {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    /// Opaque client value, echoed back on the redirect when present.
    pub state: Option<String>,
}

/// Body of `POST /oauth/token`, accepted as a form or as JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Authorization code, for `grant_type=authorization_code`.
    pub code: Option<String>,
    /// Must repeat the redirect URI the code was issued against.
    pub redirect_uri: Option<String>,
    /// Refresh token, for `grant_type=refresh_token`.
    pub refresh_token: Option<String>,
}

/// Successful token response (RFC 6749 section 5.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Present on the authorization_code grant; absent on refresh unless
    /// rotation is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub scope: String,
}

/// Body of `POST /oauth/introspect`, accepted as a form or as JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntrospectRequest {
    pub token: Option<String>,
    /// Accepted for RFC 7662 compatibility; the lookup ignores it.
    pub token_type_hint: Option<String>,
}

/// Introspection verdict (RFC 7662 section 2.2).
///
/// Inactive tokens serialize as exactly `{"active": false}` so callers learn
/// nothing about why a token is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Expiry as Unix epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl IntrospectionResponse {
    /// The verdict for unknown, expired, or otherwise unusable tokens.
    #[must_use]
    pub const fn inactive() -> Self {
        Self { active: false, client_id: None, scope: None, exp: None }
    }

    /// The verdict for a live access token.
    #[must_use]
    pub fn active(client_id: String, scope: String, exp: i64) -> Self {
        Self { active: true, client_id: Some(client_id), scope: Some(scope), exp: Some(exp) }
    }

    /// Whether the token carries a scope, matching on whole space-separated
    /// entries (`"read"` does not match scope `"readonly"`).
    #[must_use]
    pub fn has_scope(&self, wanted: &str) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|scope| scope.split_whitespace().any(|entry| entry == wanted))
    }
}

/// Body shape of protocol error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}
