//! Record types shared by the stores and the protocol engines.

use chrono::{DateTime, Utc};

/// A registered OAuth client.
///
/// Each client has exactly one redirect URI; redirect validation is an exact
/// string match, no prefix or pattern logic.
#[derive(Clone, PartialEq, Eq)]
pub struct Client {
    /// Public client identifier.
    pub client_id: String,
    /// Shared secret, compared in constant time.
    pub client_secret: String,
    /// The single registered redirect URI.
    pub redirect_uri: String,
    /// Scopes this client may be granted. Descriptive only; the engines do
    /// not enforce scope membership.
    pub scopes: Vec<String>,
}

// The secret stays out of Debug output and therefore out of logs.
impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// A pending authorization code grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// The opaque code handed to the client via redirect.
    pub code: String,
    /// Client the code was issued to.
    pub client_id: String,
    /// Redirect URI the code is bound to; the token exchange must repeat it.
    pub redirect_uri: String,
    /// Space-separated scope string.
    pub scope: String,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl Grant {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Stored state of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRecord {
    pub client_id: String,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessTokenRecord {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Expiry as Unix epoch seconds, the `exp` claim of introspection.
    #[must_use]
    pub fn exp(&self) -> i64 {
        self.expires_at.timestamp()
    }
}

/// Stored state of a refresh token. Refresh tokens do not expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub client_id: String,
    pub scope: String,
}
