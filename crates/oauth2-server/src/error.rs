//! Error types for the authorization server and the resource-side client.

use thiserror::Error;

/// Protocol-level OAuth 2.0 error, rendered to clients as
/// `{"error": ..., "error_description": ...}`.
///
/// HTTP status codes are chosen at the transport layer because they depend on
/// the endpoint: a failed credential check is 401 on the token endpoint but
/// 400 on the authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthError {
    /// A required parameter is missing or malformed.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// Unknown client, or client authentication failed.
    #[error("invalid_client: {0}")]
    InvalidClient(String),

    /// Invalid, expired, or already-redeemed grant material.
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// The authorization endpoint only supports `response_type=code`.
    #[error("unsupported_response_type: {0}")]
    UnsupportedResponseType(String),

    /// The token endpoint only supports the authorization_code and
    /// refresh_token grants.
    #[error("unsupported_grant_type: {0}")]
    UnsupportedGrantType(String),

    /// Internal fault. Descriptions stay generic; no secrets, no internals.
    #[error("server_error: {0}")]
    ServerError(String),
}

impl OAuthError {
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::InvalidRequest(description.into())
    }

    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::InvalidClient(description.into())
    }

    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::InvalidGrant(description.into())
    }

    #[must_use]
    pub fn unsupported_response_type(description: impl Into<String>) -> Self {
        Self::UnsupportedResponseType(description.into())
    }

    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::UnsupportedGrantType(description.into())
    }

    #[must_use]
    pub fn server_error(description: impl Into<String>) -> Self {
        Self::ServerError(description.into())
    }

    /// The registered `error` code for the response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidClient(_) => "invalid_client",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::UnsupportedResponseType(_) => "unsupported_response_type",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::ServerError(_) => "server_error",
        }
    }

    /// The human-readable `error_description` for the response body.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::InvalidRequest(d)
            | Self::InvalidClient(d)
            | Self::InvalidGrant(d)
            | Self::UnsupportedResponseType(d)
            | Self::UnsupportedGrantType(d)
            | Self::ServerError(d) => d,
        }
    }
}

/// Result alias for protocol operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Why an authorization code could not be redeemed.
///
/// `Expired` means the grant existed and has now been removed; a retry of the
/// same code yields `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RedeemError {
    /// No grant under this code. Covers never-issued and already-redeemed.
    #[error("authorization code not found")]
    NotFound,

    /// The grant outlived its lifetime and was removed on observation.
    #[error("authorization code expired")]
    Expired,
}

/// Why a client could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The client id is already taken.
    #[error("client `{0}` is already registered")]
    DuplicateClient(String),
}

/// Errors from the resource server's introspection client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Plain HTTP failure: client construction, timeout, or body decode.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure surfaced through the retry middleware.
    #[error("introspection request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// The introspection endpoint answered with an unexpected status.
    #[error("unexpected introspection status: {status}")]
    UnexpectedStatus {
        /// HTTP status code returned by the authorization server.
        status: u16,
    },
}

/// Result alias for the introspection client.
pub type ClientResult<T> = Result<T, ClientError>;
