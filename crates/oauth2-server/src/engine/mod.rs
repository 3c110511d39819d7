//! Protocol engines: validation ladders and grant logic, decoupled from HTTP.
//!
//! The engines return [`crate::error::OAuthError`] values; the server layer
//! maps those to status codes and response bodies.

mod authorize;
mod token;

pub use authorize::{AuthorizationEngine, AuthorizeRedirect};
pub use token::TokenEngine;

/// Empty parameter values count as missing.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
