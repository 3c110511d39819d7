//! Authorization endpoint engine.

use std::sync::Arc;

use url::Url;

use super::non_empty;
use crate::error::{OAuthError, OAuthResult};
use crate::models::AuthorizeRequest;
use crate::secrets;
use crate::store::{ClientRegistry, GrantStore};

/// Scope granted when the request does not ask for one.
const DEFAULT_SCOPE: &str = "read";

/// Outcome of a successful authorization: where to send the user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRedirect {
    /// Redirect location with `code` (and echoed `state`) appended.
    pub location: String,
}

/// Validates authorization requests and issues single-use codes.
///
/// There is no consent step: a request that passes validation is approved
/// immediately and answered with a redirect.
pub struct AuthorizationEngine {
    clients: Arc<dyn ClientRegistry>,
    grants: Arc<dyn GrantStore>,
}

impl AuthorizationEngine {
    #[must_use]
    pub fn new(clients: Arc<dyn ClientRegistry>, grants: Arc<dyn GrantStore>) -> Self {
        Self { clients, grants }
    }

    /// Run the validation ladder and issue a grant.
    ///
    /// The checks run in a fixed order: required parameters, client
    /// existence, redirect binding, response type. The first failure wins.
    pub async fn authorize(&self, request: AuthorizeRequest) -> OAuthResult<AuthorizeRedirect> {
        let params = (
            non_empty(request.client_id.as_deref()),
            non_empty(request.redirect_uri.as_deref()),
            non_empty(request.response_type.as_deref()),
        );
        let (Some(client_id), Some(redirect_uri), Some(response_type)) = params else {
            return Err(OAuthError::invalid_request("Missing required parameters"));
        };

        if self.clients.lookup(client_id).await.is_none() {
            return Err(OAuthError::invalid_client("Unknown client"));
        }

        if !self.clients.validate_redirect(client_id, redirect_uri).await {
            return Err(OAuthError::invalid_request("Invalid redirect URI"));
        }

        if response_type != "code" {
            return Err(OAuthError::unsupported_response_type(
                "Only response_type=code is supported",
            ));
        }

        let scope = non_empty(request.scope.as_deref()).unwrap_or(DEFAULT_SCOPE);
        let grant = self.grants.issue(client_id, redirect_uri, scope).await;

        let location = redirect_location(redirect_uri, &grant.code, request.state.as_deref())?;

        tracing::info!(
            client_id = %client_id,
            scope = %scope,
            code = %secrets::fingerprint(&grant.code),
            "Issued authorization code"
        );

        Ok(AuthorizeRedirect { location })
    }
}

/// Append `code` and (when non-empty) `state` to the redirect URI, keeping
/// any query parameters the URI already carries.
fn redirect_location(redirect_uri: &str, code: &str, state: Option<&str>) -> OAuthResult<String> {
    let mut url = Url::parse(redirect_uri)
        .map_err(|_| OAuthError::server_error("Failed to build redirect location"))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("code", code);
        if let Some(state) = state.filter(|s| !s.is_empty()) {
            pairs.append_pair("state", state);
        }
    }
    Ok(url.into())
}
