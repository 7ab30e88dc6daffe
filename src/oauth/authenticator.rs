//! Bearer-token authentication against the access token store.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::provider::{AccessTokenStore, ClientStore, UserProvider};
use crate::error::SecurityError;
use crate::http::Request;
use crate::security::GuardToken;

/// Resolves `Authorization: <scheme> <token>` headers to a verified
/// identity.
pub struct BearerAuthenticator {
    access_tokens: Arc<dyn AccessTokenStore>,
    clients: Arc<dyn ClientStore>,
    users: Arc<dyn UserProvider>,
}

impl BearerAuthenticator {
    pub fn new(
        access_tokens: Arc<dyn AccessTokenStore>,
        clients: Arc<dyn ClientStore>,
        users: Arc<dyn UserProvider>,
    ) -> Self {
        BearerAuthenticator {
            access_tokens,
            clients,
            users,
        }
    }

    /// Header parsing happens before any storage lookup; a failed step
    /// short-circuits, there is no retry within one attempt.
    #[instrument(skip_all, fields(path = %request.path()))]
    pub async fn authenticate(&self, request: &Request) -> Result<GuardToken, SecurityError> {
        let header = request
            .header("authorization")
            .ok_or(SecurityError::AuthorizationRequired)?;
        let token = parse_bearer(header)?;
        let access_token = self
            .access_tokens
            .find(token)
            .await?
            .ok_or(SecurityError::Unauthorized)?;
        if access_token.expired() {
            return Err(SecurityError::AuthorizationExpired);
        }
        let client = self
            .clients
            .find_client(&access_token.client_id)
            .await?
            .ok_or_else(|| {
                debug!(client_id = %access_token.client_id, "token owner no longer registered");
                SecurityError::Unauthorized
            })?;
        let user = match &access_token.user_id {
            Some(id) => Some(
                self.users
                    .find_by_id(id)
                    .await?
                    .ok_or(SecurityError::Unauthorized)?,
            ),
            None => None,
        };
        Ok(GuardToken::oauth(client, user))
    }
}

/// Splits `"<scheme> <token>"`. Anything other than exactly two non-empty
/// parts means the request carries no usable authorization.
fn parse_bearer(header: &str) -> Result<&str, SecurityError> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if !scheme.is_empty() && !token.is_empty() => Ok(token),
        _ => Err(SecurityError::AuthorizationRequired),
    }
}
