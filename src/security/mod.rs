//! Identity model and the request-scoped security context.

pub mod firewall;
pub mod password;

use crate::http::Request;
use crate::oauth::types::Client;

/// An end-user identity, owned by an external identity store.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    /// PHC-format password hash, verified by
    /// [`password::PasswordEncoder`].
    pub password_hash: String,
}

/// The identity resolved by an authenticator.
///
/// `user` is absent for anonymous requests and for tokens issued through the
/// client-credentials grant.
#[derive(Debug, Clone)]
pub struct GuardToken {
    client: Option<Client>,
    user: Option<User>,
    provider: &'static str,
}

impl GuardToken {
    /// Identity established from a bearer token.
    pub fn oauth(client: Client, user: Option<User>) -> Self {
        GuardToken {
            client: Some(client),
            user,
            provider: "oauth",
        }
    }

    /// Identity for declared-open areas.
    pub fn anonymous() -> Self {
        GuardToken {
            client: None,
            user: None,
            provider: "anonymous",
        }
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn provider(&self) -> &str {
        self.provider
    }
}

/// Request-scoped security context, created by the firewall after a
/// successful authentication and carried in the request's typed extension
/// slot. Never persisted.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    pub token: GuardToken,
}

impl SecurityContext {
    /// Reads the context a firewall attached to this request, if any.
    pub fn from_request(request: &Request) -> Option<&SecurityContext> {
        request.params.get::<SecurityContext>()
    }
}
