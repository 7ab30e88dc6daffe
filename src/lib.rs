//! Security middleware: a path-pattern firewall, pluggable authenticators
//! and an OAuth2-style engine issuing opaque bearer tokens.
//!
//! The HTTP server, router and database live outside this crate; they are
//! reached through the narrow types in [`http`] and the store traits in
//! [`oauth::provider`].

pub mod error;
pub mod extensions;
pub mod http;
pub mod oauth;
pub mod security;

pub use error::{SecurityError, StorageError};
pub use http::{Handler, Request, Response};
pub use oauth::authenticator::BearerAuthenticator;
pub use oauth::grant::{GrantEngine, TokenIssuer};
pub use oauth::memory::{
    InMemoryAccessTokenStore, InMemoryClientStore, InMemoryRefreshTokenStore, InMemoryUserStore,
};
pub use oauth::provider::{AccessTokenStore, ClientStore, RefreshTokenStore, UserProvider};
pub use oauth::types::{
    AccessTokenValues, Client, Grant, GrantRequest, GrantResponse, GrantType, RefreshTokenValues,
};
pub use security::firewall::{Area, Authenticator, Firewall, FirewallBuilder, FirewallConfigError};
pub use security::password::{PasswordEncoder, PasswordError};
pub use security::{GuardToken, SecurityContext, User};
