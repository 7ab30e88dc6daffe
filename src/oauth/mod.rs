//! OAuth2-style token issuance: grant dispatch, token lifecycle, stores.

pub mod authenticator;
pub mod grant;
pub mod memory;
pub mod provider;
pub mod types;
