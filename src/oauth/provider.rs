//! Persistence contracts consumed by the grant engine and authenticator.
//!
//! Implementations own the rows; the business rules around them (expiry,
//! single use) are enforced by the callers in this crate. `Ok(None)` means
//! "no such row" — a normal negative answer — while [`StorageError`] is
//! reserved for infrastructure trouble and is never folded into an
//! authentication decision.

use async_trait::async_trait;

use super::types::{AccessTokenValues, Client, GrantType, RefreshTokenValues};
use crate::error::StorageError;
use crate::security::User;

/// Read access to registered OAuth clients.
#[async_trait]
pub trait ClientStore: Send + Sync + 'static {
    /// Resolves a client by id, verifying its secret and that it may use
    /// the given grant type. Any failed check yields `Ok(None)`.
    async fn get_client(
        &self,
        id: &str,
        secret: &str,
        grant_type: GrantType,
    ) -> Result<Option<Client>, StorageError>;

    /// Looks up a client by id alone, for resolving a token's owner.
    async fn find_client(&self, id: &str) -> Result<Option<Client>, StorageError>;
}

#[async_trait]
pub trait AccessTokenStore: Send + Sync + 'static {
    async fn create(&self, values: AccessTokenValues) -> Result<(), StorageError>;

    async fn find(&self, token: &str) -> Result<Option<AccessTokenValues>, StorageError>;

    /// Removes a token row. Used to roll back a half-written pair.
    async fn delete(&self, token: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    async fn create(&self, values: RefreshTokenValues) -> Result<(), StorageError>;

    /// Atomically consumes an unexpired refresh token.
    ///
    /// The unexpired check and the consumed mark must be one atomic unit per
    /// row: of two concurrent calls with the same token string, exactly one
    /// may receive the row. `Ok(None)` covers absent, already consumed and
    /// past-expiry tokens alike. Consumed rows are kept, not deleted.
    async fn redeem(&self, token: &str) -> Result<Option<RefreshTokenValues>, StorageError>;
}

/// Lookup into the external identity store.
#[async_trait]
pub trait UserProvider: Send + Sync + 'static {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StorageError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
}
