//! In-memory default implementations for the persistence contracts.
//!
//! These back tests and small deployments; production setups plug in
//! database-backed implementations of the same traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use super::provider::{AccessTokenStore, ClientStore, RefreshTokenStore, UserProvider};
use super::types::{AccessTokenValues, Client, GrantType, RefreshTokenValues};
use crate::error::StorageError;
use crate::security::password::PasswordEncoder;
use crate::security::User;

#[derive(Clone)]
pub struct InMemoryClientStore {
    clients: Arc<DashMap<String, Client>>,
    encoder: PasswordEncoder,
}

impl InMemoryClientStore {
    /// Creates a store holding an initial set of clients.
    pub fn new(initial_clients: Vec<Client>) -> Self {
        let map = DashMap::new();
        for client in initial_clients {
            map.insert(client.id.clone(), client);
        }
        Self {
            clients: Arc::new(map),
            encoder: PasswordEncoder::new(),
        }
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn get_client(
        &self,
        id: &str,
        secret: &str,
        grant_type: GrantType,
    ) -> Result<Option<Client>, StorageError> {
        let Some(client) = self.clients.get(id).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        if !client.allows(grant_type) {
            return Ok(None);
        }
        match self.encoder.verify(&client.secret_hash, secret) {
            Ok(true) => Ok(Some(client)),
            Ok(false) => Ok(None),
            Err(err) => Err(StorageError::new(format!(
                "unusable secret hash for client {id}: {err}"
            ))),
        }
    }

    async fn find_client(&self, id: &str) -> Result<Option<Client>, StorageError> {
        Ok(self.clients.get(id).map(|entry| entry.value().clone()))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAccessTokenStore {
    tokens: Arc<DashMap<String, AccessTokenValues>>,
}

impl InMemoryAccessTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenStore for InMemoryAccessTokenStore {
    async fn create(&self, values: AccessTokenValues) -> Result<(), StorageError> {
        self.tokens.insert(values.token.clone(), values);
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<AccessTokenValues>, StorageError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, token: &str) -> Result<(), StorageError> {
        self.tokens.remove(token);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Arc<DashMap<String, RefreshTokenValues>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(&self, values: RefreshTokenValues) -> Result<(), StorageError> {
        self.tokens.insert(values.token.clone(), values);
        Ok(())
    }

    async fn redeem(&self, token: &str) -> Result<Option<RefreshTokenValues>, StorageError> {
        // The shard write guard held by get_mut makes the check-and-mark one
        // atomic unit per row; concurrent redeemers serialize here.
        match self.tokens.get_mut(token) {
            Some(mut entry) => {
                let row = entry.value_mut();
                if row.expired() {
                    return Ok(None);
                }
                row.consumed = true;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    /// Creates a store holding an initial set of users, keyed by id.
    pub fn new(initial_users: Vec<User>) -> Self {
        let mut map = HashMap::new();
        for user in initial_users {
            map.insert(user.id.clone(), user);
        }
        Self {
            users: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl UserProvider for InMemoryUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StorageError> {
        let guard = self.users.read().await;
        Ok(guard.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let guard = self.users.read().await;
        Ok(guard.values().find(|user| user.username == username).cloned())
    }
}
