//! Token issuance and the grant dispatch engine.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, instrument, warn};

use super::provider::{AccessTokenStore, ClientStore, RefreshTokenStore, UserProvider};
use super::types::{
    AccessTokenValues, Client, Grant, GrantRequest, GrantResponse, RefreshTokenValues,
};
use crate::error::SecurityError;
use crate::security::password::PasswordEncoder;

/// 256 bits of entropy per token string.
const TOKEN_ENTROPY_BYTES: usize = 32;

fn random_token(rng: &SystemRandom) -> Result<String, SecurityError> {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| SecurityError::internal("system random generator failure"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Mints and persists access/refresh token pairs.
pub struct TokenIssuer {
    access_tokens: Arc<dyn AccessTokenStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    access_token_ttl: i64,
    refresh_token_ttl: i64,
    rng: SystemRandom,
}

impl TokenIssuer {
    /// TTLs are in seconds.
    pub fn new(
        access_tokens: Arc<dyn AccessTokenStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        access_token_ttl: i64,
        refresh_token_ttl: i64,
    ) -> Self {
        TokenIssuer {
            access_tokens,
            refresh_tokens,
            access_token_ttl,
            refresh_token_ttl,
            rng: SystemRandom::new(),
        }
    }

    /// Issues a fresh pair bound to the client and, optionally, a subject.
    ///
    /// The pair is all-or-nothing: if the refresh row cannot be written, the
    /// already written access row is deleted again and the whole call fails.
    pub async fn issue(
        &self,
        user_id: Option<String>,
        client_id: &str,
    ) -> Result<(AccessTokenValues, RefreshTokenValues), SecurityError> {
        let now = Utc::now();
        let access = AccessTokenValues {
            token: random_token(&self.rng)?,
            user_id: user_id.clone(),
            client_id: client_id.to_owned(),
            expires_at: now + Duration::seconds(self.access_token_ttl),
        };
        let refresh = RefreshTokenValues {
            token: random_token(&self.rng)?,
            user_id,
            client_id: client_id.to_owned(),
            expires_at: now + Duration::seconds(self.refresh_token_ttl),
            consumed: false,
        };
        self.access_tokens.create(access.clone()).await?;
        if let Err(err) = self.refresh_tokens.create(refresh.clone()).await {
            if let Err(cleanup) = self.access_tokens.delete(&access.token).await {
                warn!(detail = %cleanup, "rollback of half-written token pair failed");
            }
            return Err(err.into());
        }
        Ok((access, refresh))
    }
}

/// Validates clients, dispatches on the grant and calls the issuer.
pub struct GrantEngine {
    clients: Arc<dyn ClientStore>,
    users: Arc<dyn UserProvider>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    encoder: PasswordEncoder,
    issuer: TokenIssuer,
}

impl GrantEngine {
    /// TTLs are in seconds.
    pub fn new(
        clients: Arc<dyn ClientStore>,
        access_tokens: Arc<dyn AccessTokenStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        users: Arc<dyn UserProvider>,
        access_token_ttl: i64,
        refresh_token_ttl: i64,
    ) -> Self {
        let issuer = TokenIssuer::new(
            access_tokens,
            refresh_tokens.clone(),
            access_token_ttl,
            refresh_token_ttl,
        );
        GrantEngine {
            clients,
            users,
            refresh_tokens,
            encoder: PasswordEncoder::new(),
            issuer,
        }
    }

    /// Resolves the client, resolves a subject per grant and issues a pair.
    /// Every step is a hard gate; there is no partial success.
    #[instrument(
        skip(self, request),
        fields(client_id = %request.client_id, grant_type = %request.grant.grant_type())
    )]
    pub async fn grant_access_token(
        &self,
        request: GrantRequest,
    ) -> Result<GrantResponse, SecurityError> {
        let client = self
            .clients
            .get_client(
                &request.client_id,
                &request.client_secret,
                request.grant.grant_type(),
            )
            .await?
            .ok_or(SecurityError::InvalidGrant)?;
        let user_id = match &request.grant {
            Grant::Password { username, password } => {
                Some(self.resolve_password_subject(username, password).await?)
            }
            Grant::RefreshToken { token } => self.consume_refresh_token(token, &client).await?,
            Grant::ClientCredentials => None,
        };
        let (access, refresh) = self.issuer.issue(user_id, &client.id).await?;
        Ok(GrantResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            access_token_expires_at: access.expires_at.timestamp(),
            refresh_token_expires_at: refresh.expires_at.timestamp(),
        })
    }

    /// Unknown username and wrong password collapse into one error kind so
    /// the response does not reveal which usernames exist.
    async fn resolve_password_subject(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, SecurityError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!("password grant for unknown username");
            return Err(SecurityError::InvalidCredentials);
        };
        match self.encoder.verify(&user.password_hash, password) {
            Ok(true) => Ok(user.id),
            Ok(false) => Err(SecurityError::InvalidCredentials),
            Err(err) => Err(SecurityError::internal(format!(
                "unusable password hash for user {}: {err}",
                user.id
            ))),
        }
    }

    /// Spends the refresh token and carries its subject forward. Rotation is
    /// full: the spent token is gone for good and the caller gets a brand
    /// new pair, refresh token included.
    async fn consume_refresh_token(
        &self,
        token: &str,
        client: &Client,
    ) -> Result<Option<String>, SecurityError> {
        let Some(redeemed) = self.refresh_tokens.redeem(token).await? else {
            return Err(SecurityError::Unauthorized);
        };
        if redeemed.client_id != client.id {
            warn!(token_client = %redeemed.client_id, "refresh token presented by a different client");
            return Err(SecurityError::Unauthorized);
        }
        Ok(redeemed.user_id)
    }
}
