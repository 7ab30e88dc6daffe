//! OAuth2 core primitives: clients, grants, token rows and wire shapes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SecurityError;

/// The closed set of supported grant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    Password,
    RefreshToken,
    ClientCredentials,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::RefreshToken => "refresh_token",
            GrantType::ClientCredentials => "client_credentials",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = SecurityError;

    /// Parses a wire value. Anything outside the closed set is rejected
    /// here, before any storage is touched.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(GrantType::Password),
            "refresh_token" => Ok(GrantType::RefreshToken),
            "client_credentials" => Ok(GrantType::ClientCredentials),
            _ => Err(SecurityError::UnknownGrantType),
        }
    }
}

/// A grant request's strategy together with its credentials.
#[derive(Debug, Clone)]
pub enum Grant {
    Password { username: String, password: String },
    RefreshToken { token: String },
    ClientCredentials,
}

impl Grant {
    pub fn grant_type(&self) -> GrantType {
        match self {
            Grant::Password { .. } => GrantType::Password,
            Grant::RefreshToken { .. } => GrantType::RefreshToken,
            Grant::ClientCredentials => GrantType::ClientCredentials,
        }
    }
}

/// A calling application. Provisioned externally; read-only here.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: String,
    /// PHC-format hash of the client secret.
    pub secret_hash: String,
    pub grant_types: Vec<GrantType>,
}

impl Client {
    pub fn allows(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }
}

/// Input to [`crate::oauth::grant::GrantEngine::grant_access_token`].
#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub client_id: String,
    pub client_secret: String,
    pub grant: Grant,
}

impl GrantRequest {
    /// Builds a request from raw token-endpoint form fields.
    ///
    /// An unknown grant type is rejected right here, before any store is
    /// involved. Fields a grant does not use are ignored; missing ones
    /// default to empty and fail the later credential checks naturally.
    pub fn from_wire(
        grant_type: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<Self, SecurityError> {
        let grant = match grant_type.parse::<GrantType>()? {
            GrantType::Password => Grant::Password {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
            },
            GrantType::RefreshToken => Grant::RefreshToken {
                token: refresh_token.unwrap_or_default(),
            },
            GrantType::ClientCredentials => Grant::ClientCredentials,
        };
        Ok(GrantRequest {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant,
        })
    }
}

/// The token pair handed back to a successful grant request.
#[derive(Debug, Clone, Serialize)]
pub struct GrantResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, epoch seconds.
    pub access_token_expires_at: i64,
    pub refresh_token_expires_at: i64,
}

/// A stored access token row. Immutable once issued.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenValues {
    pub token: String,
    /// Absent for client-credentials grants.
    pub user_id: Option<String>,
    pub client_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessTokenValues {
    pub fn expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// A stored refresh token row.
///
/// Single-use: `consumed` flips exactly once, atomically with redemption,
/// and the row is kept afterwards for replay detection.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenValues {
    pub token: String,
    pub user_id: Option<String>,
    pub client_id: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl RefreshTokenValues {
    pub fn expired(&self) -> bool {
        self.consumed || self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_grant_type_round_trip() {
        for s in ["password", "refresh_token", "client_credentials"] {
            assert_eq!(s.parse::<GrantType>().unwrap().as_str(), s);
        }
    }

    #[test]
    fn test_unknown_grant_type_is_rejected() {
        assert!(matches!(
            "authorization_code".parse::<GrantType>(),
            Err(SecurityError::UnknownGrantType)
        ));
        assert!(matches!(
            "".parse::<GrantType>(),
            Err(SecurityError::UnknownGrantType)
        ));
    }

    #[test]
    fn test_from_wire_rejects_unknown_grant_type() {
        let err = GrantRequest::from_wire("implicit", "web", "secret", None, None, None);
        assert!(matches!(err, Err(SecurityError::UnknownGrantType)));
    }

    #[test]
    fn test_from_wire_builds_password_grant() {
        let request = GrantRequest::from_wire(
            "password",
            "web",
            "secret",
            Some("ada".into()),
            Some("pw".into()),
            None,
        )
        .unwrap();
        assert!(matches!(request.grant, Grant::Password { .. }));
    }

    #[test]
    fn test_consumed_refresh_token_counts_as_expired() {
        let row = RefreshTokenValues {
            token: "t".into(),
            user_id: None,
            client_id: "c".into(),
            expires_at: Utc::now() + Duration::hours(1),
            consumed: true,
        };
        assert!(row.expired());
    }
}
