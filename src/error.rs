//! Security error taxonomy and its mapping onto wire responses.

use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::http::Response;

/// Infrastructure failure raised by a storage collaborator.
///
/// The payload is diagnostic detail for server-side logs; it never reaches a
/// response body.
#[derive(Debug, Error)]
#[error("storage failure: {0}")]
pub struct StorageError(pub String);

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        StorageError(message.into())
    }
}

/// Every way the security layer can refuse a request.
///
/// All variants except `Internal` are safe to surface to callers by kind.
/// `Internal` stays opaque on the wire: infrastructure trouble must not be
/// presented as an authentication decision, nor leak its detail.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Client resolution failed: unknown id, wrong secret, or a grant type
    /// the client is not allowed to use.
    #[error("invalid grant")]
    InvalidGrant,
    /// The requested grant type is outside the supported set.
    #[error("unknown grant type")]
    UnknownGrantType,
    /// Password grant failed. Unknown username and wrong password are
    /// deliberately indistinguishable here.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The bearer header is missing or malformed.
    #[error("authorization required")]
    AuthorizationRequired,
    /// The presented token exists but is past its expiry.
    #[error("authorization expired")]
    AuthorizationExpired,
    /// Token not found, refresh token already spent, or a resolved identity
    /// no longer exists.
    #[error("unauthorized")]
    Unauthorized,
    /// No firewall area matched, or a secured area refused the request.
    #[error("access denied")]
    AccessDenied,
    /// Infrastructure failure. Logged in full, surfaced opaquely.
    #[error("internal server error")]
    Internal(#[from] StorageError),
}

impl SecurityError {
    /// Shorthand for an [`SecurityError::Internal`] with server-side detail.
    pub fn internal(detail: impl Into<String>) -> Self {
        SecurityError::Internal(StorageError::new(detail))
    }

    /// The HTTP status class this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            SecurityError::InvalidGrant
            | SecurityError::UnknownGrantType
            | SecurityError::AuthorizationRequired
            | SecurityError::AuthorizationExpired
            | SecurityError::Unauthorized => 401,
            SecurityError::InvalidCredentials | SecurityError::AccessDenied => 403,
            SecurityError::Internal(_) => 500,
        }
    }

    /// The stable machine-readable error code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            SecurityError::InvalidGrant => "invalid_grant",
            SecurityError::UnknownGrantType => "unknown_grant_type",
            SecurityError::InvalidCredentials => "invalid_credentials",
            SecurityError::AuthorizationRequired => "authorization_required",
            SecurityError::AuthorizationExpired => "authorization_expired",
            SecurityError::Unauthorized => "unauthorized",
            SecurityError::AccessDenied => "access_denied",
            SecurityError::Internal(_) => "server_error",
        }
    }

    /// Convert this error into a JSON response with the proper status.
    ///
    /// The description for `Internal` is a fixed string; the underlying
    /// detail goes to the log only.
    pub fn into_response(&self) -> Response {
        let description = match self {
            SecurityError::Internal(storage) => {
                error!(detail = %storage, "internal failure during security handling");
                "Internal server error".to_string()
            }
            other => {
                warn!(error_code = other.code(), http_status = other.status(), "request refused");
                other.to_string()
            }
        };
        let body = json!({ "error": self.code(), "error_description": description });
        Response::json(self.status(), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(SecurityError::AuthorizationRequired.status(), 401);
        assert_eq!(SecurityError::Unauthorized.status(), 401);
        assert_eq!(SecurityError::AccessDenied.status(), 403);
        assert_eq!(SecurityError::InvalidCredentials.status(), 403);
        assert_eq!(SecurityError::internal("boom").status(), 500);
    }

    #[test]
    fn test_internal_detail_stays_out_of_the_body() {
        let resp = SecurityError::internal("pg: connection refused at 10.0.0.3").into_response();
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["error"], "server_error");
        assert_eq!(body["error_description"], "Internal server error");
        assert!(!String::from_utf8_lossy(&resp.body).contains("10.0.0.3"));
    }

    #[test]
    fn test_taxonomy_codes_are_stable() {
        let resp = SecurityError::AuthorizationExpired.into_response();
        assert_eq!(resp.status, 401);
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["error"], "authorization_expired");
    }
}
