//! Password hashing and verification.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashingFailed,
    /// The stored hash does not parse as a PHC string. Distinct from a
    /// mismatch, which is a normal negative result.
    #[error("malformed password hash")]
    MalformedHash,
}

/// Argon2id-based password encoder. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordEncoder;

impl PasswordEncoder {
    pub fn new() -> Self {
        PasswordEncoder
    }

    /// Hashes a raw password with a fresh random salt, returning the PHC
    /// string to store.
    pub fn encode(&self, raw: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| PasswordError::HashingFailed)
    }

    /// Verifies a candidate password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors only when the stored hash
    /// itself is unusable. The comparison is the hashing library's
    /// constant-time verification.
    pub fn verify(&self, encoded: &str, raw: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(encoded).map_err(|_| PasswordError::MalformedHash)?;
        match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(PasswordError::MalformedHash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_verify() {
        let encoder = PasswordEncoder::new();
        let hash = encoder.encode("tr0ub4dor&3").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(encoder.verify(&hash, "tr0ub4dor&3").unwrap());
    }

    #[test]
    fn test_mismatch_is_false_not_error() {
        let encoder = PasswordEncoder::new();
        let hash = encoder.encode("correct horse").unwrap();
        assert!(!encoder.verify(&hash, "battery staple").unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let encoder = PasswordEncoder::new();
        let a = encoder.encode("swordfish").unwrap();
        let b = encoder.encode("swordfish").unwrap();
        assert_ne!(a, b);
        assert!(encoder.verify(&b, "swordfish").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let encoder = PasswordEncoder::new();
        assert!(matches!(
            encoder.verify("not-a-phc-string", "anything"),
            Err(PasswordError::MalformedHash)
        ));
    }
}
