//! Argon2id password hashing and verification.
//!
//! Stored hashes are PHC strings carrying their own salt and parameters, so
//! verification never needs out-of-band state.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use tracing::warn;

/// Errors raised while producing a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Hashes and verifies passwords with Argon2id default parameters.
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher;

impl CredentialHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password into a PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// An unparseable stored hash counts as a failed verification; the row is
    /// unusable either way and the caller must not learn why.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(err) => {
                warn!(error = %err, "stored password hash failed to parse");
                false
            }
        }
    }
}
