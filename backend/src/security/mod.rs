//! Credential mechanics: password hashing and bearer tokens.

mod password;
mod token;

pub use password::{CredentialHasher, PasswordHashError};
pub use token::{Claims, TokenCodec, TokenError, DEFAULT_TOKEN_TTL_SECS};
