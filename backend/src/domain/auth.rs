//! Authentication primitives: validated login and registration payloads.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use zeroize::Zeroizing;

use super::user::{EmailAddress, Role, UserValidationError};

/// Validated login credentials used by the auth service.
///
/// ## Invariants
/// - `email` is normalized via [`EmailAddress`].
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address suitable for user lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration payload; the password is still plaintext here and
/// must be hashed before it reaches a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    email: EmailAddress,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Construct a registration from raw request fields.
    ///
    /// `role` defaults to [`Role::Viewer`] when absent; an unrecognized label
    /// is rejected rather than written through to the store.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let role = match role {
            Some(label) if !label.trim().is_empty() => Role::parse(label)?,
            _ => Role::default(),
        };
        Ok(Self {
            name: name.to_owned(),
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
