//! User accounts for the admin panel.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyEmail,
    EmptyPassword,
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::UnknownRole => write!(f, "role must be admin or viewer"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Login identifier: trimmed, lower-cased, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize and validate a raw email string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self(normalized))
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authorization tier carried in tokens and checked on mutating routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    /// Parse a role label, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(UserValidationError::UnknownRole),
        }
    }

    /// The stored label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Viewer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted user row. `password_hash` is the Argon2id PHC string and never
/// leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: EmailAddress,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user row; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: EmailAddress,
    pub role: Role,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Admin@Example.COM", "admin@example.com")]
    #[case("  ops@example.com  ", "ops@example.com")]
    fn emails_are_trimmed_and_lower_cased(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(EmailAddress::new(raw).expect("valid").as_str(), expected);
    }

    #[rstest]
    fn blank_emails_are_rejected() {
        assert_eq!(
            EmailAddress::new("   "),
            Err(UserValidationError::EmptyEmail)
        );
    }

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("Admin", Role::Admin)]
    #[case("viewer", Role::Viewer)]
    #[case(" VIEWER ", Role::Viewer)]
    fn known_roles_parse(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::parse(raw).expect("valid role"), expected);
    }

    #[rstest]
    #[case("root")]
    #[case("")]
    fn unknown_roles_are_rejected(#[case] raw: &str) {
        assert_eq!(Role::parse(raw), Err(UserValidationError::UnknownRole));
    }

    #[rstest]
    fn default_role_is_viewer() {
        assert_eq!(Role::default(), Role::Viewer);
    }
}
