//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::user::{EmailAddress, NewUser, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established or checked out.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email address is already registered.
        DuplicateEmail { email: String } => "Email already registered",
    }
}

impl From<UserRepositoryError> for crate::domain::Error {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::Connection { message } => Self::service_unavailable(message),
            UserRepositoryError::Query { message } => Self::internal(message),
            UserRepositoryError::DuplicateEmail { .. } => Self::conflict(value.to_string()),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch a user by normalized email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by surrogate id.
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserRepositoryError>;
}
