//! Shared classification of Diesel failures.
//!
//! Adapters turn a [`DbFailure`] into their own port error so constraint
//! violations become `Conflict`-class outcomes instead of leaking as
//! internal errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Driver-level failure, reduced to the categories the ports care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// A unique constraint rejected the write.
    UniqueViolation,
    /// A foreign key constraint rejected the write or delete.
    ForeignKeyViolation,
    /// The connection died mid-operation.
    ConnectionLost(String),
    /// The query matched no row where one was required.
    NotFound,
    /// Anything else; the message stays out of client responses.
    Other(String),
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => {
            debug!(error = %other, "diesel operation failed");
        }
    }

    match error {
        DieselError::NotFound => DbFailure::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DbFailure::UniqueViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DbFailure::ForeignKeyViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DbFailure::ConnectionLost(info.message().to_owned())
        }
        other => DbFailure::Other(other.to_string()),
    }
}
