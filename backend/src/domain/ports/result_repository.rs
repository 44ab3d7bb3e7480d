//! Port abstraction for result-history persistence adapters.
use async_trait::async_trait;

use crate::domain::result::{DateStamp, MonthRef, NewResult, ResultRow};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by result repository adapters.
    pub enum ResultRepositoryError {
        /// Repository connection could not be established or checked out.
        Connection { message: String } => "result repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "result repository query failed: {message}",
        /// No history row carries the requested id.
        Missing { id: i64 } => "Result not found",
    }
}

impl From<ResultRepositoryError> for crate::domain::Error {
    fn from(value: ResultRepositoryError) -> Self {
        match value {
            ResultRepositoryError::Connection { message } => Self::service_unavailable(message),
            ResultRepositoryError::Query { message } => Self::internal(message),
            ResultRepositoryError::Missing { .. } => Self::not_found(value.to_string()),
        }
    }
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append one history row, returning the assigned id.
    ///
    /// Appends never overwrite: two rows for the same `(game, date, slot)`
    /// coexist and the larger id is the more recent declaration.
    async fn insert(&self, row: &NewResult) -> Result<i64, ResultRepositoryError>;

    /// Delete one historical row by id.
    async fn delete_by_id(&self, id: i64) -> Result<(), ResultRepositoryError>;

    /// Every row for the date, ordered by `slot_min` then id ascending.
    async fn rows_for_date(&self, date: &DateStamp)
        -> Result<Vec<ResultRow>, ResultRepositoryError>;

    /// Every row inside the month, ordered by `date_str` then id ascending.
    async fn rows_for_month(
        &self,
        month: MonthRef,
    ) -> Result<Vec<ResultRow>, ResultRepositoryError>;
}
