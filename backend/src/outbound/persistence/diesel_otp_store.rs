//! PostgreSQL-backed `OtpStore` implementation.
//!
//! The live API never issues or verifies OTP codes; the only operation the
//! system performs against this table is expiry housekeeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OtpStore, OtpStoreError};

use super::error_map::{classify, DbFailure};
use super::pool::{DbPool, PoolError};
use super::schema::otp_tokens;

/// Diesel-backed implementation of the `OtpStore` port.
#[derive(Clone)]
pub struct DieselOtpStore {
    pool: DbPool,
}

impl DieselOtpStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OtpStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            OtpStoreError::connection(message)
        }
    }
}

fn map_db_failure(failure: DbFailure) -> OtpStoreError {
    match failure {
        DbFailure::ConnectionLost(message) => OtpStoreError::connection(message),
        DbFailure::UniqueViolation
        | DbFailure::ForeignKeyViolation
        | DbFailure::NotFound => OtpStoreError::query("unexpected constraint failure"),
        DbFailure::Other(message) => OtpStoreError::query(message),
    }
}

#[async_trait]
impl OtpStore for DieselOtpStore {
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, OtpStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(otp_tokens::table.filter(otp_tokens::expires_at.le(now)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err)))?;

        Ok(deleted as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, OtpStoreError::Connection { .. }));
    }

    #[rstest]
    fn other_failures_map_to_query_errors() {
        let err = map_db_failure(DbFailure::Other("syntax error".to_owned()));
        assert!(err.to_string().contains("syntax error"));
    }
}
