//! Deep storage probe behind the `/health` endpoint.
//!
//! Checks out a real connection and runs two introspection queries so the
//! endpoint proves end-to-end connectivity, not just pool construction.

use async_trait::async_trait;
use diesel::sql_types::Text;
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{Diagnostics, DiagnosticsError, StorageReport};

use super::error_map::{classify, DbFailure};
use super::pool::{DbPool, PoolError};

/// Diesel-backed implementation of the `Diagnostics` port.
#[derive(Clone)]
pub struct DieselDiagnostics {
    pool: DbPool,
}

impl DieselDiagnostics {
    /// Create a new probe with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DiagnosticsError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DiagnosticsError::connection(message)
        }
    }
}

fn map_db_failure(failure: DbFailure) -> DiagnosticsError {
    match failure {
        DbFailure::ConnectionLost(message) => DiagnosticsError::connection(message),
        DbFailure::Other(message) => DiagnosticsError::query(message),
        other => DiagnosticsError::query(format!("probe query failed: {other:?}")),
    }
}

#[derive(QueryableByName)]
struct DatabaseNameRow {
    #[diesel(sql_type = Text)]
    database: String,
}

#[derive(QueryableByName)]
struct TableNameRow {
    #[diesel(sql_type = Text)]
    tablename: String,
}

#[async_trait]
impl Diagnostics for DieselDiagnostics {
    async fn storage_report(&self) -> Result<StorageReport, DiagnosticsError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let database: DatabaseNameRow =
            diesel::sql_query("SELECT current_database() AS database")
                .get_result(&mut conn)
                .await
                .map_err(|err| map_db_failure(classify(err)))?;

        let tables: Vec<TableNameRow> = diesel::sql_query(
            "SELECT tablename FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename",
        )
        .load(&mut conn)
        .await
        .map_err(|err| map_db_failure(classify(err)))?;

        Ok(StorageReport {
            database: database.database,
            tables: tables.into_iter().map(|row| row.tablename).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("pool exhausted"));
        assert!(matches!(err, DiagnosticsError::Connection { .. }));
    }

    #[rstest]
    fn query_failures_keep_their_message() {
        let err = map_db_failure(DbFailure::Other("permission denied".to_owned()));
        assert!(err.to_string().contains("permission denied"));
    }
}
