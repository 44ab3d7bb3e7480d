//! PostgreSQL-backed `ResultRepository` implementation using Diesel ORM.
//!
//! Inserts are plain appends; the table carries no uniqueness on
//! `(game_id, date_str, slot_min)` and readers rely on id order.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ResultRepository, ResultRepositoryError};
use crate::domain::result::{DateStamp, MonthRef, NewResult, ResultRow};
use crate::domain::timeslot::TimeSlot;

use super::error_map::{classify, DbFailure};
use super::models::{NewTimewiseResultRow, TimewiseResultRow};
use super::pool::{DbPool, PoolError};
use super::schema::timewise_results;

/// Diesel-backed implementation of the `ResultRepository` port.
#[derive(Clone)]
pub struct DieselResultRepository {
    pool: DbPool,
}

impl DieselResultRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ResultRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ResultRepositoryError::connection(message)
        }
    }
}

fn map_db_failure(failure: DbFailure) -> ResultRepositoryError {
    match failure {
        DbFailure::ConnectionLost(message) => ResultRepositoryError::connection(message),
        DbFailure::UniqueViolation => {
            ResultRepositoryError::query("unexpected unique violation on history table")
        }
        DbFailure::ForeignKeyViolation => {
            ResultRepositoryError::query("history row references a missing game")
        }
        DbFailure::NotFound => ResultRepositoryError::query("record not found"),
        DbFailure::Other(message) => ResultRepositoryError::query(message),
    }
}

fn row_to_result(row: TimewiseResultRow) -> Result<ResultRow, ResultRepositoryError> {
    let slot_min = u16::try_from(row.slot_min)
        .map_err(|_| ResultRepositoryError::query("stored slot is negative"))?;
    let slot = TimeSlot::from_minutes(slot_min)
        .map_err(|err| ResultRepositoryError::query(format!("stored slot rejected: {err}")))?;
    let date = DateStamp::new(&row.date_str)
        .map_err(|err| ResultRepositoryError::query(format!("stored date rejected: {err}")))?;
    let value = crate::domain::result::ResultValue::new(&row.value)
        .map_err(|err| ResultRepositoryError::query(format!("stored value rejected: {err}")))?;
    Ok(ResultRow {
        id: row.id,
        game_id: row.game_id,
        date,
        slot,
        value,
        source: row.source,
        note: row.note,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ResultRepository for DieselResultRepository {
    async fn insert(&self, row: &NewResult) -> Result<i64, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewTimewiseResultRow {
            game_id: row.game_id,
            date_str: row.date.as_str(),
            slot_min: i32::from(row.slot.minutes()),
            value: row.value.as_str(),
            source: row.source.as_str(),
            note: row.note.as_str(),
        };

        let id: i64 = diesel::insert_into(timewise_results::table)
            .values(&new_row)
            .returning(timewise_results::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err)))?;
        Ok(id)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(timewise_results::table.filter(timewise_results::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err)))?;

        if deleted == 0 {
            return Err(ResultRepositoryError::missing(id));
        }
        Ok(())
    }

    async fn rows_for_date(
        &self,
        date: &DateStamp,
    ) -> Result<Vec<ResultRow>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TimewiseResultRow> = timewise_results::table
            .filter(timewise_results::date_str.eq(date.as_str()))
            .order((timewise_results::slot_min.asc(), timewise_results::id.asc()))
            .select(TimewiseResultRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err)))?;

        rows.into_iter().map(row_to_result).collect()
    }

    async fn rows_for_month(
        &self,
        month: MonthRef,
    ) -> Result<Vec<ResultRow>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let pattern = format!("{}%", month.date_prefix());
        let rows: Vec<TimewiseResultRow> = timewise_results::table
            .filter(timewise_results::date_str.like(pattern))
            .order((timewise_results::date_str.asc(), timewise_results::id.asc()))
            .select(TimewiseResultRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err)))?;

        rows.into_iter().map(row_to_result).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Error-mapping and row-conversion coverage.
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn stored_row(slot_min: i32) -> TimewiseResultRow {
        TimewiseResultRow {
            id: 9,
            game_id: 3,
            date_str: "2025-01-01".to_owned(),
            slot_min,
            value: "45".to_owned(),
            source: "manual".to_owned(),
            note: String::new(),
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
                .single()
                .expect("valid ts"),
        }
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, ResultRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn row_conversion_preserves_slot_and_value() {
        let row = row_to_result(stored_row(540)).expect("valid row");
        assert_eq!(row.slot.minutes(), 540);
        assert_eq!(row.value.as_str(), "45");
    }

    #[rstest]
    #[case(-1)]
    #[case(1440)]
    fn out_of_range_stored_slots_are_reported(#[case] slot_min: i32) {
        let err = row_to_result(stored_row(slot_min)).expect_err("bad slot");
        assert!(matches!(err, ResultRepositoryError::Query { .. }));
    }
}
