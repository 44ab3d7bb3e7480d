//! PostgreSQL-backed `GameRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::game::{Game, GameCode, GameDraft, GamePatch, GameUpsertItem};
use crate::domain::ports::{GameRepository, GameRepositoryError};

use super::error_map::{classify, DbFailure};
use super::models::{GameRow, NewGameRow};
use super::pool::{DbPool, PoolError};
use super::schema::games;

/// Diesel-backed implementation of the `GameRepository` port.
#[derive(Clone)]
pub struct DieselGameRepository {
    pool: DbPool,
}

impl DieselGameRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GameRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            GameRepositoryError::connection(message)
        }
    }
}

/// Map a classified failure for operations keyed by a game code.
fn map_db_failure(failure: DbFailure, code: &GameCode) -> GameRepositoryError {
    match failure {
        DbFailure::UniqueViolation => {
            GameRepositoryError::duplicate_code(code.as_str().to_owned())
        }
        DbFailure::ForeignKeyViolation => {
            GameRepositoryError::referenced(code.as_str().to_owned())
        }
        DbFailure::ConnectionLost(message) => GameRepositoryError::connection(message),
        DbFailure::NotFound => GameRepositoryError::missing(code.as_str().to_owned()),
        DbFailure::Other(message) => GameRepositoryError::query(message),
    }
}

fn row_to_game(row: GameRow) -> Result<Game, GameRepositoryError> {
    let code = GameCode::new(&row.code)
        .map_err(|err| GameRepositoryError::query(format!("stored code rejected: {err}")))?;
    Ok(Game {
        id: row.id,
        name: row.name,
        code,
        default_time: row.default_time,
        order_index: row.order_index,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl GameRepository for DieselGameRepository {
    async fn list(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GameRow> = games::table
            .order((games::order_index.asc(), games::name.asc()))
            .select(GameRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                DbFailure::ConnectionLost(message) => GameRepositoryError::connection(message),
                other => GameRepositoryError::query(format!("{other:?}")),
            })?;

        rows.into_iter().map(row_to_game).collect()
    }

    async fn find_by_code(&self, code: &GameCode) -> Result<Option<Game>, GameRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<GameRow> = games::table
            .filter(games::code.eq(code.as_str()))
            .select(GameRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_db_failure(classify(err), code))?;

        row.map(row_to_game).transpose()
    }

    async fn create(&self, draft: &GameDraft) -> Result<Game, GameRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewGameRow {
            name: draft.name.as_str(),
            code: draft.code.as_str(),
            default_time: draft.default_time.as_str(),
            order_index: draft.order_index,
        };

        let row: GameRow = diesel::insert_into(games::table)
            .values(&new_row)
            .returning(GameRow::as_select())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err), &draft.code))?;

        row_to_game(row)
    }

    async fn update_by_code(
        &self,
        code: &GameCode,
        patch: &GamePatch,
    ) -> Result<Game, GameRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let current: GameRow = games::table
            .filter(games::code.eq(code.as_str()))
            .select(GameRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_db_failure(classify(err), code))?
            .ok_or_else(|| GameRepositoryError::missing(code.as_str().to_owned()))?;

        let target_code = patch.new_code.as_ref().unwrap_or(code);
        if target_code != code {
            let taken: i64 = games::table
                .filter(games::code.eq(target_code.as_str()))
                .count()
                .get_result(&mut conn)
                .await
                .map_err(|err| map_db_failure(classify(err), target_code))?;
            if taken > 0 {
                return Err(GameRepositoryError::duplicate_code(
                    target_code.as_str().to_owned(),
                ));
            }
        }

        let name = patch
            .name
            .as_ref()
            .map(|n| n.as_str().to_owned())
            .unwrap_or(current.name);
        let default_time = patch
            .default_time
            .clone()
            .unwrap_or(current.default_time);
        let order_index = patch.order_index.unwrap_or(current.order_index);

        let row: GameRow = diesel::update(games::table.filter(games::code.eq(code.as_str())))
            .set((
                games::name.eq(name),
                games::code.eq(target_code.as_str()),
                games::default_time.eq(default_time),
                games::order_index.eq(order_index),
                games::updated_at.eq(diesel::dsl::now),
            ))
            .returning(GameRow::as_select())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err), target_code))?;

        row_to_game(row)
    }

    async fn delete_by_code(&self, code: &GameCode) -> Result<(), GameRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(games::table.filter(games::code.eq(code.as_str())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err), code))?;

        if deleted == 0 {
            return Err(GameRepositoryError::missing(code.as_str().to_owned()));
        }
        Ok(())
    }

    async fn bulk_upsert(&self, items: &[GameUpsertItem]) -> Result<(), GameRepositoryError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                for item in items {
                    let new_row = NewGameRow {
                        name: item.name.as_str(),
                        code: item.code.as_str(),
                        default_time: item.default_time.as_str(),
                        order_index: item.order_index,
                    };
                    diesel::insert_into(games::table)
                        .values(&new_row)
                        .on_conflict(games::code)
                        .do_update()
                        .set((
                            games::name.eq(excluded(games::name)),
                            games::default_time.eq(excluded(games::default_time)),
                            games::order_index.eq(excluded(games::order_index)),
                            games::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err: diesel::result::Error| match classify(err) {
            DbFailure::ConnectionLost(message) => GameRepositoryError::connection(message),
            other => GameRepositoryError::query(format!("bulk upsert rolled back: {other:?}")),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Error-mapping coverage; live queries are exercised against a running
    //! database, not in the unit suite.
    use super::*;
    use rstest::rstest;

    fn code(raw: &str) -> GameCode {
        GameCode::new(raw).expect("valid code")
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, GameRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violations_map_to_duplicate_code() {
        let err = map_db_failure(DbFailure::UniqueViolation, &code("GALI"));
        assert_eq!(
            err,
            GameRepositoryError::DuplicateCode {
                code: "GALI".to_owned()
            }
        );
    }

    #[rstest]
    fn foreign_key_violations_map_to_referenced() {
        let err = map_db_failure(DbFailure::ForeignKeyViolation, &code("GALI"));
        assert_eq!(
            err,
            GameRepositoryError::Referenced {
                code: "GALI".to_owned()
            }
        );
    }

    #[rstest]
    fn lost_connections_map_to_connection_errors() {
        let err = map_db_failure(
            DbFailure::ConnectionLost("server closed".to_owned()),
            &code("GALI"),
        );
        assert!(matches!(err, GameRepositoryError::Connection { .. }));
    }
}
