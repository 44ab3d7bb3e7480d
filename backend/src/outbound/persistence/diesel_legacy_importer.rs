//! Write-side adapter for the one-off legacy import binary.
//!
//! Each upsert matches the shape of the legacy export: games and users are
//! idempotent on their natural keys, result values land in the single-value
//! `results` table keyed by `(game_id, date_str, slot_min)`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::game::GameUpsertItem;
use crate::domain::user::NewUser;

use super::error_map::classify;
use super::models::{NewGameRow, NewLegacyResultRow, NewOtpTokenRow, NewUserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{games, otp_tokens, results, users};

/// Errors raised while importing legacy records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LegacyImportError {
    #[error("import connection failed: {message}")]
    Connection { message: String },
    #[error("import statement failed: {message}")]
    Statement { message: String },
}

impl From<PoolError> for LegacyImportError {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection { message }
            }
        }
    }
}

fn map_diesel(error: diesel::result::Error) -> LegacyImportError {
    LegacyImportError::Statement {
        message: format!("{:?}", classify(error)),
    }
}

/// One imported result value destined for the single-value `results` table.
#[derive(Debug, Clone)]
pub struct LegacyResult {
    pub game_id: i32,
    pub date_str: String,
    pub slot_min: i32,
    pub value: String,
    pub source: String,
    pub note: String,
}

/// One imported OTP token.
#[derive(Debug, Clone)]
pub struct LegacyOtpToken {
    pub email: String,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
}

/// Diesel adapter the `import-legacy` binary drives.
#[derive(Clone)]
pub struct DieselLegacyImporter {
    pool: DbPool,
}

impl DieselLegacyImporter {
    /// Create a new importer with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upsert one game keyed by code, returning its id for result linking.
    pub async fn upsert_game(&self, item: &GameUpsertItem) -> Result<i32, LegacyImportError> {
        let mut conn = self.pool.get().await?;

        let new_row = NewGameRow {
            name: item.name.as_str(),
            code: item.code.as_str(),
            default_time: item.default_time.as_str(),
            order_index: item.order_index,
        };
        let id: i32 = diesel::insert_into(games::table)
            .values(&new_row)
            .on_conflict(games::code)
            .do_update()
            .set((
                games::name.eq(excluded(games::name)),
                games::default_time.eq(excluded(games::default_time)),
                games::order_index.eq(excluded(games::order_index)),
                games::updated_at.eq(diesel::dsl::now),
            ))
            .returning(games::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(id)
    }

    /// Upsert one user keyed by email; existing rows keep their password.
    pub async fn upsert_user(&self, user: &NewUser) -> Result<(), LegacyImportError> {
        let mut conn = self.pool.get().await?;

        let new_row = NewUserRow {
            name: user.name.as_str(),
            email: user.email.as_str(),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_str(),
        };
        diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::email)
            .do_update()
            .set((
                users::name.eq(excluded(users::name)),
                users::role.eq(excluded(users::role)),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(())
    }

    /// Upsert one result value keyed by `(game_id, date_str, slot_min)`.
    pub async fn upsert_result(&self, result: &LegacyResult) -> Result<(), LegacyImportError> {
        let mut conn = self.pool.get().await?;

        let new_row = NewLegacyResultRow {
            game_id: result.game_id,
            date_str: result.date_str.as_str(),
            slot_min: result.slot_min,
            value: result.value.as_str(),
            source: result.source.as_str(),
            note: result.note.as_str(),
        };
        diesel::insert_into(results::table)
            .values(&new_row)
            .on_conflict((results::game_id, results::date_str, results::slot_min))
            .do_update()
            .set((
                results::value.eq(excluded(results::value)),
                results::source.eq(excluded(results::source)),
                results::note.eq(excluded(results::note)),
                results::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(())
    }

    /// Insert one OTP token. Tokens have no natural key, so reruns may add
    /// duplicates; the cleanup binary prunes them once expired.
    pub async fn insert_otp(&self, token: &LegacyOtpToken) -> Result<(), LegacyImportError> {
        let mut conn = self.pool.get().await?;

        let new_row = NewOtpTokenRow {
            email: token.email.as_str(),
            otp_hash: token.otp_hash.as_str(),
            expires_at: token.expires_at,
            attempts: token.attempts,
        };
        diesel::insert_into(otp_tokens::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(())
    }
}
