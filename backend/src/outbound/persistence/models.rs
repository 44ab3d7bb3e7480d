//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{games, otp_tokens, results, timewise_results, users};

/// Row struct for reading from the games table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GameRow {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub default_time: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new game records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = games)]
pub(crate) struct NewGameRow<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub default_time: &'a str,
    pub order_index: i32,
}

/// Row struct for reading from the timewise history table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = timewise_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TimewiseResultRow {
    pub id: i64,
    pub game_id: i32,
    pub date_str: String,
    pub slot_min: i32,
    pub value: String,
    pub source: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending one history row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = timewise_results)]
pub(crate) struct NewTimewiseResultRow<'a> {
    pub game_id: i32,
    pub date_str: &'a str,
    pub slot_min: i32,
    pub value: &'a str,
    pub source: &'a str,
    pub note: &'a str,
}

/// Insertable struct for the single-value results table (legacy import).
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = results)]
pub(crate) struct NewLegacyResultRow<'a> {
    pub game_id: i32,
    pub date_str: &'a str,
    pub slot_min: i32,
    pub value: &'a str,
    pub source: &'a str,
    pub note: &'a str,
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
}

/// Insertable struct for importing legacy OTP tokens.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = otp_tokens)]
pub(crate) struct NewOtpTokenRow<'a> {
    pub email: &'a str,
    pub otp_hash: &'a str,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
}
