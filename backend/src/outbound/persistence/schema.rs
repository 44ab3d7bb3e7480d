//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Named recurring draws.
    games (id) {
        id -> Int4,
        name -> Varchar,
        /// Unique, upper-cased stable identifier.
        code -> Varchar,
        default_time -> Varchar,
        order_index -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only declaration history; no uniqueness on
    /// `(game_id, date_str, slot_min)` and the largest id wins at read time.
    timewise_results (id) {
        id -> Int8,
        game_id -> Int4,
        date_str -> Varchar,
        slot_min -> Int4,
        value -> Varchar,
        source -> Varchar,
        note -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single value per `(game_id, date_str, slot_min)`; written by the
    /// legacy import path only.
    results (id) {
        id -> Int8,
        game_id -> Int4,
        date_str -> Varchar,
        slot_min -> Int4,
        value -> Varchar,
        source -> Varchar,
        note -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Admin-panel accounts.
    users (id) {
        id -> Int4,
        name -> Varchar,
        /// Unique, lower-cased login identifier.
        email -> Varchar,
        role -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Short-lived codes; only the cleanup binary touches these.
    otp_tokens (id) {
        id -> Int4,
        email -> Varchar,
        otp_hash -> Varchar,
        expires_at -> Timestamptz,
        attempts -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(timewise_results -> games (game_id));
diesel::joinable!(results -> games (game_id));

diesel::allow_tables_to_appear_in_same_query!(games, timewise_results, results);
