//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! Principles:
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; no business logic lives here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak out of this module.
//! - **Typed errors**: every driver failure is mapped to a port error, with
//!   constraint violations distinguished from transport faults.

mod diesel_diagnostics;
mod diesel_game_repository;
mod diesel_legacy_importer;
mod diesel_otp_store;
mod diesel_result_repository;
mod diesel_user_repository;
mod error_map;
mod models;
mod pool;
mod schema;

pub use diesel_diagnostics::DieselDiagnostics;
pub use diesel_game_repository::DieselGameRepository;
pub use diesel_legacy_importer::{
    DieselLegacyImporter, LegacyImportError, LegacyOtpToken, LegacyResult,
};
pub use diesel_otp_store::DieselOtpStore;
pub use diesel_result_repository::DieselResultRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
