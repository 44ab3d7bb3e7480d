//! Domain types, ports, and services.
//!
//! Purpose: define strongly typed entities shared by the API and persistence
//! layers, the ports adapters implement, and the services that derive views
//! from raw history rows. Types are immutable; invariants live in validated
//! constructors.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod game;
pub mod ports;
pub mod result;
pub mod results_service;
pub mod timeslot;
pub mod user;

pub use self::auth::{LoginCredentials, Registration};
pub use self::auth_service::{AuthService, LoginOutcome};
pub use self::error::{Error, ErrorCode};
pub use self::game::{Game, GameCode, GameDraft, GameName, GamePatch, GameUpsertItem};
pub use self::result::{
    AppendedResult, DateStamp, MonthRef, NewResult, ResultRow, ResultValue,
};
pub use self::results_service::{
    MonthlyRow, MonthlyTable, ResultsService, SnapshotView, TimewiseDay, TimewiseRow,
};
pub use self::timeslot::TimeSlot;
pub use self::user::{EmailAddress, NewUser, Role, User};
