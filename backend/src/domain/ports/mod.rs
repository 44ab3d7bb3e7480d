//! Domain ports: traits the adapters implement, plus their error enums.

mod diagnostics;
mod game_repository;
mod macros;
mod otp_store;
mod result_repository;
mod user_repository;

pub(crate) use macros::define_port_error;

pub use diagnostics::{Diagnostics, DiagnosticsError, StorageReport};
pub use game_repository::{GameRepository, GameRepositoryError};
pub use otp_store::{OtpStore, OtpStoreError};
pub use result_repository::{ResultRepository, ResultRepositoryError};
pub use user_repository::{UserRepository, UserRepositoryError};
