//! Port abstraction for OTP token housekeeping.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by OTP store adapters.
    pub enum OtpStoreError {
        /// Store connection could not be established or checked out.
        Connection { message: String } => "otp store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "otp store query failed: {message}",
    }
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Delete every token that expired at or before `now`, returning the
    /// number of rows removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, OtpStoreError>;
}
