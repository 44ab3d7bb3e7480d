//! Housekeeping binary: delete expired OTP tokens.
//!
//! Run out-of-band (cron or manual); a missing connection string is fatal,
//! anything else is reported and exits non-zero.

use std::process::ExitCode;

use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use backend::domain::ports::OtpStore;
use backend::outbound::persistence::{DbPool, DieselOtpStore, PoolConfig};

async fn run() -> Result<u64, String> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL is not set".to_owned())?;

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| err.to_string())?;

    DieselOtpStore::new(pool)
        .delete_expired(Utc::now())
        .await
        .map_err(|err| err.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();

    match run().await {
        Ok(deleted) => {
            info!(deleted, "expired OTP rows removed");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!(%message, "OTP cleanup failed");
            ExitCode::FAILURE
        }
    }
}
