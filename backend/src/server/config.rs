//! Process configuration loaded from the environment.
//!
//! Credentials are strictly externally supplied; nothing in the binary
//! carries a default secret or connection string.

use std::env;
use std::net::SocketAddr;

use chrono::Duration;
use tracing::warn;

use backend::security::DEFAULT_TOKEN_TTL_SECS;

/// Fatal configuration problems; each one halts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("JWT_SECRET is not set")]
    MissingJwtSecret,
    #[error("BIND_ADDR is not a valid socket address: {value}")]
    BadBindAddr { value: String },
    #[error("{name} is not a valid number: {value}")]
    BadNumber { name: &'static str, value: String },
}

/// Everything the server process needs, resolved once at startup.
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub pool_size: u32,
}

fn parse_env_number<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::BadNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` is always required. `JWT_SECRET` is required in release
    /// builds; debug builds fall back to an ephemeral secret with a warning
    /// so local tokens stop working on restart.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ if cfg!(debug_assertions) => {
                warn!("JWT_SECRET not set, using an ephemeral secret (dev only)");
                uuid::Uuid::new_v4().as_bytes().to_vec()
            }
            _ => return Err(ConfigError::MissingJwtSecret),
        };

        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_owned());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|_| ConfigError::BadBindAddr { value: bind_raw })?;

        let ttl_secs: i64 = parse_env_number("JWT_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        let pool_size: u32 = parse_env_number("DB_POOL_SIZE", 10)?;

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            token_ttl: Duration::seconds(ttl_secs),
            pool_size,
        })
    }
}
