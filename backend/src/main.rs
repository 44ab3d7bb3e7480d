//! Server entry-point: configuration, migrations, pool, and route wiring.

mod server;

use actix_web::web;
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};

use server::{build_http_state, create_server, AppConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn fatal(message: String) -> std::io::Error {
    std::io::Error::other(message)
}

/// Apply pending migrations over a short-lived synchronous connection.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|err| fatal(format!("database connection failed: {err}")))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| fatal(format!("migrations failed: {err}")))?;
        if !applied.is_empty() {
            info!(count = applied.len(), "applied pending migrations");
        }
        Ok(())
    })
    .await
    .map_err(|err| fatal(format!("migration task panicked: {err}")))?
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(|err| fatal(err.to_string()))?;

    run_migrations(config.database_url.clone()).await?;

    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.pool_size),
    )
    .await
    .map_err(|err| fatal(err.to_string()))?;

    let http_state = web::Data::new(build_http_state(&pool, &config));
    let health_state = web::Data::new(HealthState::new());

    info!(addr = %config.bind_addr, "starting server");
    let server = create_server(health_state.clone(), http_state, config.bind_addr)?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
