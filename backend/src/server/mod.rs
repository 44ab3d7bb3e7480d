//! Server construction and route wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::domain::{AuthService, ResultsService};
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::auth::{current_user, login, logout};
use backend::inbound::http::games::{
    bulk_upsert_games, create_game, delete_game, get_game, list_games, update_game,
};
use backend::inbound::http::health::{health, live, ready, HealthState};
use backend::inbound::http::results::{
    append_timewise, delete_timewise, get_snapshot, list_monthly, list_timewise,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::register;
use backend::outbound::persistence::{
    DbPool, DieselDiagnostics, DieselGameRepository, DieselResultRepository,
    DieselUserRepository,
};
use backend::security::TokenCodec;
use backend::Trace;

/// Wire repositories and services over the pool into handler state.
pub fn build_http_state(pool: &DbPool, config: &AppConfig) -> HttpState {
    let games = Arc::new(DieselGameRepository::new(pool.clone()));
    let results = Arc::new(DieselResultRepository::new(pool.clone()));
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let diagnostics = Arc::new(DieselDiagnostics::new(pool.clone()));

    let tokens = TokenCodec::new(&config.jwt_secret, config.token_ttl);
    HttpState::new(
        games.clone(),
        ResultsService::new(games, results),
        AuthService::new(users, tokens),
        diagnostics,
    )
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // Register the literal /games/bulk route ahead of the /games/{code}
    // parameter routes.
    let api = web::scope("/api/v1")
        .service(bulk_upsert_games)
        .service(list_games)
        .service(get_game)
        .service(create_game)
        .service(update_game)
        .service(delete_game)
        .service(list_timewise)
        .service(get_snapshot)
        .service(list_monthly)
        .service(append_timewise)
        .service(delete_timewise)
        .service(register)
        .service(login)
        .service(current_user)
        .service(logout);

    // Body/query decode failures use the same envelope as domain errors.
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        backend::domain::Error::invalid_input(err.to_string()).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        backend::domain::Error::invalid_input(err.to_string()).into()
    });

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config)
        .app_data(query_config)
        .wrap(Trace)
        .service(api)
        .service(health)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server and flip the readiness probe once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    bind_addr: std::net::SocketAddr,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
