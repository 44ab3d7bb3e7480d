//! OpenAPI document aggregating the REST surface.

use utoipa::OpenApi;

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::games::list_games,
        crate::inbound::http::games::get_game,
        crate::inbound::http::games::create_game,
        crate::inbound::http::games::update_game,
        crate::inbound::http::games::delete_game,
        crate::inbound::http::games::bulk_upsert_games,
        crate::inbound::http::results::list_timewise,
        crate::inbound::http::results::get_snapshot,
        crate::inbound::http::results::list_monthly,
        crate::inbound::http::results::append_timewise,
        crate::inbound::http::results::delete_timewise,
        crate::inbound::http::users::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::logout,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::inbound::http::envelope::MessageEnvelope,
        crate::inbound::http::games::GameDto,
        crate::inbound::http::games::GameBody,
        crate::inbound::http::games::BulkGamesBody,
        crate::inbound::http::games::BulkGameItem,
        crate::inbound::http::results::AppendResultBody,
        crate::inbound::http::auth::UserDto,
        crate::inbound::http::auth::LoginBody,
        crate::inbound::http::users::RegisterBody,
    )),
    tags(
        (name = "games", description = "Draw catalogue"),
        (name = "results", description = "Declared values per day and slot"),
        (name = "users", description = "Account management"),
        (name = "auth", description = "Login and token verification"),
        (name = "health", description = "Probes and storage diagnostics"),
    )
)]
pub struct ApiDoc;
