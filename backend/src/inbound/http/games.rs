//! Games API handlers.
//!
//! ```text
//! GET    /api/v1/games
//! GET    /api/v1/games/{code}
//! POST   /api/v1/games            (admin)
//! PUT    /api/v1/games/{code}     (admin)
//! DELETE /api/v1/games/{code}     (admin)
//! POST   /api/v1/games/bulk       (admin)
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Game, GameCode, GameDraft, GamePatch, GameName, GameUpsertItem};

use super::envelope::{DataEnvelope, MessageEnvelope};
use super::error::ApiResult;
use super::identity::Identity;
use super::state::HttpState;

/// Game row as serialized to clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameDto {
    pub id: i32,
    pub name: String,
    #[schema(example = "GALI")]
    pub code: String,
    pub default_time: String,
    pub order_index: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Game> for GameDto {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            name: game.name,
            code: game.code.as_str().to_owned(),
            default_time: game.default_time,
            order_index: game.order_index,
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct GamesData {
    games: Vec<GameDto>,
}

#[derive(Debug, Serialize)]
struct GameData {
    game: GameDto,
}

/// Create/update request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameBody {
    pub name: Option<String>,
    pub code: Option<String>,
    /// Replacement code on update; `code` is accepted as an alias.
    pub new_code: Option<String>,
    pub default_time: Option<String>,
    pub order_index: Option<i32>,
}

/// Bulk upsert request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BulkGamesBody {
    pub items: Option<Vec<BulkGameItem>>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkGameItem {
    pub name: Option<String>,
    pub code: Option<String>,
    pub default_time: Option<String>,
    pub order_index: Option<i32>,
}

fn parse_code(raw: &str) -> Result<GameCode, Error> {
    GameCode::new(raw).map_err(|err| Error::invalid_input(err.to_string()))
}

/// List all games in display order.
#[utoipa::path(
    get,
    path = "/api/v1/games",
    responses(
        (status = 200, description = "Games in display order"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["games"],
    operation_id = "listGames"
)]
#[get("/games")]
pub async fn list_games(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let games = state.games.list().await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(GamesData {
        games: games.into_iter().map(GameDto::from).collect(),
    })))
}

/// Fetch one game by code.
#[utoipa::path(
    get,
    path = "/api/v1/games/{code}",
    responses(
        (status = 200, description = "The requested game"),
        (status = 404, description = "Unknown game code")
    ),
    tags = ["games"],
    operation_id = "getGame"
)]
#[get("/games/{code}")]
pub async fn get_game(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = parse_code(&path.into_inner())?;
    let game = state
        .games
        .find_by_code(&code)
        .await?
        .ok_or_else(|| Error::not_found("Game not found"))?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(GameData {
        game: GameDto::from(game),
    })))
}

/// Create a new game.
#[utoipa::path(
    post,
    path = "/api/v1/games",
    request_body = GameBody,
    responses(
        (status = 201, description = "Game created", body = MessageEnvelope),
        (status = 400, description = "Missing name or code"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Code already exists")
    ),
    tags = ["games"],
    operation_id = "createGame"
)]
#[post("/games")]
pub async fn create_game(
    state: web::Data<HttpState>,
    identity: Identity,
    body: web::Json<GameBody>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let body = body.into_inner();
    let draft = GameDraft::from_request(
        body.name.as_deref().unwrap_or(""),
        body.code.as_deref().unwrap_or(""),
        body.default_time.as_deref(),
        body.order_index,
    )
    .map_err(|_| Error::invalid_input("name and code are required"))?;

    state.games.create(&draft).await?;
    Ok(HttpResponse::Created().json(MessageEnvelope::new("Game added")))
}

/// Update a game; the body may rename its code.
#[utoipa::path(
    put,
    path = "/api/v1/games/{code}",
    request_body = GameBody,
    responses(
        (status = 200, description = "Game updated", body = MessageEnvelope),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown game code"),
        (status = 409, description = "Target code already exists")
    ),
    tags = ["games"],
    operation_id = "updateGame"
)]
#[put("/games/{code}")]
pub async fn update_game(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<GameBody>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let old_code = parse_code(&path.into_inner())?;
    let body = body.into_inner();

    let new_code = body
        .new_code
        .as_deref()
        .or(body.code.as_deref())
        .map(parse_code)
        .transpose()?;
    let name = body
        .name
        .as_deref()
        .map(|raw| GameName::new(raw).map_err(|err| Error::invalid_input(err.to_string())))
        .transpose()?;

    let patch = GamePatch {
        new_code,
        name,
        default_time: body.default_time,
        order_index: body.order_index,
    };

    state.games.update_by_code(&old_code, &patch).await?;
    Ok(HttpResponse::Ok().json(MessageEnvelope::new("Game updated")))
}

/// Delete a game by code.
#[utoipa::path(
    delete,
    path = "/api/v1/games/{code}",
    responses(
        (status = 200, description = "Game deleted", body = MessageEnvelope),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown game code"),
        (status = 409, description = "Recorded results still reference the game")
    ),
    tags = ["games"],
    operation_id = "deleteGame"
)]
#[delete("/games/{code}")]
pub async fn delete_game(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let code = parse_code(&path.into_inner())?;
    state.games.delete_by_code(&code).await?;
    Ok(HttpResponse::Ok().json(MessageEnvelope::new("Game deleted")))
}

/// Transactionally upsert a batch of games.
///
/// Items with a blank name or code are skipped; everything else commits or
/// rolls back as one unit.
#[utoipa::path(
    post,
    path = "/api/v1/games/bulk",
    request_body = BulkGamesBody,
    responses(
        (status = 200, description = "Batch applied", body = MessageEnvelope),
        (status = 400, description = "Empty batch"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tags = ["games"],
    operation_id = "bulkUpsertGames"
)]
#[post("/games/bulk")]
pub async fn bulk_upsert_games(
    state: web::Data<HttpState>,
    identity: Identity,
    body: web::Json<BulkGamesBody>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let items = body.into_inner().items.unwrap_or_default();
    if items.is_empty() {
        return Err(Error::invalid_input("No items"));
    }

    let kept: Vec<GameUpsertItem> = items
        .iter()
        .filter_map(|item| {
            GameUpsertItem::from_loose(
                item.name.as_deref().unwrap_or(""),
                item.code.as_deref().unwrap_or(""),
                item.default_time.as_deref(),
                item.order_index,
            )
        })
        .collect();

    state.games.bulk_upsert(&kept).await?;
    Ok(HttpResponse::Ok().json(MessageEnvelope::new("Bulk upsert complete")))
}
