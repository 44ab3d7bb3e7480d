//! Results API handlers.
//!
//! ```text
//! GET    /api/v1/results/timewise?dateStr=YYYY-MM-DD&games=GALI,DESAWER
//! GET    /api/v1/results/snapshot?dateStr=YYYY-MM-DD&time=HH:MM&games=…
//! GET    /api/v1/results/monthly?year=YYYY&month=M&games=…
//! POST   /api/v1/results/timewise             (admin)
//! DELETE /api/v1/results/timewise/{id}        (admin)
//! ```

use std::collections::BTreeMap;

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::result::{DateStamp, MonthRef, ResultValue};
use crate::domain::{Error, GameCode, TimeSlot};

use super::envelope::{DataEnvelope, MessageEnvelope};
use super::error::ApiResult;
use super::games::GameDto;
use super::identity::Identity;
use super::state::HttpState;

const BAD_TIME: &str = "Invalid time format (use HH:MM or HH:MM AM/PM)";

/// Split a `games=GALI,DESAWER` parameter into normalized codes.
fn parse_code_filter(raw: Option<&str>) -> Vec<GameCode> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|part| GameCode::new(part).ok())
        .collect()
}

fn parse_date(raw: Option<&str>) -> Result<DateStamp, Error> {
    let raw = raw.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(Error::invalid_input("dateStr required"));
    }
    DateStamp::new(raw).map_err(|err| Error::invalid_input(err.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimewiseQuery {
    date_str: Option<String>,
    games: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimewiseRowDto {
    slot_min: u16,
    values: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimewiseData {
    date_str: String,
    games: Vec<GameDto>,
    rows: Vec<TimewiseRowDto>,
}

/// Per-slot values for one day, grouped by slot.
#[utoipa::path(
    get,
    path = "/api/v1/results/timewise",
    params(
        ("dateStr" = String, Query, description = "Day to read, YYYY-MM-DD"),
        ("games" = Option<String>, Query, description = "Comma-separated code filter")
    ),
    responses(
        (status = 200, description = "Per-slot values plus the full game list"),
        (status = 400, description = "Missing or malformed dateStr")
    ),
    tags = ["results"],
    operation_id = "listTimewise"
)]
#[get("/results/timewise")]
pub async fn list_timewise(
    state: web::Data<HttpState>,
    query: web::Query<TimewiseQuery>,
) -> ApiResult<HttpResponse> {
    let date = parse_date(query.date_str.as_deref())?;
    let filter = parse_code_filter(query.games.as_deref());

    let day = state.results.timewise(&date, &filter).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(TimewiseData {
        date_str: day.date.as_str().to_owned(),
        games: day.games.into_iter().map(GameDto::from).collect(),
        rows: day
            .rows
            .into_iter()
            .map(|row| TimewiseRowDto {
                slot_min: row.slot.minutes(),
                values: row.values,
            })
            .collect(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    date_str: Option<String>,
    time: Option<String>,
    games: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotData {
    date_str: String,
    time: String,
    values: BTreeMap<String, String>,
}

/// Declared values as of a time of day.
#[utoipa::path(
    get,
    path = "/api/v1/results/snapshot",
    params(
        ("dateStr" = String, Query, description = "Day to read, YYYY-MM-DD"),
        ("time" = String, Query, description = "Cutoff, HH:MM or HH:MM AM/PM"),
        ("games" = Option<String>, Query, description = "Comma-separated code filter")
    ),
    responses(
        (status = 200, description = "Latest value per game at the cutoff"),
        (status = 400, description = "Missing dateStr or unparseable time")
    ),
    tags = ["results"],
    operation_id = "getSnapshot"
)]
#[get("/results/snapshot")]
pub async fn get_snapshot(
    state: web::Data<HttpState>,
    query: web::Query<SnapshotQuery>,
) -> ApiResult<HttpResponse> {
    let time_raw = query.time.as_deref().unwrap_or_default();
    if query.date_str.as_deref().unwrap_or_default().trim().is_empty()
        || time_raw.trim().is_empty()
    {
        return Err(Error::invalid_input("dateStr and time are required"));
    }
    let date = parse_date(query.date_str.as_deref())?;
    let slot = TimeSlot::parse(time_raw).map_err(|_| Error::invalid_input(BAD_TIME))?;
    let filter = parse_code_filter(query.games.as_deref());

    let view = state.results.snapshot(&date, slot, &filter).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(SnapshotData {
        date_str: view.date.as_str().to_owned(),
        time: view.slot.to_hhmm(),
        values: view.values,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    year: Option<i32>,
    month: Option<u32>,
    games: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyRowDto {
    date_str: String,
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct MonthlyData {
    year: i32,
    month: u32,
    games: Vec<String>,
    rows: Vec<MonthlyRowDto>,
}

/// Final value per game per day across a month.
#[utoipa::path(
    get,
    path = "/api/v1/results/monthly",
    params(
        ("year" = i32, Query, description = "Calendar year"),
        ("month" = u32, Query, description = "Month, 1-12"),
        ("games" = Option<String>, Query, description = "Comma-separated code filter")
    ),
    responses(
        (status = 200, description = "One record per date with results"),
        (status = 400, description = "Missing or out-of-range year/month")
    ),
    tags = ["results"],
    operation_id = "listMonthly"
)]
#[get("/results/monthly")]
pub async fn list_monthly(
    state: web::Data<HttpState>,
    query: web::Query<MonthlyQuery>,
) -> ApiResult<HttpResponse> {
    let (Some(year), Some(month)) = (query.year, query.month) else {
        return Err(Error::invalid_input("year and month required"));
    };
    let month_ref =
        MonthRef::new(year, month).map_err(|_| Error::invalid_input("year and month required"))?;
    let filter = parse_code_filter(query.games.as_deref());

    let table = state.results.monthly(month_ref, &filter).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(MonthlyData {
        year: table.month.year(),
        month: table.month.month(),
        games: table.games,
        rows: table
            .rows
            .into_iter()
            .map(|row| MonthlyRowDto {
                date_str: row.date.as_str().to_owned(),
                values: row.values,
            })
            .collect(),
    })))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendResultBody {
    pub game_code: Option<String>,
    pub date_str: Option<String>,
    pub time: Option<String>,
    pub value: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendedDto {
    #[serde(rename = "_id")]
    id: i64,
    game_code: String,
    date_str: String,
    slot_min: u16,
    value: String,
}

/// Append one history row; prior declarations for the slot are kept.
#[utoipa::path(
    post,
    path = "/api/v1/results/timewise",
    request_body = AppendResultBody,
    responses(
        (status = 201, description = "Row appended"),
        (status = 400, description = "Missing fields or unparseable time"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown game code")
    ),
    tags = ["results"],
    operation_id = "appendTimewise"
)]
#[post("/results/timewise")]
pub async fn append_timewise(
    state: web::Data<HttpState>,
    identity: Identity,
    body: web::Json<AppendResultBody>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let body = body.into_inner();
    let code_raw = body.game_code.as_deref().unwrap_or_default();
    let date_raw = body.date_str.as_deref().unwrap_or_default();
    if code_raw.trim().is_empty() || date_raw.trim().is_empty() {
        return Err(Error::invalid_input("Missing gameCode or dateStr"));
    }

    let code = GameCode::new(code_raw)
        .map_err(|_| Error::invalid_input("Missing gameCode or dateStr"))?;
    let date = DateStamp::new(date_raw).map_err(|err| Error::invalid_input(err.to_string()))?;
    let slot = TimeSlot::parse(body.time.as_deref().unwrap_or_default())
        .map_err(|_| Error::invalid_input(BAD_TIME))?;
    let value = ResultValue::new(body.value.as_deref().unwrap_or_default())
        .map_err(|err| Error::invalid_input(err.to_string()))?;

    let appended = state
        .results
        .append(&code, date, slot, value, body.note)
        .await?;
    Ok(HttpResponse::Created().json(DataEnvelope::new(AppendedDto {
        id: appended.id,
        game_code: appended.game_code.as_str().to_owned(),
        date_str: appended.date.as_str().to_owned(),
        slot_min: appended.slot.minutes(),
        value: appended.value.as_str().to_owned(),
    })))
}

/// Delete one historical row by id.
#[utoipa::path(
    delete,
    path = "/api/v1/results/timewise/{id}",
    responses(
        (status = 200, description = "Row deleted", body = MessageEnvelope),
        (status = 400, description = "Non-positive id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown row id")
    ),
    tags = ["results"],
    operation_id = "deleteTimewise"
)]
#[delete("/results/timewise/{id}")]
pub async fn delete_timewise(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let id: i64 = path.into_inner().parse().unwrap_or(0);
    if id <= 0 {
        return Err(Error::invalid_input("Invalid ID"));
    }
    state.results.delete(id).await?;
    Ok(HttpResponse::Ok().json(MessageEnvelope::new("Deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_support::{
        bearer_for, state_with, InMemoryGames, InMemoryResults, InMemoryUsers,
    };
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn test_app(
        games: Arc<InMemoryGames>,
        results: Arc<InMemoryResults>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = state_with(games, results, Arc::new(InMemoryUsers::default()));
        App::new().app_data(state).service(
            web::scope("/api/v1")
                .service(list_timewise)
                .service(get_snapshot)
                .service(list_monthly)
                .service(append_timewise)
                .service(delete_timewise),
        )
    }

    async fn body_json(res: actix_web::dev::ServiceResponse) -> Value {
        let body = actix_test::read_body(res).await;
        serde_json::from_slice(&body).expect("json body")
    }

    fn append_req(body: Value) -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri("/api/v1/results/timewise")
            .insert_header(("Authorization", bearer_for(Role::Admin)))
            .set_json(body)
            .to_request()
    }

    #[actix_web::test]
    async fn timewise_requires_a_date() {
        let app = actix_test::init_service(test_app(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
        ))
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results/timewise")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = body_json(res).await;
        assert_eq!(value["error"], "dateStr required");
    }

    #[actix_web::test]
    async fn append_then_snapshot_follows_append_order() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let results = Arc::new(InMemoryResults::default());
        let app = actix_test::init_service(test_app(games, results)).await;

        let first = actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-01", "time": "09:00", "value": "45"})),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let first = body_json(first).await;
        assert_eq!(first["data"]["slotMin"], 540);

        let second = actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "gali", "dateStr": "2025-01-01", "time": "9:00 AM", "value": "46"})),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CREATED);
        let second = body_json(second).await;
        assert_ne!(first["data"]["_id"], second["data"]["_id"]);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results/snapshot?dateStr=2025-01-01&time=10:00")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value = body_json(res).await;
        assert_eq!(value["data"]["time"], "10:00");
        assert_eq!(value["data"]["values"]["GALI"], "46");
    }

    #[actix_web::test]
    async fn snapshot_fills_the_sentinel_before_any_declaration() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let app =
            actix_test::init_service(test_app(games, Arc::new(InMemoryResults::default()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results/snapshot?dateStr=2025-01-01&time=08:00")
                .to_request(),
        )
        .await;
        let value = body_json(res).await;
        assert_eq!(value["data"]["values"]["GALI"], "XX");
    }

    #[rstest]
    #[case("/api/v1/results/snapshot?dateStr=2025-01-01")]
    #[case("/api/v1/results/snapshot?time=10:00")]
    #[actix_web::test]
    async fn snapshot_requires_date_and_time(#[case] uri: &str) {
        let app = actix_test::init_service(test_app(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
        ))
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = body_json(res).await;
        assert_eq!(value["error"], "dateStr and time are required");
    }

    #[actix_web::test]
    async fn snapshot_rejects_unparseable_times() {
        let app = actix_test::init_service(test_app(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
        ))
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results/snapshot?dateStr=2025-01-01&time=25:99")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = body_json(res).await;
        assert_eq!(value["error"], BAD_TIME);
    }

    #[actix_web::test]
    async fn append_rejects_unknown_games_with_not_found() {
        let app = actix_test::init_service(test_app(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
        ))
        .await;

        let res = actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "NOPE", "dateStr": "2025-01-01", "time": "09:00", "value": "45"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let value = body_json(res).await;
        assert_eq!(value["error"], "Game not found");
    }

    #[actix_web::test]
    async fn append_defaults_a_blank_value_to_the_sentinel() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let app =
            actix_test::init_service(test_app(games, Arc::new(InMemoryResults::default()))).await;

        let res = actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-01", "time": "09:00"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let value = body_json(res).await;
        assert_eq!(value["data"]["value"], "XX");
    }

    #[actix_web::test]
    async fn append_requires_admin() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let app =
            actix_test::init_service(test_app(games, Arc::new(InMemoryResults::default()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/results/timewise")
                .insert_header(("Authorization", bearer_for(Role::Viewer)))
                .set_json(
                    json!({"gameCode": "GALI", "dateStr": "2025-01-01", "time": "09:00"}),
                )
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn timewise_returns_one_row_per_slot_with_the_latest_value() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let app =
            actix_test::init_service(test_app(games, Arc::new(InMemoryResults::default()))).await;

        actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-01", "time": "09:00", "value": "45"})),
        )
        .await;
        actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-01", "time": "09:00", "value": "46"})),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results/timewise?dateStr=2025-01-01")
                .to_request(),
        )
        .await;
        let value = body_json(res).await;
        let rows = value["data"]["rows"].as_array().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["slotMin"], 540);
        assert_eq!(rows[0]["values"]["GALI"], "46");
    }

    #[actix_web::test]
    async fn monthly_flattens_codes_into_each_row() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let app =
            actix_test::init_service(test_app(games, Arc::new(InMemoryResults::default()))).await;

        actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-03", "time": "09:00", "value": "45"})),
        )
        .await;
        actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-03", "time": "21:00", "value": "46"})),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results/monthly?year=2025&month=1")
                .to_request(),
        )
        .await;
        let value = body_json(res).await;
        let rows = value["data"]["rows"].as_array().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["dateStr"], "2025-01-03");
        assert_eq!(rows[0]["GALI"], "46", "final value of the day, flattened");
    }

    #[rstest]
    #[case("/api/v1/results/monthly?month=1")]
    #[case("/api/v1/results/monthly?year=2025")]
    #[case("/api/v1/results/monthly?year=2025&month=13")]
    #[actix_web::test]
    async fn monthly_validates_year_and_month(#[case] uri: &str) {
        let app = actix_test::init_service(test_app(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
        ))
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = body_json(res).await;
        assert_eq!(value["error"], "year and month required");
    }

    #[actix_web::test]
    async fn delete_round_trip_removes_exactly_one_row() {
        let games = Arc::new(InMemoryGames::seeded(&[("Gali", "GALI", 1)]));
        let app =
            actix_test::init_service(test_app(games, Arc::new(InMemoryResults::default()))).await;

        let created = actix_test::call_service(
            &app,
            append_req(json!({"gameCode": "GALI", "dateStr": "2025-01-01", "time": "09:00", "value": "45"})),
        )
        .await;
        let created = body_json(created).await;
        let id = created["data"]["_id"].as_i64().expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/results/timewise/{id}"))
                .insert_header(("Authorization", bearer_for(Role::Admin)))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/results/timewise/{id}"))
                .insert_header(("Authorization", bearer_for(Role::Admin)))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
