//! Health endpoints.
//!
//! `/health` proves end-to-end storage connectivity and reports the selected
//! database plus table list; `/health/live` and `/health/ready` are cheap
//! probes for orchestration and load balancers.

use actix_web::{get, http::header, web, HttpResponse};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::ApiResult;
use super::state::HttpState;

/// Shared probe state: readiness flips on after startup, liveness flips off
/// when the process starts draining.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthReport {
    ok: bool,
    connected_database: String,
    tables: Vec<String>,
}

/// Deep storage probe: checks out a connection and reports what it can see.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Connected; reports database and tables"),
        (status = 503, description = "No connection could be checked out"),
        (status = 500, description = "Probe query failed")
    )
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let report = state.diagnostics.storage_report().await?;
    Ok(HttpResponse::Ok().json(HealthReport {
        ok: true,
        connected_database: report.database,
        tables: report.tables,
    }))
}

/// Readiness probe: 200 once dependencies are initialized.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready for traffic"),
        (status = 503, description = "Still starting up")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe: 200 until the process starts draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_support::{
        state_with, InMemoryGames, InMemoryResults, InMemoryUsers,
    };
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use serde_json::Value;
    use std::sync::Arc;

    #[actix_web::test]
    async fn deep_probe_reports_database_and_tables() {
        let state = state_with(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
            Arc::new(InMemoryUsers::default()),
        );
        let app =
            actix_test::init_service(App::new().app_data(state).service(health)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["ok"], true);
        assert_eq!(value["connectedDatabase"], "drawboard_test");
        assert!(value["tables"]
            .as_array()
            .expect("tables array")
            .iter()
            .any(|t| t == "games"));
    }

    #[actix_web::test]
    async fn probes_track_health_state_transitions() {
        let health_state = actix_web::web::Data::new(HealthState::new());
        let app = actix_test::init_service(
            App::new()
                .app_data(health_state.clone())
                .service(ready)
                .service(live),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        health_state.mark_ready();
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        health_state.mark_unhealthy();
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
