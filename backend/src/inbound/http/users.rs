//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users/register  (admin)
//! ```
//!
//! Registration is admin-gated; the first admin account is provisioned by the
//! legacy import tool or directly in the store.

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::domain::user::UserValidationError;
use crate::domain::{Error, Registration};

use super::envelope::MessageEnvelope;
use super::error::ApiResult;
use super::identity::Identity;
use super::state::HttpState;

/// Registration request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `admin` or `viewer`; defaults to `viewer`.
    pub role: Option<String>,
}

fn map_validation_error(err: UserValidationError) -> Error {
    match err {
        UserValidationError::UnknownRole => Error::invalid_input(err.to_string()),
        _ => Error::invalid_input("Missing fields"),
    }
}

/// Create a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterBody,
    responses(
        (status = 200, description = "User created", body = MessageEnvelope),
        (status = 400, description = "Missing fields or unknown role"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already registered")
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    identity: Identity,
    body: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    identity.require_admin()?;

    let body = body.into_inner();
    let registration = Registration::try_from_parts(
        body.name.as_deref().unwrap_or_default(),
        body.email.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
        body.role.as_deref(),
    )
    .map_err(map_validation_error)?;

    state.auth.register(&registration).await?;
    Ok(HttpResponse::Ok().json(MessageEnvelope::new("User created")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepository;
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
        users: Arc<InMemoryUsers>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = state_with(
            Arc::new(InMemoryGames::default()),
            Arc::new(InMemoryResults::default()),
            users,
        );
        App::new()
            .app_data(state)
            .service(web::scope("/api/v1").service(register))
    }

    async fn body_json(res: actix_web::dev::ServiceResponse) -> Value {
        let body = actix_test::read_body(res).await;
        serde_json::from_slice(&body).expect("json body")
    }

    fn register_req(body: Value, token: String) -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri("/api/v1/users/register")
            .insert_header(("Authorization", token))
            .set_json(body)
            .to_request()
    }

    #[actix_web::test]
    async fn registering_stores_a_hashed_viewer_by_default() {
        let users = Arc::new(InMemoryUsers::default());
        let app = actix_test::init_service(test_app(users.clone())).await;

        let res = actix_test::call_service(
            &app,
            register_req(
                json!({"name": "Ada", "email": "Ada@Example.com", "password": "pw"}),
                bearer_for(Role::Admin),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value = body_json(res).await;
        assert_eq!(value["message"], "User created");

        let stored = users
            .find_by_email(&crate::domain::EmailAddress::new("ada@example.com").expect("email"))
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(stored.role, Role::Viewer);
        assert_ne!(stored.password_hash, "pw");
    }

    #[actix_web::test]
    async fn registering_requires_an_admin_token() {
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res = actix_test::call_service(
            &app,
            register_req(
                json!({"name": "Ada", "email": "ada@example.com", "password": "pw"}),
                bearer_for(Role::Viewer),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case(json!({"email": "a@b.c", "password": "pw"}))]
    #[case(json!({"name": "Ada", "password": "pw"}))]
    #[case(json!({"name": "Ada", "email": "a@b.c"}))]
    #[actix_web::test]
    async fn registering_with_missing_fields_is_rejected(#[case] body: Value) {
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res =
            actix_test::call_service(&app, register_req(body, bearer_for(Role::Admin))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = body_json(res).await;
        assert_eq!(value["error"], "Missing fields");
    }

    #[actix_web::test]
    async fn registering_an_unknown_role_is_rejected() {
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res = actix_test::call_service(
            &app,
            register_req(
                json!({"name": "Ada", "email": "a@b.c", "password": "pw", "role": "root"}),
                bearer_for(Role::Admin),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn registering_a_taken_email_conflicts() {
        let users = Arc::new(InMemoryUsers::seeded("ada@example.com", "pw", Role::Viewer));
        let app = actix_test::init_service(test_app(users)).await;

        let res = actix_test::call_service(
            &app,
            register_req(
                json!({"name": "Ada Again", "email": "Ada@Example.com", "password": "pw2"}),
                bearer_for(Role::Admin),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
