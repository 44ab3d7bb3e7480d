//! Auth API handlers.
//!
//! ```text
//! POST /api/v1/auth/login   {"email":"…","password":"…"}
//! GET  /api/v1/auth/me      (bearer token)
//! POST /api/v1/auth/logout
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, User};

use super::envelope::{DataEnvelope, MessageEnvelope};
use super::error::ApiResult;
use super::identity::Identity;
use super::state::HttpState;

/// User fields exposed to clients; the hash never leaves the process.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    #[schema(example = "ops@example.com")]
    pub email: String,
    #[schema(example = "admin")]
    pub role: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.as_str().to_owned(),
            role: user.role.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct UserData {
    user: UserDto,
}

/// Login request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login success payload; the token rides at the top level beside the
/// envelope flag.
#[derive(Debug, Serialize)]
struct LoginResponse {
    ok: bool,
    token: String,
    data: UserData,
}

/// Verify credentials and issue a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Token issued"),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Unknown email or wrong password")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    body: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        body.email.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
    )
    .map_err(|_| Error::invalid_input("Missing email or password"))?;

    let outcome = state.auth.login(&credentials).await?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        ok: true,
        token: outcome.token,
        data: UserData {
            user: UserDto::from(outcome.user),
        },
    }))
}

/// Current user resolved from the bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The authenticated user"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Token subject no longer exists")
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<HttpResponse> {
    let user = state.auth.current_user(&identity.claims).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(UserData {
        user: UserDto::from(user),
    })))
}

/// Stateless acknowledgment; clients discard the token themselves.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Acknowledged", body = MessageEnvelope)),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(MessageEnvelope::new("Logged out"))
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
        App::new().app_data(state).service(
            web::scope("/api/v1")
                .service(login)
                .service(current_user)
                .service(logout),
        )
    }

    async fn body_json(res: actix_web::dev::ServiceResponse) -> Value {
        let body = actix_test::read_body(res).await;
        serde_json::from_slice(&body).expect("json body")
    }

    #[actix_web::test]
    async fn login_issues_a_token_that_unlocks_me() {
        let users = Arc::new(InMemoryUsers::seeded("ada@example.com", "pw", Role::Admin));
        let app = actix_test::init_service(test_app(users)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({"email": "Ada@Example.com", "password": "pw"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value = body_json(res).await;
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["user"]["email"], "ada@example.com");
        let token = value["token"].as_str().expect("token").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/auth/me")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value = body_json(res).await;
        assert_eq!(value["data"]["user"]["role"], "admin");
    }

    #[rstest]
    #[case(json!({"email": "ada@example.com", "password": "wrong"}))]
    #[case(json!({"email": "nobody@example.com", "password": "pw"}))]
    #[actix_web::test]
    async fn login_failures_share_one_message(#[case] body: Value) {
        let users = Arc::new(InMemoryUsers::seeded("ada@example.com", "pw", Role::Admin));
        let app = actix_test::init_service(test_app(users)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let value = body_json(res).await;
        assert_eq!(value["error"], "Invalid credentials");
    }

    #[rstest]
    #[case(json!({"password": "pw"}))]
    #[case(json!({"email": "ada@example.com"}))]
    #[actix_web::test]
    async fn login_requires_both_fields(#[case] body: Value) {
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = body_json(res).await;
        assert_eq!(value["error"], "Missing email or password");
    }

    #[actix_web::test]
    async fn me_rejects_missing_and_garbage_tokens() {
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/auth/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/auth/me")
                .insert_header(("Authorization", "Bearer garbage"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_reports_not_found_when_the_subject_vanished() {
        // Valid token minted for user id 1, but the store is empty.
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/auth/me")
                .insert_header(("Authorization", bearer_for(Role::Viewer)))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn logout_acknowledges_statelessly() {
        let app = actix_test::init_service(test_app(Arc::new(InMemoryUsers::default()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/logout")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value = body_json(res).await;
        assert_eq!(value["message"], "Logged out");
    }
}
