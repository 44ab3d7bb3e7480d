//! Authentication use-cases: login, token verification, registration.

use std::sync::Arc;

use tracing::warn;

use crate::security::{Claims, CredentialHasher, TokenCodec};

use super::auth::{LoginCredentials, Registration};
use super::error::Error;
use super::ports::UserRepository;
use super::user::{NewUser, User};

/// Message returned for every credential failure. Whether the email or the
/// password was wrong must be indistinguishable to the caller.
const BAD_CREDENTIALS: &str = "Invalid credentials";

/// A successful login: the signed token plus the user it identifies.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Credential verification, token issuance, and registration.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenCodec) -> Self {
        Self {
            users,
            hasher: CredentialHasher::new(),
            tokens,
        }
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some(user) = self.users.find_by_email(credentials.email()).await? else {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };
        if !self
            .hasher
            .verify(credentials.password(), &user.password_hash)
        {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }

        let token = self.tokens.issue(&user).map_err(|err| {
            warn!(error = %err, "token issuance failed");
            Error::internal("Login failed")
        })?;
        Ok(LoginOutcome { token, user })
    }

    /// Verify a bearer token and yield its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        self.tokens
            .verify(token)
            .map_err(|err| Error::unauthorized(err.to_string()))
    }

    /// Hash the password and create the user row.
    pub async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let password_hash = self.hasher.hash(registration.password()).map_err(|err| {
            warn!(error = %err, "password hashing failed");
            Error::internal("Registration failed")
        })?;

        let user = self
            .users
            .insert(&NewUser {
                name: registration.name().to_owned(),
                email: registration.email().clone(),
                role: registration.role(),
                password_hash,
            })
            .await?;
        Ok(user)
    }

    /// Load the user a verified token refers to.
    pub async fn current_user(&self, claims: &Claims) -> Result<User, Error> {
        self.users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepositoryError;
    use crate::domain::user::{EmailAddress, Role};
    use crate::domain::ErrorCode;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubUserRepository {
        rows: Mutex<Vec<User>>,
    }

    impl StubUserRepository {
        fn with_user(user: User) -> Self {
            Self {
                rows: Mutex::new(vec![user]),
            }
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
            let mut rows = self.rows.lock().expect("rows lock");
            if rows.iter().any(|u| u.email == user.email) {
                return Err(UserRepositoryError::duplicate_email(
                    user.email.as_str().to_owned(),
                ));
            }
            let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid ts");
            let id = i32::try_from(rows.len()).expect("small table") + 1;
            let created = User {
                id,
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
                password_hash: user.password_hash.clone(),
                created_at: at,
                updated_at: at,
            };
            rows.push(created.clone());
            Ok(created)
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<User>, UserRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("rows lock")
                .iter()
                .find(|u| &u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("rows lock")
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::days(7))
    }

    fn stored_user(password: &str) -> User {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid ts");
        User {
            id: 1,
            name: "Ada".to_owned(),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            role: Role::Admin,
            password_hash: CredentialHasher::new().hash(password).expect("hash"),
            created_at: at,
            updated_at: at,
        }
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid shape")
    }

    #[tokio::test]
    async fn login_succeeds_and_token_verifies_back_to_claims() {
        let service = AuthService::new(
            Arc::new(StubUserRepository::with_user(stored_user("pw"))),
            codec(),
        );

        let outcome = service
            .login(&credentials("Ada@Example.com", "pw"))
            .await
            .expect("login succeeds");
        let claims = service.verify_token(&outcome.token).expect("token verifies");
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.role, Role::Admin);
    }

    #[rstest]
    #[case("ada@example.com", "wrong")]
    #[case("nobody@example.com", "pw")]
    #[tokio::test]
    async fn login_failures_are_indistinguishable(
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let service = AuthService::new(
            Arc::new(StubUserRepository::with_user(stored_user("pw"))),
            codec(),
        );

        let err = service
            .login(&credentials(email, password))
            .await
            .expect_err("login fails");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn register_hashes_the_password_before_storage() {
        let repo = Arc::new(StubUserRepository::default());
        let service = AuthService::new(repo.clone(), codec());
        let registration =
            Registration::try_from_parts("Ada", "ada@example.com", "pw", Some("admin"))
                .expect("valid registration");

        let user = service.register(&registration).await.expect("registered");
        assert_ne!(user.password_hash, "pw");
        assert!(CredentialHasher::new().verify("pw", &user.password_hash));
    }

    #[tokio::test]
    async fn register_surfaces_duplicate_email_as_conflict() {
        let service = AuthService::new(
            Arc::new(StubUserRepository::with_user(stored_user("pw"))),
            codec(),
        );
        let registration =
            Registration::try_from_parts("Ada Again", "ada@example.com", "pw2", None)
                .expect("valid registration");

        let err = service
            .register(&registration)
            .await
            .expect_err("duplicate email");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn current_user_maps_missing_rows_to_not_found() {
        let service = AuthService::new(Arc::new(StubUserRepository::default()), codec());
        let claims = Claims {
            sub: 99,
            email: "gone@example.com".to_owned(),
            role: Role::Viewer,
            iat: 0,
            exp: i64::MAX,
        };

        let err = service
            .current_user(&claims)
            .await
            .expect_err("user vanished");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn verify_token_rejects_tampered_tokens() {
        let service = AuthService::new(Arc::new(StubUserRepository::default()), codec());
        let err = service
            .verify_token("eyJhbGciOiJIUzI1NiJ9.e30.bad")
            .expect_err("bad token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
