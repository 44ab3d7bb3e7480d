//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{EmailAddress, NewUser, Role, User};

use super::error_map::{classify, DbFailure};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_db_failure(failure: DbFailure, email: &EmailAddress) -> UserRepositoryError {
    match failure {
        DbFailure::UniqueViolation => {
            UserRepositoryError::duplicate_email(email.as_str().to_owned())
        }
        DbFailure::ConnectionLost(message) => UserRepositoryError::connection(message),
        DbFailure::ForeignKeyViolation => {
            UserRepositoryError::query("user row violates a foreign key")
        }
        DbFailure::NotFound => UserRepositoryError::query("record not found"),
        DbFailure::Other(message) => UserRepositoryError::query(message),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email rejected: {err}")))?;
    // Unrecognized stored roles demote to viewer rather than breaking reads.
    let role = Role::parse(&row.role).unwrap_or_else(|_| {
        warn!(user_id = row.id, role = %row.role, "unrecognized stored role, treating as viewer");
        Role::Viewer
    });
    Ok(User {
        id: row.id,
        name: row.name,
        email,
        role,
        password_hash: row.password_hash,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            name: user.name.as_str(),
            email: user.email.as_str(),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_str(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_select())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_db_failure(classify(err), &user.email))?;

        row_to_user(row)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_db_failure(classify(err), email))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| match classify(err) {
                DbFailure::ConnectionLost(message) => UserRepositoryError::connection(message),
                other => UserRepositoryError::query(format!("{other:?}")),
            })?;

        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Error-mapping and row-conversion coverage.
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::new(raw).expect("valid email")
    }

    fn stored_row(role: &str) -> UserRow {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid ts");
        UserRow {
            id: 1,
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            role: role.to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn unique_violations_map_to_duplicate_email() {
        let err = map_db_failure(DbFailure::UniqueViolation, &email("ada@example.com"));
        assert_eq!(
            err,
            UserRepositoryError::DuplicateEmail {
                email: "ada@example.com".to_owned()
            }
        );
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("viewer", Role::Viewer)]
    #[case("superuser", Role::Viewer)]
    fn stored_roles_convert_with_viewer_fallback(#[case] stored: &str, #[case] expected: Role) {
        let user = row_to_user(stored_row(stored)).expect("row converts");
        assert_eq!(user.role, expected);
    }
}
