//! In-memory port implementations and fixtures for handler tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::domain::ports::{
    Diagnostics, DiagnosticsError, GameRepository, GameRepositoryError, ResultRepository,
    ResultRepositoryError, StorageReport, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AuthService, Game, GameCode, GameDraft, GamePatch, GameUpsertItem, NewResult, NewUser,
    ResultRow, ResultsService, User,
};
use crate::domain::result::{DateStamp, MonthRef};
use crate::domain::user::EmailAddress;
use crate::security::{CredentialHasher, TokenCodec};

use super::state::HttpState;

pub const TEST_SECRET: &[u8] = b"handler-test-secret";

fn fixed_timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid ts")
}

/// In-memory `GameRepository` mirroring the relational semantics.
#[derive(Default)]
pub struct InMemoryGames {
    rows: Mutex<Vec<Game>>,
    next_id: AtomicI64,
}

impl InMemoryGames {
    pub fn seeded(specs: &[(&str, &str, i32)]) -> Self {
        let repo = Self::default();
        {
            let mut rows = repo.rows.lock().expect("rows lock");
            for (name, code, order_index) in specs {
                let id = repo.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                rows.push(Game {
                    id: i32::try_from(id).expect("small id"),
                    name: (*name).to_owned(),
                    code: GameCode::new(code).expect("valid code"),
                    default_time: String::new(),
                    order_index: *order_index,
                    created_at: fixed_timestamp(),
                    updated_at: fixed_timestamp(),
                });
            }
        }
        repo
    }
}

#[async_trait]
impl GameRepository for InMemoryGames {
    async fn list(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock").clone();
        rows.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    async fn find_by_code(&self, code: &GameCode) -> Result<Option<Game>, GameRepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|g| &g.code == code)
            .cloned())
    }

    async fn create(&self, draft: &GameDraft) -> Result<Game, GameRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if rows.iter().any(|g| g.code == draft.code) {
            return Err(GameRepositoryError::duplicate_code(
                draft.code.as_str().to_owned(),
            ));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let game = Game {
            id: i32::try_from(id).expect("small id"),
            name: draft.name.as_str().to_owned(),
            code: draft.code.clone(),
            default_time: draft.default_time.clone(),
            order_index: draft.order_index,
            created_at: fixed_timestamp(),
            updated_at: fixed_timestamp(),
        };
        rows.push(game.clone());
        Ok(game)
    }

    async fn update_by_code(
        &self,
        code: &GameCode,
        patch: &GamePatch,
    ) -> Result<Game, GameRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let target_code = patch.new_code.clone().unwrap_or_else(|| code.clone());
        if &target_code != code
            && rows.iter().any(|g| g.code == target_code)
        {
            return Err(GameRepositoryError::duplicate_code(
                target_code.as_str().to_owned(),
            ));
        }
        let game = rows
            .iter_mut()
            .find(|g| &g.code == code)
            .ok_or_else(|| GameRepositoryError::missing(code.as_str().to_owned()))?;
        game.code = target_code;
        if let Some(name) = &patch.name {
            game.name = name.as_str().to_owned();
        }
        if let Some(default_time) = &patch.default_time {
            game.default_time = default_time.clone();
        }
        if let Some(order_index) = patch.order_index {
            game.order_index = order_index;
        }
        Ok(game.clone())
    }

    async fn delete_by_code(&self, code: &GameCode) -> Result<(), GameRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|g| &g.code != code);
        if rows.len() == before {
            return Err(GameRepositoryError::missing(code.as_str().to_owned()));
        }
        Ok(())
    }

    async fn bulk_upsert(&self, items: &[GameUpsertItem]) -> Result<(), GameRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        for item in items {
            if let Some(existing) = rows.iter_mut().find(|g| g.code == item.code) {
                existing.name = item.name.as_str().to_owned();
                existing.default_time = item.default_time.clone();
                existing.order_index = item.order_index;
            } else {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                rows.push(Game {
                    id: i32::try_from(id).expect("small id"),
                    name: item.name.as_str().to_owned(),
                    code: item.code.clone(),
                    default_time: item.default_time.clone(),
                    order_index: item.order_index,
                    created_at: fixed_timestamp(),
                    updated_at: fixed_timestamp(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory append-only `ResultRepository`.
#[derive(Default)]
pub struct InMemoryResults {
    rows: Mutex<Vec<ResultRow>>,
}

#[async_trait]
impl ResultRepository for InMemoryResults {
    async fn insert(&self, row: &NewResult) -> Result<i64, ResultRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(ResultRow {
            id,
            game_id: row.game_id,
            date: row.date.clone(),
            slot: row.slot,
            value: row.value.clone(),
            source: row.source.clone(),
            note: row.note.clone(),
            created_at: fixed_timestamp(),
        });
        Ok(id)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ResultRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(ResultRepositoryError::missing(id));
        }
        Ok(())
    }

    async fn rows_for_date(
        &self,
        date: &DateStamp,
    ) -> Result<Vec<ResultRow>, ResultRepositoryError> {
        let mut rows: Vec<ResultRow> = self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|r| &r.date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn rows_for_month(
        &self,
        month: MonthRef,
    ) -> Result<Vec<ResultRow>, ResultRepositoryError> {
        let prefix = month.date_prefix();
        let mut rows: Vec<ResultRow> = self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|r| r.date.as_str().starts_with(&prefix))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }
}

/// In-memory `UserRepository`.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    /// Seed one account with the given role and password.
    pub fn seeded(email: &str, password: &str, role: crate::domain::Role) -> Self {
        let repo = Self::default();
        {
            let mut rows = repo.rows.lock().expect("rows lock");
            rows.push(User {
                id: 1,
                name: "Seeded".to_owned(),
                email: EmailAddress::new(email).expect("valid email"),
                role,
                password_hash: CredentialHasher::new().hash(password).expect("hash"),
                created_at: fixed_timestamp(),
                updated_at: fixed_timestamp(),
            });
        }
        repo
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if rows.iter().any(|u| u.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(
                user.email.as_str().to_owned(),
            ));
        }
        let id = i32::try_from(rows.len()).expect("small table") + 1;
        let created = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            password_hash: user.password_hash.clone(),
            created_at: fixed_timestamp(),
            updated_at: fixed_timestamp(),
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

/// Diagnostics stub reporting a canned storage layout.
pub struct StubDiagnostics;

#[async_trait]
impl Diagnostics for StubDiagnostics {
    async fn storage_report(&self) -> Result<StorageReport, DiagnosticsError> {
        Ok(StorageReport {
            database: "drawboard_test".to_owned(),
            tables: vec![
                "games".to_owned(),
                "otp_tokens".to_owned(),
                "results".to_owned(),
                "timewise_results".to_owned(),
                "users".to_owned(),
            ],
        })
    }
}

/// Bundle the in-memory ports into handler state.
pub fn state_with(
    games: Arc<InMemoryGames>,
    results: Arc<InMemoryResults>,
    users: Arc<InMemoryUsers>,
) -> actix_web::web::Data<HttpState> {
    let codec = TokenCodec::new(TEST_SECRET, Duration::days(7));
    let state = HttpState::new(
        games.clone(),
        ResultsService::new(games, results),
        AuthService::new(users, codec),
        Arc::new(StubDiagnostics),
    );
    actix_web::web::Data::new(state)
}

/// Mint a bearer token for a synthetic user with the given role.
pub fn bearer_for(role: crate::domain::Role) -> String {
    let codec = TokenCodec::new(TEST_SECRET, Duration::days(7));
    let user = User {
        id: 1,
        name: "Token Holder".to_owned(),
        email: EmailAddress::new("holder@example.com").expect("valid email"),
        role,
        password_hash: String::new(),
        created_at: fixed_timestamp(),
        updated_at: fixed_timestamp(),
    };
    format!("Bearer {}", codec.issue(&user).expect("token issues"))
}
