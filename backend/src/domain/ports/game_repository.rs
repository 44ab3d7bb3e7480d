//! Port abstraction for game persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::game::{Game, GameCode, GameDraft, GamePatch, GameUpsertItem};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by game repository adapters.
    pub enum GameRepositoryError {
        /// Repository connection could not be established or checked out.
        Connection { message: String } => "game repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "game repository query failed: {message}",
        /// No game carries the requested code.
        Missing { code: String } => "Game not found",
        /// The code is already taken by another game.
        DuplicateCode { code: String } => "Game code already exists",
        /// Recorded results still reference the game.
        Referenced { code: String } => "Game still has recorded results",
    }
}

impl From<GameRepositoryError> for crate::domain::Error {
    fn from(value: GameRepositoryError) -> Self {
        match value {
            GameRepositoryError::Connection { message } => Self::service_unavailable(message),
            GameRepositoryError::Query { message } => Self::internal(message),
            GameRepositoryError::Missing { .. } => Self::not_found(value.to_string()),
            GameRepositoryError::DuplicateCode { .. } | GameRepositoryError::Referenced { .. } => {
                Self::conflict(value.to_string())
            }
        }
    }
}

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// All games, ordered by `order_index` then `name`.
    async fn list(&self) -> Result<Vec<Game>, GameRepositoryError>;

    /// Fetch a game by its normalized code.
    async fn find_by_code(&self, code: &GameCode) -> Result<Option<Game>, GameRepositoryError>;

    /// Insert a new game; fails with [`GameRepositoryError::DuplicateCode`]
    /// when the code is taken.
    async fn create(&self, draft: &GameDraft) -> Result<Game, GameRepositoryError>;

    /// Apply a partial update, optionally renaming the code.
    async fn update_by_code(
        &self,
        code: &GameCode,
        patch: &GamePatch,
    ) -> Result<Game, GameRepositoryError>;

    /// Delete a game by code; fails with [`GameRepositoryError::Referenced`]
    /// while result rows still point at it.
    async fn delete_by_code(&self, code: &GameCode) -> Result<(), GameRepositoryError>;

    /// Upsert a batch of games inside one transaction; any failure rolls the
    /// whole batch back.
    async fn bulk_upsert(&self, items: &[GameUpsertItem]) -> Result<(), GameRepositoryError>;
}
