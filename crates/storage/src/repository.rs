use async_trait::async_trait;
use quiz_core::model::{GameRecord, Statistics};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted game with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecordRow {
    pub id: i64,
    pub game: GameRecord,
}

impl GameRecordRow {
    #[must_use]
    pub fn new(id: i64, game: GameRecord) -> Self {
        Self { id, game }
    }
}

/// Repository contract for finished games and the statistics derived from them.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Persist a finished game and return the updated aggregate.
    ///
    /// The write and the aggregate read happen atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the game cannot be stored.
    async fn record_game(&self, game: &GameRecord) -> Result<Statistics, StorageError>;

    /// Load the current aggregate statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn load_statistics(&self) -> Result<Statistics, StorageError>;

    /// List finished games, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn recent_games(&self, limit: u32) -> Result<Vec<GameRecordRow>, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    statistics: Statistics,
    games: Vec<GameRecordRow>,
}

/// Simple in-memory repository implementation for testing and offline play.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryRepository {
    async fn record_game(&self, game: &GameRecord) -> Result<Statistics, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.games.len())
            .map_err(|_| StorageError::Serialization("game id overflow".into()))?
            + 1;
        guard.games.push(GameRecordRow::new(id, *game));
        guard.statistics.record(*game);
        Ok(guard.statistics.clone())
    }

    async fn load_statistics(&self) -> Result<Statistics, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.statistics.clone())
    }

    async fn recent_games(&self, limit: u32) -> Result<Vec<GameRecordRow>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.games.iter().rev().take(limit).cloned().collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub statistics: Arc<dyn StatisticsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            statistics: Arc::new(InMemoryRepository::new()),
        }
    }
}
