use std::sync::Arc;

use quiz_core::model::{GameRecord, Statistics};
use storage::repository::{GameRecordRow, InMemoryRepository, StatisticsRepository};

use crate::Clock;
use crate::error::StatisticsError;

/// Statistics store facade: stamps finished games and hides the repository.
#[derive(Clone)]
pub struct StatisticsService {
    clock: Clock,
    repo: Arc<dyn StatisticsRepository>,
}

impl StatisticsService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn StatisticsRepository>) -> Self {
        Self { clock, repo }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    /// Record a finished round and return the updated aggregate.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Game` for impossible counts and
    /// `StatisticsError::Storage` if the repository write fails.
    pub async fn store(&self, correct: u32, total: u32) -> Result<Statistics, StatisticsError> {
        let game = GameRecord::new(correct, total, self.clock.now())?;
        let statistics = self.repo.record_game(&game).await?;
        tracing::debug!(
            correct,
            total,
            games_count = statistics.games_count(),
            "stored game"
        );
        Ok(statistics)
    }

    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` on repository failures.
    pub async fn statistics(&self) -> Result<Statistics, StatisticsError> {
        Ok(self.repo.load_statistics().await?)
    }

    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` on repository failures.
    pub async fn recent_games(&self, limit: u32) -> Result<Vec<GameRecordRow>, StatisticsError> {
        Ok(self.repo.recent_games(limit).await?)
    }
}
