use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameRecordError {
    #[error("a game must contain at least one question")]
    EmptyGame,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    TooManyCorrect { correct: u32, total: u32 },
}

/// Result of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    correct: u32,
    total: u32,
    date: DateTime<Utc>,
}

impl GameRecord {
    /// Build a record for a round that finished at `date`.
    ///
    /// # Errors
    ///
    /// Returns `GameRecordError::EmptyGame` when `total` is zero and
    /// `GameRecordError::TooManyCorrect` when `correct > total`.
    pub fn new(correct: u32, total: u32, date: DateTime<Utc>) -> Result<Self, GameRecordError> {
        if total == 0 {
            return Err(GameRecordError::EmptyGame);
        }
        if correct > total {
            return Err(GameRecordError::TooManyCorrect { correct, total });
        }
        Ok(Self {
            correct,
            total,
            date,
        })
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Strictly more correct answers than `other`. Ties keep the older record.
    #[must_use]
    pub fn is_better_than(&self, other: &GameRecord) -> bool {
        self.correct > other.correct
    }
}
