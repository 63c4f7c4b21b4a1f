//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{GameRecordError, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by question sources and their loaders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("movies request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("movies response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("movies service reported an error: {0}")]
    Api(String),
    #[error("movies service returned no movies")]
    NoMovies,
    #[error("failed to load poster for {title}: {reason}")]
    Poster { title: String, reason: String },
    #[error("movie pool is unavailable: {0}")]
    PoolPoisoned(String),
}

/// Errors emitted by `StatisticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error(transparent)]
    Game(#[from] GameRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while assembling a quiz session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
