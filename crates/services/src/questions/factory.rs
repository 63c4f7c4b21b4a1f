use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::{Movie, QuizQuestion};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::loader::{MoviesLoader, PosterLoader};
use crate::error::QuestionSourceError;

/// Supplies questions to a quiz session.
///
/// `load_data` is called once before the first question and again only after
/// a failed load. `request_next_question` may yield `None` when nothing is
/// available; callers treat that as a no-op.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the question pool cannot be loaded.
    async fn load_data(&self) -> Result<(), QuestionSourceError>;

    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the question cannot be assembled
    /// (for example the poster download failed).
    async fn request_next_question(&self) -> Result<Option<QuizQuestion>, QuestionSourceError>;
}

/// Builds "is the rating greater than N?" questions from a movie pool.
#[derive(Clone)]
pub struct QuestionFactory {
    movies_loader: Arc<dyn MoviesLoader>,
    posters: Arc<dyn PosterLoader>,
    movies: Arc<Mutex<Vec<Movie>>>,
}

impl QuestionFactory {
    /// Thresholds are drawn from this range for every question.
    pub const RATING_THRESHOLDS: std::ops::RangeInclusive<u8> = 5..=9;

    #[must_use]
    pub fn new(movies_loader: Arc<dyn MoviesLoader>, posters: Arc<dyn PosterLoader>) -> Self {
        Self {
            movies_loader,
            posters,
            movies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn pick_movie(&self) -> Result<Option<(Movie, u8)>, QuestionSourceError> {
        let movies = self
            .movies
            .lock()
            .map_err(|e| QuestionSourceError::PoolPoisoned(e.to_string()))?;
        let mut rng = rand::rng();
        let Some(movie) = movies.choose(&mut rng).cloned() else {
            return Ok(None);
        };
        let threshold = rng.random_range(Self::RATING_THRESHOLDS);
        Ok(Some((movie, threshold)))
    }
}

#[async_trait]
impl QuestionSource for QuestionFactory {
    async fn load_data(&self) -> Result<(), QuestionSourceError> {
        let loaded = self.movies_loader.load_movies().await?;
        tracing::debug!(count = loaded.len(), "loaded movie pool");
        let mut movies = self
            .movies
            .lock()
            .map_err(|e| QuestionSourceError::PoolPoisoned(e.to_string()))?;
        *movies = loaded;
        Ok(())
    }

    async fn request_next_question(&self) -> Result<Option<QuizQuestion>, QuestionSourceError> {
        let Some((movie, threshold)) = self.pick_movie()? else {
            return Ok(None);
        };

        let image = if movie.image_url.is_empty() {
            Vec::new()
        } else {
            self.posters.load_poster(&movie).await?
        };

        let text = format!("Is the rating of this movie greater than {threshold}?");
        let correct_answer = movie.rating_value() > f32::from(threshold);
        Ok(Some(QuizQuestion::new(image, text, correct_answer)))
    }
}
