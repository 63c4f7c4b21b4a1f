use std::env;

use async_trait::async_trait;
use quiz_core::model::Movie;
use reqwest::Client;
use serde::Deserialize;

use crate::error::QuestionSourceError;

/// Fetches the pool of movies questions are built from.
#[async_trait]
pub trait MoviesLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the pool cannot be fetched or is empty.
    async fn load_movies(&self) -> Result<Vec<Movie>, QuestionSourceError>;
}

/// Fetches poster bytes for a movie.
#[async_trait]
pub trait PosterLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the poster cannot be downloaded.
    async fn load_poster(&self, movie: &Movie) -> Result<Vec<u8>, QuestionSourceError>;
}

#[derive(Clone, Debug)]
pub struct MoviesConfig {
    pub movies_url: String,
}

impl MoviesConfig {
    /// Reads `MOVIE_QUIZ_MOVIES_URL`. Returns `None` when unset or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let movies_url = env::var("MOVIE_QUIZ_MOVIES_URL").ok()?;
        if movies_url.trim().is_empty() {
            return None;
        }
        Some(Self { movies_url })
    }
}

/// Loads the "most popular movies" document over HTTP.
#[derive(Clone)]
pub struct HttpMoviesLoader {
    client: Client,
    config: MoviesConfig,
}

impl HttpMoviesLoader {
    #[must_use]
    pub fn new(config: MoviesConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MoviesLoader for HttpMoviesLoader {
    async fn load_movies(&self) -> Result<Vec<Movie>, QuestionSourceError> {
        let response = self.client.get(&self.config.movies_url).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }

        let body: MostPopularMovies = response.json().await?;
        body.into_movies()
    }
}

/// Decode a "most popular movies" JSON document.
///
/// # Errors
///
/// Returns `QuestionSourceError::Decode` for malformed JSON,
/// `QuestionSourceError::Api` when the document carries an error message and
/// `QuestionSourceError::NoMovies` when the item list is empty.
pub fn parse_movies(body: &str) -> Result<Vec<Movie>, QuestionSourceError> {
    let body: MostPopularMovies = serde_json::from_str(body)?;
    body.into_movies()
}

/// Downloads the 600px poster rendition.
#[derive(Clone, Default)]
pub struct HttpPosterLoader {
    client: Client,
}

impl HttpPosterLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PosterLoader for HttpPosterLoader {
    async fn load_poster(&self, movie: &Movie) -> Result<Vec<u8>, QuestionSourceError> {
        let poster_err = |reason: String| QuestionSourceError::Poster {
            title: movie.title.clone(),
            reason,
        };

        let response = self
            .client
            .get(movie.resized_image_url())
            .send()
            .await
            .map_err(|e| poster_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(poster_err(format!("status {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| poster_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Fixed movie pool for offline play and tests.
#[derive(Clone, Debug)]
pub struct StaticMoviesLoader {
    movies: Vec<Movie>,
}

impl StaticMoviesLoader {
    #[must_use]
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// A small built-in pool without posters.
    #[must_use]
    pub fn bundled() -> Self {
        let movies = [
            ("The Godfather", "9.2"),
            ("The Dark Knight", "9.0"),
            ("Kill Bill", "8.1"),
            ("The Avengers", "8.0"),
            ("Deadpool", "8.0"),
            ("The Green Knight", "6.6"),
            ("Old", "5.8"),
            ("The Ice Age Adventures of Buck Wild", "4.3"),
            ("Tesla", "5.1"),
            ("Vivarium", "5.8"),
        ]
        .into_iter()
        .map(|(title, rating)| Movie::new(title, rating, ""))
        .collect();
        Self { movies }
    }
}

#[async_trait]
impl MoviesLoader for StaticMoviesLoader {
    async fn load_movies(&self) -> Result<Vec<Movie>, QuestionSourceError> {
        if self.movies.is_empty() {
            return Err(QuestionSourceError::NoMovies);
        }
        Ok(self.movies.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MostPopularMovies {
    #[serde(default)]
    error_message: String,
    #[serde(default)]
    items: Vec<MostPopularMovie>,
}

#[derive(Debug, Deserialize)]
struct MostPopularMovie {
    #[serde(rename = "fullTitle")]
    title: String,
    #[serde(rename = "imDbRating", default)]
    rating: String,
    #[serde(rename = "image", default)]
    image_url: String,
}

impl MostPopularMovies {
    fn into_movies(self) -> Result<Vec<Movie>, QuestionSourceError> {
        if !self.error_message.trim().is_empty() {
            return Err(QuestionSourceError::Api(self.error_message));
        }
        if self.items.is_empty() {
            return Err(QuestionSourceError::NoMovies);
        }
        Ok(self
            .items
            .into_iter()
            .map(|m| Movie::new(m.title, m.rating, m.image_url))
            .collect())
    }
}
