mod factory;
mod loader;

pub use factory::{QuestionFactory, QuestionSource};
pub use loader::{
    HttpMoviesLoader, HttpPosterLoader, MoviesConfig, MoviesLoader, PosterLoader,
    StaticMoviesLoader, parse_movies,
};
