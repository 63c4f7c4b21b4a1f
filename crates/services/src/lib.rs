#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod questions;
pub mod quiz;
pub mod statistics_service;

pub use quiz_core::Clock;

pub use config::QuizConfig;
pub use error::{QuestionSourceError, QuizError, StatisticsError};
pub use questions::{QuestionFactory, QuestionSource};
pub use quiz::{QuizInput, QuizPhase, QuizPresenter, QuizSession, QuizView};
pub use statistics_service::StatisticsService;
