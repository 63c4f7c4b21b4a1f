use std::sync::Arc;

use tokio::sync::mpsc;

use super::dispatch::{Dispatcher, QuizEvent, QuizInput};
use super::presenter::QuizPresenter;
use super::view::QuizView;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::questions::QuestionSource;
use crate::statistics_service::StatisticsService;

/// A presenter paired with the event queue it drains.
///
/// `run` is the UI-owning loop: every adapter call happens here, one event at
/// a time.
#[derive(Debug)]
pub struct QuizSession {
    presenter: QuizPresenter,
    events: mpsc::UnboundedReceiver<QuizEvent>,
    input: QuizInput,
}

impl QuizSession {
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the configured round has no questions.
    pub fn new(
        config: QuizConfig,
        source: Arc<dyn QuestionSource>,
        statistics: StatisticsService,
    ) -> Result<Self, QuizError> {
        let (dispatcher, events) = Dispatcher::channel();
        let input = dispatcher.input();
        let presenter = QuizPresenter::new(config, source, statistics, dispatcher)?;
        Ok(Self {
            presenter,
            events,
            input,
        })
    }

    /// Handle for forwarding yes/no taps, retry and quit.
    #[must_use]
    pub fn input(&self) -> QuizInput {
        self.input.clone()
    }

    #[must_use]
    pub fn presenter(&self) -> &QuizPresenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut QuizPresenter {
        &mut self.presenter
    }

    /// Start a round and process events until `Quit`.
    pub async fn run(&mut self, view: &dyn QuizView) {
        self.presenter.start(view);
        while self.step(view).await {}
        tracing::debug!("quiz session stopped");
    }

    /// Wait for the next event and handle it. Returns `false` after `Quit`.
    pub async fn step(&mut self, view: &dyn QuizView) -> bool {
        let Some(event) = self.events.recv().await else {
            return false;
        };
        let quit = matches!(event, QuizEvent::Quit);
        self.presenter.handle(event, view).await;
        !quit
    }
}
