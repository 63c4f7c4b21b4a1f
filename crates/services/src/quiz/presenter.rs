use std::fmt;
use std::sync::Arc;

use quiz_core::model::{AnswerOutcome, QuizQuestion, SessionState};

use super::dispatch::{Dispatcher, Generation, QuizEvent, ScheduledTask};
use super::view::{PosterImage, QuizResultView, QuizStepView, QuizView};
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::questions::QuestionSource;
use crate::statistics_service::StatisticsService;

/// Where the round currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Loading,
    QuestionShown,
    AnswerLocked,
    RoundComplete,
    ErrorShown,
}

/// Drives one round of questions: sequencing, answer evaluation, pacing and
/// the end-of-round summary.
///
/// Single-threaded by construction: every method takes `&mut self` and is
/// called from the loop that drains the session's event queue. Background
/// work (question loading, the feedback timer) reports back through that
/// queue and is tagged with the generation it was started in; `start`
/// cancels outstanding work and bumps the generation.
pub struct QuizPresenter {
    config: QuizConfig,
    source: Arc<dyn QuestionSource>,
    statistics: StatisticsService,
    dispatcher: Dispatcher,

    state: SessionState,
    phase: QuizPhase,
    current_question: Option<QuizQuestion>,
    data_loaded: bool,
    generation: Generation,
    in_flight: Option<ScheduledTask>,
    feedback_timer: Option<ScheduledTask>,
}

impl QuizPresenter {
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the configured round has no questions.
    pub fn new(
        config: QuizConfig,
        source: Arc<dyn QuestionSource>,
        statistics: StatisticsService,
        dispatcher: Dispatcher,
    ) -> Result<Self, QuizError> {
        let state = SessionState::new(config.questions_amount())?;
        Ok(Self {
            config,
            source,
            statistics,
            dispatcher,
            state,
            phase: QuizPhase::Idle,
            current_question: None,
            data_loaded: false,
            generation: 0,
            in_flight: None,
            feedback_timer: None,
        })
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn is_round_complete(&self) -> bool {
        self.state.is_round_complete()
    }

    /// Route one queued event.
    pub async fn handle(&mut self, event: QuizEvent, view: &dyn QuizView) {
        match event {
            QuizEvent::DataLoaded { generation } => self.on_data_loaded(generation),
            QuizEvent::LoadFailed {
                generation,
                message,
            } => self.on_load_failed(generation, &message, view),
            QuizEvent::QuestionReceived {
                generation,
                question,
            } => self.on_question_received(generation, question, view),
            QuizEvent::FeedbackElapsed { generation } => {
                self.on_feedback_elapsed(generation, view).await;
            }
            QuizEvent::Answer { says_yes } => self.on_answer(says_yes, view),
            QuizEvent::Retry => self.retry(view),
            QuizEvent::Restart => self.restart(view),
            QuizEvent::Quit => self.cancel_pending(),
        }
    }

    /// Begin a fresh round.
    ///
    /// Loads the question pool if it has not been loaded yet, otherwise asks
    /// for the first question straight away.
    pub fn start(&mut self, view: &dyn QuizView) {
        self.cancel_pending();
        self.generation += 1;
        self.state.reset();
        self.current_question = None;
        self.phase = QuizPhase::Loading;
        view.set_answers_enabled(false);
        view.show_loading();

        if self.data_loaded {
            self.request_next_question();
        } else {
            self.load_data();
        }
    }

    pub fn restart(&mut self, view: &dyn QuizView) {
        self.start(view);
    }

    /// User-requested retry after a failure. Ignored unless an error is showing.
    pub fn retry(&mut self, view: &dyn QuizView) {
        if self.phase != QuizPhase::ErrorShown {
            tracing::debug!(phase = ?self.phase, "retry ignored");
            return;
        }
        self.start(view);
    }

    pub fn on_question_received(
        &mut self,
        generation: Generation,
        question: Option<QuizQuestion>,
        view: &dyn QuizView,
    ) {
        if !self.accept(generation) {
            return;
        }
        self.in_flight = None;
        let Some(question) = question else {
            return;
        };

        let step = QuizStepView {
            image: PosterImage::decode(question.image()),
            question: question.text().to_string(),
            question_number: self.state.question_number(),
        };
        self.current_question = Some(question);
        self.phase = QuizPhase::QuestionShown;

        view.hide_loading();
        view.show_question(&step);
        view.set_answers_enabled(true);
    }

    /// Evaluate a yes/no answer for the current question.
    ///
    /// Answers are refused unless a question is showing and unlocked; no
    /// state changes in that case.
    pub fn on_answer(&mut self, says_yes: bool, view: &dyn QuizView) {
        let Some(outcome) = self.advance(says_yes) else {
            return;
        };
        view.set_answers_enabled(false);
        view.highlight_answer(outcome.is_correct);
    }

    /// Move past the current question, counting `says_yes` against it.
    ///
    /// Locks answers and schedules the feedback timer, so the round moves on
    /// whoever calls it. Consumes the current question and runs at most once
    /// per question. Returns `None` unless a question is showing.
    pub fn advance(&mut self, says_yes: bool) -> Option<AnswerOutcome> {
        if self.phase != QuizPhase::QuestionShown {
            tracing::debug!(phase = ?self.phase, "answer ignored");
            return None;
        }
        let question = self.current_question.take()?;
        let outcome = match self.state.advance(question.is_correct(says_yes)) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%err, "question arrived after the round was complete");
                return None;
            }
        };

        self.phase = QuizPhase::AnswerLocked;
        self.feedback_timer = Some(self.dispatcher.schedule_after(
            self.config.feedback_delay(),
            QuizEvent::FeedbackElapsed {
                generation: self.generation,
            },
        ));
        Some(outcome)
    }

    /// Store the finished game and show the summary.
    pub async fn finish_round(&mut self, view: &dyn QuizView) {
        let correct = self.state.correct_count();
        let amount = self.state.questions_amount();

        match self.statistics.store(correct, amount).await {
            Ok(statistics) => {
                tracing::info!(
                    correct,
                    amount,
                    games_count = statistics.games_count(),
                    "round complete"
                );
                self.phase = QuizPhase::RoundComplete;
                view.show_result(&QuizResultView::round_over(correct, amount, &statistics));
            }
            Err(err) => {
                tracing::warn!(%err, "failed to store game");
                self.phase = QuizPhase::ErrorShown;
                view.show_error(&err.to_string());
            }
        }
    }

    fn on_data_loaded(&mut self, generation: Generation) {
        if !self.accept(generation) {
            return;
        }
        self.in_flight = None;
        self.data_loaded = true;
        self.request_next_question();
    }

    fn on_load_failed(&mut self, generation: Generation, message: &str, view: &dyn QuizView) {
        if !self.accept(generation) {
            return;
        }
        tracing::warn!(error = message, "question load failed");
        self.in_flight = None;
        self.phase = QuizPhase::ErrorShown;
        view.hide_loading();
        view.show_error(message);
    }

    async fn on_feedback_elapsed(&mut self, generation: Generation, view: &dyn QuizView) {
        if !self.accept(generation) || self.phase != QuizPhase::AnswerLocked {
            return;
        }
        self.feedback_timer = None;

        if self.state.is_round_complete() {
            self.finish_round(view).await;
        } else {
            self.phase = QuizPhase::Loading;
            view.show_loading();
            self.request_next_question();
        }
    }

    fn load_data(&mut self) {
        let source = Arc::clone(&self.source);
        let generation = self.generation;
        tracing::debug!(generation, "loading question data");
        self.in_flight = Some(self.dispatcher.spawn(async move {
            match source.load_data().await {
                Ok(()) => QuizEvent::DataLoaded { generation },
                Err(err) => QuizEvent::LoadFailed {
                    generation,
                    message: err.to_string(),
                },
            }
        }));
    }

    fn request_next_question(&mut self) {
        let source = Arc::clone(&self.source);
        let generation = self.generation;
        self.in_flight = Some(self.dispatcher.spawn(async move {
            match source.request_next_question().await {
                Ok(question) => QuizEvent::QuestionReceived {
                    generation,
                    question,
                },
                Err(err) => QuizEvent::LoadFailed {
                    generation,
                    message: err.to_string(),
                },
            }
        }));
    }

    fn accept(&self, generation: Generation) -> bool {
        if generation == self.generation {
            return true;
        }
        tracing::debug!(
            generation,
            current = self.generation,
            "dropping stale quiz event"
        );
        false
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.cancel();
        }
        if let Some(timer) = self.feedback_timer.take() {
            timer.cancel();
        }
    }
}

impl fmt::Debug for QuizPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizPresenter")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("has_question", &self.current_question.is_some())
            .field("data_loaded", &self.data_loaded)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
