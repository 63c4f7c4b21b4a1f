use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{GameRecord, QuizQuestion, Statistics};
use quiz_core::time::fixed_now;
use services::quiz::{QuizResultView, QuizStepView};
use storage::repository::{
    GameRecordRow, InMemoryRepository, StatisticsRepository, StorageError,
};
use services::{
    Clock, QuestionSource, QuestionSourceError, QuizConfig, QuizInput, QuizPhase, QuizPresenter,
    QuizSession, QuizView, StatisticsService,
};

#[derive(Debug, Clone, PartialEq)]
enum ViewCall {
    Question(String),
    Result(String),
    Highlight(bool),
    Loading,
    HideLoading,
    Error(String),
    AnswersEnabled(bool),
}

#[derive(Default)]
struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    fn push(&self, call: ViewCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&ViewCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

impl QuizView for RecordingView {
    fn show_question(&self, step: &QuizStepView) {
        self.push(ViewCall::Question(step.question_number.clone()));
    }

    fn show_result(&self, result: &QuizResultView) {
        self.push(ViewCall::Result(result.text.clone()));
    }

    fn highlight_answer(&self, is_correct: bool) {
        self.push(ViewCall::Highlight(is_correct));
    }

    fn show_loading(&self) {
        self.push(ViewCall::Loading);
    }

    fn hide_loading(&self) {
        self.push(ViewCall::HideLoading);
    }

    fn show_error(&self, message: &str) {
        self.push(ViewCall::Error(message.to_string()));
    }

    fn set_answers_enabled(&self, enabled: bool) {
        self.push(ViewCall::AnswersEnabled(enabled));
    }
}

/// Every question expects "yes". Loads fail while `failing_loads` > 0 and
/// queued `None`s are handed out before real questions.
#[derive(Default)]
struct ScriptedSource {
    failing_loads: AtomicUsize,
    empty_answers: Mutex<VecDeque<()>>,
    load_calls: AtomicUsize,
    question_calls: AtomicUsize,
}

impl ScriptedSource {
    fn failing(loads: usize) -> Self {
        Self {
            failing_loads: AtomicUsize::new(loads),
            ..Self::default()
        }
    }

    fn with_empty_answers(count: usize) -> Self {
        Self {
            empty_answers: Mutex::new(std::iter::repeat_n((), count).collect()),
            ..Self::default()
        }
    }

    fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn load_data(&self) -> Result<(), QuestionSourceError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(QuestionSourceError::NoMovies);
        }
        Ok(())
    }

    async fn request_next_question(&self) -> Result<Option<QuizQuestion>, QuestionSourceError> {
        let n = self.question_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.empty_answers.lock().unwrap().pop_front().is_some() {
            return Ok(None);
        }
        Ok(Some(QuizQuestion::new(Vec::new(), format!("Q{n}"), true)))
    }
}

fn session_with(source: Arc<ScriptedSource>, amount: u32) -> (QuizSession, StatisticsService) {
    let statistics = StatisticsService::in_memory(Clock::fixed(fixed_now()));
    let session = QuizSession::new(
        QuizConfig::new().with_questions_amount(amount),
        source,
        statistics.clone(),
    )
    .unwrap();
    (session, statistics)
}

fn assert_invariant(presenter: &QuizPresenter) {
    let state = presenter.state();
    assert!(state.correct_count() <= state.current_index());
    assert!(state.current_index() <= state.questions_amount());
}

async fn step_until(session: &mut QuizSession, view: &RecordingView, phase: QuizPhase) {
    while session.presenter().phase() != phase {
        assert!(session.step(view).await);
        assert_invariant(session.presenter());
    }
}

#[tokio::test(start_paused = true)]
async fn seven_correct_out_of_ten() {
    let source = Arc::new(ScriptedSource::default());
    let (mut session, statistics) = session_with(Arc::clone(&source), 10);
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    for i in 0..10 {
        step_until(&mut session, &view, QuizPhase::QuestionShown).await;
        assert!(!session.presenter().is_round_complete());
        session.presenter_mut().on_answer(i < 7, &view);
        assert_invariant(session.presenter());
    }
    step_until(&mut session, &view, QuizPhase::RoundComplete).await;

    let presenter = session.presenter();
    assert!(presenter.is_round_complete());
    assert_eq!(presenter.state().correct_count(), 7);
    assert_eq!(presenter.state().current_index(), 10);

    let numbers: Vec<String> = view
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ViewCall::Question(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(numbers.first().map(String::as_str), Some("1/10"));
    assert_eq!(numbers.last().map(String::as_str), Some("10/10"));
    assert_eq!(numbers.len(), 10);

    assert_eq!(view.count(|c| *c == ViewCall::Highlight(true)), 7);
    assert_eq!(view.count(|c| *c == ViewCall::Highlight(false)), 3);

    let Some(ViewCall::Result(text)) = view.calls().last().cloned() else {
        panic!("round should end with a result");
    };
    assert!(text.contains("Your result: 7/10"));
    assert!(text.contains("Quizzes played: 1"));
    assert!(text.contains("Average accuracy: 70.00%"));

    assert_eq!(statistics.statistics().await.unwrap().games_count(), 1);
    assert_eq!(source.load_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn answers_are_locked_until_feedback_delay_elapses() {
    let source = Arc::new(ScriptedSource::default());
    let (mut session, _statistics) = session_with(source, 10);
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;

    let answered_at = tokio::time::Instant::now();
    session.presenter_mut().on_answer(true, &view);
    assert_eq!(session.presenter().phase(), QuizPhase::AnswerLocked);
    assert!(session.presenter().current_question().is_none());

    // second tap while locked is refused
    session.presenter_mut().on_answer(false, &view);
    assert_eq!(session.presenter_mut().advance(true), None);
    assert_eq!(session.presenter().state().current_index(), 1);
    assert_eq!(session.presenter().state().correct_count(), 1);
    assert_eq!(view.count(|c| matches!(c, ViewCall::Highlight(_))), 1);

    step_until(&mut session, &view, QuizPhase::QuestionShown).await;
    assert!(answered_at.elapsed() >= Duration::from_secs(1));
    assert_eq!(
        view.calls().iter().rev().nth(1),
        Some(&ViewCall::Question("2/10".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn answer_without_question_changes_nothing() {
    let source = Arc::new(ScriptedSource::default());
    let (mut session, _statistics) = session_with(source, 10);
    let view = RecordingView::default();

    session.presenter_mut().on_answer(true, &view);
    assert_eq!(session.presenter().phase(), QuizPhase::Idle);
    assert_eq!(session.presenter().state().current_index(), 0);
    assert!(view.calls().is_empty());

    session.presenter_mut().start(&view);
    session.presenter_mut().on_answer(true, &view);
    assert_eq!(session.presenter().phase(), QuizPhase::Loading);
    assert_eq!(session.presenter().state().current_index(), 0);
    assert_eq!(view.count(|c| matches!(c, ViewCall::Highlight(_))), 0);
}

#[tokio::test(start_paused = true)]
async fn load_failure_retry_loads_exactly_once_more() {
    let source = Arc::new(ScriptedSource::failing(1));
    let (mut session, _statistics) = session_with(Arc::clone(&source), 10);
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    step_until(&mut session, &view, QuizPhase::ErrorShown).await;
    assert_eq!(source.load_calls(), 1);
    assert_eq!(
        view.calls().last(),
        Some(&ViewCall::Error("movies service returned no movies".into()))
    );

    let input = session.input();
    assert!(input.retry());
    assert!(input.retry());
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;

    // drain the duplicate retry, which must be ignored
    assert!(input.quit());
    while session.step(&view).await {}

    assert_eq!(source.load_calls(), 2);
    assert_eq!(session.presenter().phase(), QuizPhase::QuestionShown);
    assert_eq!(view.count(|c| matches!(c, ViewCall::Question(_))), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_question_is_ignored() {
    let source = Arc::new(ScriptedSource::with_empty_answers(1));
    let (mut session, _statistics) = session_with(source, 10);
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    // DataLoaded, then an empty QuestionReceived
    assert!(session.step(&view).await);
    assert!(session.step(&view).await);

    assert_eq!(session.presenter().phase(), QuizPhase::Loading);
    assert!(session.presenter().current_question().is_none());
    assert_eq!(view.count(|c| matches!(c, ViewCall::Question(_))), 0);
    assert_eq!(view.count(|c| matches!(c, ViewCall::Error(_))), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_cancels_pending_feedback() {
    let source = Arc::new(ScriptedSource::default());
    let (mut session, statistics) = session_with(Arc::clone(&source), 2);
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;
    session.presenter_mut().on_answer(true, &view);
    session.presenter_mut().restart(&view);

    assert_eq!(session.presenter().state().current_index(), 0);
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;
    assert_eq!(
        view.calls().iter().rev().nth(1),
        Some(&ViewCall::Question("1/2".into()))
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(session.input().quit());
    while session.step(&view).await {}

    assert_eq!(session.presenter().phase(), QuizPhase::QuestionShown);
    assert_eq!(session.presenter().state().current_index(), 0);
    assert_eq!(statistics.statistics().await.unwrap().games_count(), 0);
    assert_eq!(source.load_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn direct_advance_still_moves_the_round_on() {
    let source = Arc::new(ScriptedSource::default());
    let (mut session, _statistics) = session_with(source, 3);
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;

    let outcome = session.presenter_mut().advance(true).unwrap();
    assert!(outcome.is_correct);
    assert_eq!(session.presenter().phase(), QuizPhase::AnswerLocked);

    // the tap that follows is refused and counts nothing
    session.presenter_mut().on_answer(true, &view);
    assert_eq!(session.presenter().state().current_index(), 1);
    assert_eq!(session.presenter().state().correct_count(), 1);

    step_until(&mut session, &view, QuizPhase::QuestionShown).await;
    assert_eq!(
        view.calls().iter().rev().nth(1),
        Some(&ViewCall::Question("2/3".into()))
    );
}

/// Fails the first `failures` writes, then stores games in memory.
struct FlakyStatistics {
    failures: AtomicUsize,
    inner: InMemoryRepository,
}

#[async_trait]
impl StatisticsRepository for FlakyStatistics {
    async fn record_game(&self, game: &GameRecord) -> Result<Statistics, StorageError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.record_game(game).await
    }

    async fn load_statistics(&self) -> Result<Statistics, StorageError> {
        self.inner.load_statistics().await
    }

    async fn recent_games(&self, limit: u32) -> Result<Vec<GameRecordRow>, StorageError> {
        self.inner.recent_games(limit).await
    }
}

#[tokio::test(start_paused = true)]
async fn failed_store_shows_error_and_retry_starts_new_round() {
    let source = Arc::new(ScriptedSource::default());
    let statistics = StatisticsService::new(
        Clock::fixed(fixed_now()),
        Arc::new(FlakyStatistics {
            failures: AtomicUsize::new(1),
            inner: InMemoryRepository::new(),
        }),
    );
    let mut session = QuizSession::new(
        QuizConfig::new().with_questions_amount(1),
        Arc::clone(&source) as Arc<dyn QuestionSource>,
        statistics.clone(),
    )
    .unwrap();
    let view = RecordingView::default();

    session.presenter_mut().start(&view);
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;
    session.presenter_mut().on_answer(true, &view);
    step_until(&mut session, &view, QuizPhase::ErrorShown).await;

    assert_eq!(
        view.calls().last(),
        Some(&ViewCall::Error("connection error: disk full".into()))
    );
    assert_eq!(view.count(|c| matches!(c, ViewCall::Result(_))), 0);
    assert_eq!(statistics.statistics().await.unwrap().games_count(), 0);

    assert!(session.input().retry());
    step_until(&mut session, &view, QuizPhase::QuestionShown).await;
    assert_eq!(session.presenter().state().current_index(), 0);
    assert_eq!(session.presenter().state().correct_count(), 0);

    session.presenter_mut().on_answer(true, &view);
    step_until(&mut session, &view, QuizPhase::RoundComplete).await;
    assert_eq!(statistics.statistics().await.unwrap().games_count(), 1);
    assert_eq!(source.load_calls(), 1);
}

/// Adapter that answers every question with "yes" and quits after the
/// second result.
struct AutoPlayer {
    input: QuizInput,
    results: Mutex<Vec<String>>,
}

impl QuizView for AutoPlayer {
    fn show_question(&self, _step: &QuizStepView) {
        self.input.yes();
    }

    fn show_result(&self, result: &QuizResultView) {
        let mut results = self.results.lock().unwrap();
        results.push(result.text.clone());
        if results.len() == 2 {
            self.input.quit();
        } else {
            self.input.restart();
        }
    }

    fn highlight_answer(&self, _is_correct: bool) {}
    fn show_loading(&self) {}
    fn hide_loading(&self) {}
    fn show_error(&self, _message: &str) {}
}

#[tokio::test(start_paused = true)]
async fn run_loop_plays_two_rounds() {
    let source = Arc::new(ScriptedSource::default());
    let (mut session, statistics) = session_with(Arc::clone(&source), 3);
    let player = AutoPlayer {
        input: session.input(),
        results: Mutex::new(Vec::new()),
    };

    session.run(&player).await;

    let results = player.results.lock().unwrap().clone();
    assert_eq!(results.len(), 2);
    assert!(results[0].contains("Your result: 3/3"));
    assert!(results[1].contains("Quizzes played: 2"));

    let stats = statistics.statistics().await.unwrap();
    assert_eq!(stats.games_count(), 2);
    assert!((stats.total_accuracy() - 100.0).abs() < f64::EPSILON);
    assert_eq!(source.load_calls(), 1);
}
