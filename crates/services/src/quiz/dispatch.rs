use std::future::Future;
use std::time::Duration;

use quiz_core::model::QuizQuestion;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Monotonic tag stamped on asynchronous work. Events carrying an older tag
/// than the presenter's current one are dropped.
pub type Generation = u64;

/// Everything the presenter reacts to, delivered through a single queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    DataLoaded {
        generation: Generation,
    },
    LoadFailed {
        generation: Generation,
        message: String,
    },
    QuestionReceived {
        generation: Generation,
        question: Option<QuizQuestion>,
    },
    FeedbackElapsed {
        generation: Generation,
    },
    Answer {
        says_yes: bool,
    },
    Retry,
    Restart,
    Quit,
}

/// A spawned task whose result is posted back to the queue.
///
/// Dropping or cancelling the handle aborts the task, so its event is never
/// delivered.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Posts work results and timers onto the session's event queue.
///
/// Must be used from within a tokio runtime.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<QuizEvent>,
}

impl Dispatcher {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<QuizEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Handle for the presentation adapter to forward user input.
    #[must_use]
    pub fn input(&self) -> QuizInput {
        QuizInput {
            tx: self.tx.clone(),
        }
    }

    /// Run `work` in the background and enqueue the event it resolves to.
    pub fn spawn<F>(&self, work: F) -> ScheduledTask
    where
        F: Future<Output = QuizEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let event = work.await;
            if tx.send(event).is_err() {
                tracing::debug!("quiz event queue closed before task result");
            }
        });
        ScheduledTask { handle }
    }

    /// Enqueue `event` once `delay` has elapsed.
    pub fn schedule_after(&self, delay: Duration, event: QuizEvent) -> ScheduledTask {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            event
        })
    }
}

/// User-input side of the event queue.
#[derive(Clone, Debug)]
pub struct QuizInput {
    tx: mpsc::UnboundedSender<QuizEvent>,
}

impl QuizInput {
    /// Returns `false` once the session loop has stopped.
    pub fn answer(&self, says_yes: bool) -> bool {
        self.send(QuizEvent::Answer { says_yes })
    }

    pub fn yes(&self) -> bool {
        self.answer(true)
    }

    pub fn no(&self) -> bool {
        self.answer(false)
    }

    pub fn retry(&self) -> bool {
        self.send(QuizEvent::Retry)
    }

    pub fn restart(&self) -> bool {
        self.send(QuizEvent::Restart)
    }

    pub fn quit(&self) -> bool {
        self.send(QuizEvent::Quit)
    }

    fn send(&self, event: QuizEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn scheduled_event_arrives_after_delay() {
        let (dispatcher, mut rx) = Dispatcher::channel();
        let start = tokio::time::Instant::now();
        let _task = dispatcher.schedule_after(
            Duration::from_secs(1),
            QuizEvent::FeedbackElapsed { generation: 3 },
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event, QuizEvent::FeedbackElapsed { generation: 3 });
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (dispatcher, mut rx) = Dispatcher::channel();
        let task = dispatcher.schedule_after(
            Duration::from_secs(1),
            QuizEvent::FeedbackElapsed { generation: 1 },
        );
        task.cancel();

        let input = dispatcher.input();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(input.quit());
        assert_eq!(rx.recv().await.unwrap(), QuizEvent::Quit);
    }
}
