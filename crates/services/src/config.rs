use std::time::Duration;

/// Round pacing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    questions_amount: u32,
    feedback_delay: Duration,
}

impl QuizConfig {
    pub const DEFAULT_QUESTIONS_AMOUNT: u32 = 10;
    pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_secs(1);

    #[must_use]
    pub fn new() -> Self {
        Self {
            questions_amount: Self::DEFAULT_QUESTIONS_AMOUNT,
            feedback_delay: Self::DEFAULT_FEEDBACK_DELAY,
        }
    }

    #[must_use]
    pub fn with_questions_amount(mut self, questions_amount: u32) -> Self {
        self.questions_amount = questions_amount;
        self
    }

    /// How long the answer highlight stays visible before the round moves on.
    #[must_use]
    pub fn with_feedback_delay(mut self, feedback_delay: Duration) -> Self {
        self.feedback_delay = feedback_delay;
        self
    }

    #[must_use]
    pub fn questions_amount(&self) -> u32 {
        self.questions_amount
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::new()
    }
}
