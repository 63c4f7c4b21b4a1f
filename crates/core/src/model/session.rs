use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("a round needs at least one question")]
    ZeroQuestions,

    #[error("round already complete ({amount} questions answered)")]
    RoundComplete { amount: u32 },
}

/// What happened when a question was advanced past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub is_round_complete: bool,
}

/// Counters for one round.
///
/// Invariant: `correct_count <= current_index <= questions_amount`. Both
/// counters move together in [`SessionState::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    current_index: u32,
    correct_count: u32,
    questions_amount: u32,
}

impl SessionState {
    /// # Errors
    ///
    /// Returns `SessionStateError::ZeroQuestions` if `questions_amount` is zero.
    pub fn new(questions_amount: u32) -> Result<Self, SessionStateError> {
        if questions_amount == 0 {
            return Err(SessionStateError::ZeroQuestions);
        }
        Ok(Self {
            current_index: 0,
            correct_count: 0,
            questions_amount,
        })
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.correct_count = 0;
    }

    /// Move past the current question, counting it as correct or not.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::RoundComplete` once every question has
    /// been answered.
    pub fn advance(&mut self, is_correct: bool) -> Result<AnswerOutcome, SessionStateError> {
        if self.is_round_complete() {
            return Err(SessionStateError::RoundComplete {
                amount: self.questions_amount,
            });
        }
        self.current_index += 1;
        if is_correct {
            self.correct_count += 1;
        }
        Ok(AnswerOutcome {
            is_correct,
            is_round_complete: self.is_round_complete(),
        })
    }

    #[must_use]
    pub fn is_round_complete(&self) -> bool {
        self.current_index == self.questions_amount
    }

    /// Human-facing position of the question about to be shown, e.g. `3/10`.
    #[must_use]
    pub fn question_number(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.questions_amount)
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn questions_amount(&self) -> u32 {
        self.questions_amount
    }
}
