/// A single yes/no question about a movie poster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    image: Vec<u8>,
    text: String,
    correct_answer: bool,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(image: Vec<u8>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            text: text.into(),
            correct_answer,
        }
    }

    /// Raw poster bytes as delivered by the question source.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    /// Whether a yes/no answer matches the expected one.
    #[must_use]
    pub fn is_correct(&self, says_yes: bool) -> bool {
        says_yes == self.correct_answer
    }
}
