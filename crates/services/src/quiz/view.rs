/// Presentation adapter driven by the quiz presenter.
///
/// All calls happen on the event loop that owns the session, one at a time.
/// The presenter never stores the adapter; it is borrowed per event.
pub trait QuizView {
    fn show_question(&self, step: &QuizStepView);
    fn show_result(&self, result: &QuizResultView);
    fn highlight_answer(&self, is_correct: bool);
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, message: &str);

    /// Answer input is disabled from submission until the next question.
    fn set_answers_enabled(&self, _enabled: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageFormat {
    fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::WebP),
            _ => None,
        }
    }
}

/// Poster ready for display. Unrecognised data becomes an empty placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosterImage {
    format: Option<ImageFormat>,
    bytes: Vec<u8>,
}

impl PosterImage {
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        match ImageFormat::sniff(bytes) {
            Some(format) => Self {
                format: Some(format),
                bytes: bytes.to_vec(),
            },
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Everything needed to render one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStepView {
    pub image: PosterImage,
    pub question: String,
    pub question_number: String,
}

/// End-of-round alert contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultView {
    pub title: String,
    pub text: String,
    pub button_text: String,
}
