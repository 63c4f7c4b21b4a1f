mod game;
mod movie;
mod question;
mod session;
mod statistics;

pub use game::{GameRecord, GameRecordError};
pub use movie::Movie;
pub use question::QuizQuestion;
pub use session::{AnswerOutcome, SessionState, SessionStateError};
pub use statistics::Statistics;
