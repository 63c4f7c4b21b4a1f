mod dispatch;
mod presenter;
mod result;
mod session;
mod view;

pub use dispatch::{Dispatcher, Generation, QuizEvent, QuizInput, ScheduledTask};
pub use presenter::{QuizPhase, QuizPresenter};
pub use result::results_message;
pub use session::QuizSession;
pub use view::{ImageFormat, PosterImage, QuizResultView, QuizStepView, QuizView};
