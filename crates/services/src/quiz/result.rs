use quiz_core::model::Statistics;

use super::view::QuizResultView;

const RESULT_TITLE: &str = "This round is over!";
const RESULT_BUTTON: &str = "Play again";
const RECORD_DATE_FORMAT: &str = "%d.%m.%y %H:%M";

/// Four-line round summary: this game, games played, record, accuracy.
#[must_use]
pub fn results_message(correct: u32, amount: u32, statistics: &Statistics) -> String {
    let record = statistics.best_game().map_or_else(
        || "Record: -".to_string(),
        |best| {
            format!(
                "Record: {}/{} ({})",
                best.correct(),
                best.total(),
                best.date().format(RECORD_DATE_FORMAT)
            )
        },
    );

    [
        format!("Your result: {correct}/{amount}"),
        format!("Quizzes played: {}", statistics.games_count()),
        record,
        format!("Average accuracy: {:.2}%", statistics.total_accuracy()),
    ]
    .join("\n")
}

impl QuizResultView {
    #[must_use]
    pub fn round_over(correct: u32, amount: u32, statistics: &Statistics) -> Self {
        Self {
            title: RESULT_TITLE.to_string(),
            text: results_message(correct, amount, statistics),
            button_text: RESULT_BUTTON.to_string(),
        }
    }
}
