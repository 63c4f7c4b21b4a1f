use std::io::Write;

use services::QuizInput;
use services::quiz::{ImageFormat, QuizResultView, QuizStepView, QuizView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Terminal presentation adapter.
pub struct ConsoleView;

impl ConsoleView {
    fn prompt(text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

impl QuizView for ConsoleView {
    fn show_question(&self, step: &QuizStepView) {
        println!();
        println!("Question {}", step.question_number);
        match step.image.format() {
            Some(format) => println!(
                "[poster: {}, {} KB]",
                format_name(format),
                step.image.bytes().len() / 1024
            ),
            None => println!("[no poster]"),
        }
        println!("{}", step.question);
        Self::prompt("Answer [y]es / [n]o: ");
    }

    fn show_result(&self, result: &QuizResultView) {
        println!();
        println!("{}", result.title);
        println!("{}", result.text);
        Self::prompt(&format!("[p] {}  [q] Quit: ", result.button_text));
    }

    fn highlight_answer(&self, is_correct: bool) {
        println!("{}", if is_correct { "Correct!" } else { "Wrong!" });
    }

    fn show_loading(&self) {
        println!("Loading...");
    }

    fn hide_loading(&self) {}

    fn show_error(&self, message: &str) {
        println!();
        println!("Error");
        println!("{message}");
        Self::prompt("[r] Try again  [q] Quit: ");
    }
}

fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WebP",
    }
}

/// Forward stdin lines to the session until it stops or input ends.
pub fn spawn_stdin_reader(input: QuizInput) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    input.quit();
                    return;
                }
                Err(err) => {
                    tracing::warn!(%err, "failed to read stdin");
                    input.quit();
                    return;
                }
            };

            let delivered = match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => input.yes(),
                "n" | "no" => input.no(),
                "r" | "retry" => input.retry(),
                "p" | "play" => input.restart(),
                "q" | "quit" => input.quit(),
                "" => true,
                other => {
                    tracing::debug!(input = other, "unrecognised command");
                    true
                }
            };
            if !delivered {
                return;
            }
        }
    })
}
