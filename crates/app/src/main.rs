use std::fmt;
use std::sync::Arc;

use services::questions::{
    HttpMoviesLoader, HttpPosterLoader, MoviesConfig, MoviesLoader, StaticMoviesLoader,
};
use services::{Clock, QuestionFactory, QuizConfig, QuizSession, StatisticsService};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod console;

use console::ConsoleView;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuestions { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  movie-quiz play  [--db <sqlite_url>] [--movies-url <url>] [--questions <n>]");
    eprintln!("                   [--offline]");
    eprintln!("  movie-quiz stats [--db <sqlite_url>] [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:movie-quiz.sqlite3");
    eprintln!("  --questions 10");
    eprintln!("  bundled movies unless a movies URL is configured");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MOVIE_QUIZ_DB_URL, MOVIE_QUIZ_MOVIES_URL, MOVIE_QUIZ_QUESTIONS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    movies: Option<MoviesConfig>,
    questions: u32,
    json: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("MOVIE_QUIZ_DB_URL").unwrap_or_else(|_| "movie-quiz.sqlite3".into()),
        );
        let mut movies = MoviesConfig::from_env();
        let mut questions = std::env::var("MOVIE_QUIZ_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(QuizConfig::DEFAULT_QUESTIONS_AMOUNT);
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--movies-url" => {
                    let movies_url = require_value(args, "--movies-url")?;
                    movies = Some(MoviesConfig { movies_url });
                }
                "--offline" => movies = None,
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    questions = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidQuestions { raw: value })?;
                }
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            movies,
            questions,
            json,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn play(args: &Args, storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let movies: Arc<dyn MoviesLoader> = match &args.movies {
        Some(config) => {
            tracing::info!(url = %config.movies_url, "using remote movie pool");
            Arc::new(HttpMoviesLoader::new(config.clone()))
        }
        None => Arc::new(StaticMoviesLoader::bundled()),
    };
    let factory = QuestionFactory::new(movies, Arc::new(HttpPosterLoader::new()));
    let statistics = StatisticsService::new(Clock::system(), Arc::clone(&storage.statistics));
    let config = QuizConfig::new().with_questions_amount(args.questions);

    let mut session = QuizSession::new(config, Arc::new(factory), statistics)?;
    let reader = console::spawn_stdin_reader(session.input());
    session.run(&ConsoleView).await;
    reader.abort();
    println!();
    Ok(())
}

async fn stats(args: &Args, storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let statistics = StatisticsService::new(Clock::system(), Arc::clone(&storage.statistics));
    let summary = statistics.statistics().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Quizzes played: {}", summary.games_count());
    match summary.best_game() {
        Some(best) => println!(
            "Record: {}/{} ({})",
            best.correct(),
            best.total(),
            best.date().format("%d.%m.%y %H:%M")
        ),
        None => println!("Record: -"),
    }
    println!("Average accuracy: {:.2}%", summary.total_accuracy());

    let recent = statistics.recent_games(5).await?;
    if !recent.is_empty() {
        println!("Recent games:");
        for row in recent {
            println!(
                "  {}/{}  {}",
                row.game.correct(),
                row.game.total(),
                row.game.date().format("%d.%m.%y %H:%M")
            );
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Play => play(&parsed, &storage).await,
        Command::Stats => stats(&parsed, &storage).await,
    }
}

fn main() {
    init_tracing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    let result = runtime.block_on(run());
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
