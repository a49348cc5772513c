//! picquiz - text-mode picture quiz
//!
//! Inspects quiz sheets, runs a quiz over stdin and reports stored progress.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use picquiz_core::{
    find_category, grade_answer, image_url, parse_quiz_csv, select_random_questions,
    AttemptContext, FsFetcher, ProgressStore, QuizConfig, QuizDataLoader, QuizEntry, QuizMode,
    QuizSession,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a quiz CSV sheet and print its entries and problems
    Inspect {
        csv: PathBuf,
    },
    /// Ask questions on stdin and score the typed answers
    Quiz {
        /// Root that the configured CSV and JSON paths are resolved against
        #[arg(long)]
        data_dir: PathBuf,

        /// Category ids to draw questions from
        #[arg(long = "category", required = true)]
        categories: Vec<String>,

        /// Questions per round (defaults to the configured count)
        #[arg(long)]
        count: Option<usize>,

        /// Read entries from the JSON aggregate instead of the CSV sheets
        #[arg(long)]
        json: bool,

        /// Quiz mode: learn, train or compete
        #[arg(long, default_value = "train")]
        mode: QuizMode,

        /// Store answers in this progress database
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print statistics from a progress database
    Stats {
        #[arg(long)]
        db: PathBuf,

        /// Number of weakest questions to list
        #[arg(long, default_value_t = 5)]
        weakest: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => QuizConfig::load(path),
        None => QuizConfig::default(),
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match args.command {
        Command::Inspect { csv } => inspect(&csv),
        Command::Quiz { data_dir, categories, count, json, mode, db } => {
            let count = count.unwrap_or(config.questions_per_quiz);
            run_quiz(&config, &data_dir, &categories, count, json, mode, db.as_deref()).await
        }
        Command::Stats { db, weakest } => stats(&config, &db, weakest),
    }
}

fn inspect(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let data = parse_quiz_csv(&text);

    for entry in &data.entries {
        println!("[{}] {} ({})", entry.category, entry.theme_word, entry.image_path);
        for question in &entry.questions {
            println!("    Q: {}", question.text);
            println!("    A: {}", question.answer);
        }
    }
    for diagnostic in &data.diagnostics {
        println!("warning: {}", diagnostic);
    }

    println!(
        "{} entries, {} questions, {} warnings",
        data.entries.len(),
        data.entries.iter().map(|e| e.questions.len()).sum::<usize>(),
        data.diagnostics.len()
    );
    Ok(())
}

async fn load_entries(
    loader: &QuizDataLoader<FsFetcher>,
    categories: &[String],
    json: bool,
) -> Vec<QuizEntry> {
    let mut entries = Vec::new();
    for id in categories {
        if find_category(id).is_none() {
            warn!("Unknown category '{}'", id);
        }
        let loaded = if json {
            loader.load_json_for_category(id).await
        } else {
            loader.load_csv(id).await
        };
        entries.extend(loaded);
    }
    entries.retain(QuizEntry::is_playable);
    entries
}

async fn run_quiz(
    config: &QuizConfig,
    data_dir: &Path,
    categories: &[String],
    count: usize,
    json: bool,
    mode: QuizMode,
    db: Option<&Path>,
) -> Result<()> {
    let store = db
        .map(|path| {
            ProgressStore::open(path).with_context(|| format!("opening {}", path.display()))
        })
        .transpose()?;

    let loader = QuizDataLoader::new(FsFetcher::new(data_dir), config);
    let entries = load_entries(&loader, categories, json).await;
    if entries.is_empty() {
        bail!("no playable quiz entries for {}", categories.join(", "));
    }
    info!("Loaded {} playable entries", entries.len());

    let mut session = QuizSession::new(mode);
    session.set_categories(categories.to_vec());
    session.set_quiz_images(entries.iter().map(|e| e.image_path.clone()).collect());
    session.start_round(select_random_questions(&entries, count));

    let category = session.questions().first().map(|q| q.category.clone()).unwrap_or_default();
    let context = AttemptContext { category, theme_word: session.theme_word().to_string(), mode };

    let picture = image_url(&config.image_base_path, &context.category, session.theme_word());
    println!("Picture: {}", picture);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(question) = session.current_question().cloned() else {
            break;
        };
        println!("\n{}. {}", session.current_index() + 1, question.text);
        if session.mode() == QuizMode::Learn {
            println!("   (answer: {})", question.answer);
        }

        let answer = lines.next_line().await.context("reading answer")?.unwrap_or_default();
        let grade = grade_answer(&answer, &question.answer, config.pass_threshold);
        println!("{}", grade.feedback);

        if let Some(record) = session.add_user_answer(answer.trim(), grade.score) {
            if let Some(store) = &store {
                store.save_answer(record, &context).context("saving answer")?;
            }
        }
        debug!("Progress {:.0}%", session.progress());

        if !session.next_question() {
            break;
        }
    }

    println!("\nScore: {}%", session.score());
    Ok(())
}

fn stats(config: &QuizConfig, db: &Path, weakest: usize) -> Result<()> {
    let store = ProgressStore::open(db).with_context(|| format!("opening {}", db.display()))?;
    let stats = store.stats(config.pass_threshold)?;

    println!("Attempts: {}", stats.total_attempts);
    println!("Passed:   {}", stats.passed_count);
    println!("Failed:   {}", stats.failed_count);
    println!("Average:  {:.2}", stats.average_score);
    println!("Accuracy: {:.1}%", stats.accuracy_percent);

    let weak = store.weakest_questions(weakest)?;
    if !weak.is_empty() {
        println!("\nNeeds practice:");
        for q in weak {
            println!(
                "  {} -> {} ({} attempts, avg {:.2})",
                q.question, q.correct_answer, q.attempts, q.average_score
            );
        }
    }
    Ok(())
}
