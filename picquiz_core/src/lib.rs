//! Picture Quiz Core - quiz data ingestion, answer scoring and speech orchestration
//!
//! Loads themed picture quizzes from CSV sheets or a JSON aggregate, picks
//! questions, scores free-text answers, tracks progress, and drives the host's
//! speech synthesis and recognition.

pub mod categories;
pub mod config;
pub mod csv_parser;
pub mod diagnostics;
pub mod error;
pub mod headers;
pub mod loader;
pub mod progress;
pub mod questions;
pub mod quiz_data;
pub mod scoring;
pub mod session;
pub mod speech;

pub use categories::{find_category, Category, CATEGORIES};
pub use config::{QuizConfig, SpeechConfig};
pub use csv_parser::{parse_csv, ParsedCsv};
pub use diagnostics::Diagnostic;
pub use error::{QuizError, QuizResult, SpeechError};
pub use headers::{CanonicalField, HeaderMap, RawRecord};
pub use loader::{Fetcher, FsFetcher, HttpFetcher, JsonCache, QuizDataLoader};
pub use progress::{AttemptContext, AttemptStats, ProgressStore, WeakQuestion};
pub use questions::{select_random_questions, select_with_rng, Selection, DEFAULT_QUESTION_COUNT};
pub use quiz_data::{image_url, parse_quiz_csv, parse_quiz_json, Question, QuizData, QuizEntry};
pub use scoring::{grade_answer, score_answer, AnswerGrade};
pub use session::{QuizMode, QuizSession, UserAnswerRecord};

/// Picture Quiz Python Module
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn picquiz_core(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::prelude::*;

    // Parsing
    m.add_function(wrap_pyfunction!(quiz_data::py_parse_quiz_csv, m)?)?;
    m.add_function(wrap_pyfunction!(quiz_data::py_image_url, m)?)?;

    // Selection and scoring
    m.add_function(wrap_pyfunction!(questions::py_select_random_questions, m)?)?;
    m.add_function(wrap_pyfunction!(scoring::py_score_answer, m)?)?;

    // Register classes
    m.add_class::<quiz_data::Question>()?;
    m.add_class::<quiz_data::QuizEntry>()?;
    m.add_class::<questions::Selection>()?;

    Ok(())
}
