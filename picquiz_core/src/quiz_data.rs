//! Quiz data normalization
//!
//! Turns CSV rows and JSON aggregate items into uniform [`QuizEntry`] values.
//! Question and answer cells hold numbered lines ("1. What is this?") that are
//! split and paired by position.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::csv_parser::parse_csv;
use crate::diagnostics::Diagnostic;
use crate::error::QuizResult;
use crate::headers::{CanonicalField, RawRecord};

/// Separator between numbered lines: an escaped `\n` sequence or a real newline
static LINE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\n|\n").expect("valid line separator pattern"));

/// `<integer>.<whitespace><text>`
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.+)$").expect("valid numbered line pattern"));

/// Single question about a pictured theme word
#[cfg_attr(feature = "python", pyo3::pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub answer: String,
    pub category: String,
    pub theme_word: String,
    /// 1-based position, only kept for JSON-sourced questions
    pub ordinal: Option<u32>,
}

impl Question {
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Normalized quiz entry: one picture and its questions
#[cfg_attr(feature = "python", pyo3::pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuizEntry {
    pub category: String,
    pub theme_word: String,
    pub image_path: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl QuizEntry {
    /// Whether the entry can take part in question selection
    pub fn is_playable(&self) -> bool {
        !self.questions.is_empty()
    }
}

/// Normalized entries plus everything that was dropped on the way
#[derive(Debug, Clone, Default)]
pub struct QuizData {
    pub entries: Vec<QuizEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Question as stored in the JSON aggregate file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonQuestion {
    pub question: String,
    pub answer: String,
    /// A positive integer or numeric string; anything else is ignored
    pub number: Option<serde_json::Value>,
}

/// Ordinal from a JSON `number` field, `None` unless it is a positive integer
fn json_ordinal(value: &serde_json::Value) -> Option<u32> {
    let ordinal: u32 = match value {
        serde_json::Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (ordinal > 0).then_some(ordinal)
}

/// One item of the JSON aggregate file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonQuizItem {
    pub category: String,
    pub theme_word: String,
    pub questions: Vec<JsonQuestion>,
    pub description: Option<String>,
    pub display_url: Option<String>,
    pub url: Option<String>,
    pub local_image_path: Option<String>,
}

/// Split a question or answer cell into its lines
pub fn split_lines(cell: &str) -> Vec<&str> {
    LINE_SEPARATOR.split(cell).collect()
}

/// Parse `"3. Some text"` into `(3, "Some text")`
pub fn parse_numbered_line(line: &str) -> Option<(u32, &str)> {
    let caps = NUMBERED_LINE.captures(line.trim())?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    Some((number, caps.get(2)?.as_str()))
}

/// Pick the image path: explicit URLs first, then the local path, then `<category>/<themeWord>.jpg`
pub fn resolve_image_path(
    display_url: Option<&str>,
    url: Option<&str>,
    local_path: Option<&str>,
    category: &str,
    theme_word: &str,
) -> String {
    let explicit = [display_url, url, local_path]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty());

    if let Some(path) = explicit {
        return path.to_string();
    }
    if !category.is_empty() && !theme_word.is_empty() {
        return format!("{}/{}.jpg", category, theme_word);
    }
    String::new()
}

/// Full image URL under `base` for a category/theme word pair
pub fn image_url(base: &str, category: &str, theme_word: &str) -> String {
    format!("{}/{}/{}.jpg", base.trim_end_matches('/'), category, theme_word.trim())
}

/// Normalize one CSV-origin record
pub fn entry_from_record(record: &RawRecord, diagnostics: &mut Vec<Diagnostic>) -> QuizEntry {
    let category = record.get(CanonicalField::Category).trim().to_string();
    let theme_word = record.get(CanonicalField::ThemeWord).trim().to_string();

    if category.is_empty() || theme_word.is_empty() {
        warn!("Invalid image path components: category='{}', themeWord='{}'", category, theme_word);
    }

    let question_lines = split_lines(record.get(CanonicalField::Question));
    let answer_lines = split_lines(record.get(CanonicalField::Answer));
    let mut questions = Vec::new();

    for (idx, question_line) in question_lines.iter().enumerate() {
        let question_line = question_line.trim();
        let answer_line = answer_lines.get(idx).map(|l| l.trim()).unwrap_or("");
        if question_line.is_empty() && answer_line.is_empty() {
            continue;
        }

        match (parse_numbered_line(question_line), parse_numbered_line(answer_line)) {
            (Some((_, text)), Some((_, answer))) => questions.push(Question {
                text: text.to_string(),
                answer: answer.to_string(),
                category: category.clone(),
                theme_word: theme_word.clone(),
                ordinal: None,
            }),
            _ => {
                debug!(
                    "Dropping line {} of '{}': {:?} / {:?}",
                    idx + 1,
                    theme_word,
                    question_line,
                    answer_line
                );
                diagnostics.push(Diagnostic::UnmatchedLine {
                    theme_word: theme_word.clone(),
                    line: idx + 1,
                });
            }
        }
    }

    let image_path = resolve_image_path(
        None,
        None,
        Some(record.get(CanonicalField::ImagePath)),
        &category,
        &theme_word,
    );

    QuizEntry {
        description: record.get(CanonicalField::Description).to_string(),
        category,
        theme_word,
        image_path,
        questions,
    }
}

/// Normalize one JSON-origin item, keeping ordinals as given
pub fn entry_from_json(item: &JsonQuizItem, diagnostics: &mut Vec<Diagnostic>) -> QuizEntry {
    let category = item.category.trim().to_string();
    let theme_word = item.theme_word.trim().to_string();
    let mut questions = Vec::with_capacity(item.questions.len());

    for (idx, q) in item.questions.iter().enumerate() {
        let question = Question {
            text: q.question.trim().to_string(),
            answer: q.answer.trim().to_string(),
            category: category.clone(),
            theme_word: theme_word.clone(),
            ordinal: q.number.as_ref().and_then(json_ordinal),
        };
        if question.is_valid() {
            questions.push(question);
        } else {
            diagnostics.push(Diagnostic::UnmatchedLine {
                theme_word: theme_word.clone(),
                line: idx + 1,
            });
        }
    }

    QuizEntry {
        image_path: resolve_image_path(
            item.display_url.as_deref(),
            item.url.as_deref(),
            item.local_image_path.as_deref(),
            &category,
            &theme_word,
        ),
        description: item.description.clone().unwrap_or_default(),
        category,
        theme_word,
        questions,
    }
}

/// Normalize parsed CSV records, one entry per record
pub fn normalize_records(records: &[RawRecord]) -> QuizData {
    let mut data = QuizData::default();
    for record in records {
        let entry = entry_from_record(record, &mut data.diagnostics);
        data.entries.push(entry);
    }
    data
}

/// Parse and normalize a whole CSV quiz sheet
pub fn parse_quiz_csv(text: &str) -> QuizData {
    let parsed = parse_csv(text);
    let mut data = normalize_records(&parsed.records);

    let mut diagnostics = parsed.diagnostics;
    diagnostics.append(&mut data.diagnostics);
    data.diagnostics = diagnostics;

    debug!("Processed {} quiz items", data.entries.len());
    data
}

/// Parse and normalize the JSON aggregate file
///
/// Only a body that is not a JSON array fails; items that do not fit the
/// schema are skipped with a diagnostic.
pub fn parse_quiz_json(text: &str) -> QuizResult<QuizData> {
    let items: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut data = QuizData::default();
    for (index, value) in items.into_iter().enumerate() {
        match serde_json::from_value::<JsonQuizItem>(value) {
            Ok(item) => {
                let entry = entry_from_json(&item, &mut data.diagnostics);
                data.entries.push(entry);
            }
            Err(e) => {
                warn!("Skipping JSON quiz item {}: {}", index, e);
                data.diagnostics.push(Diagnostic::InvalidItem { index, reason: e.to_string() });
            }
        }
    }
    Ok(data)
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
mod py {
    use super::*;
    use pyo3::prelude::*;

    #[pymethods]
    impl Question {
        fn __repr__(&self) -> String {
            format!("Question(theme='{}', text='{}')", self.theme_word, self.text)
        }
    }

    #[pymethods]
    impl QuizEntry {
        fn __repr__(&self) -> String {
            format!(
                "QuizEntry(category='{}', theme='{}', questions={})",
                self.category,
                self.theme_word,
                self.questions.len()
            )
        }
    }

    #[pyfunction]
    #[pyo3(name = "parse_quiz_csv")]
    pub fn py_parse_quiz_csv(text: &str) -> Vec<QuizEntry> {
        parse_quiz_csv(text).entries
    }

    #[pyfunction]
    #[pyo3(name = "image_url")]
    pub fn py_image_url(base: &str, category: &str, theme_word: &str) -> String {
        image_url(base, category, theme_word)
    }
}

#[cfg(feature = "python")]
pub use py::{py_image_url, py_parse_quiz_csv};
