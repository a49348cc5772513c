//! Non-fatal findings collected while ingesting quiz data

use std::fmt;

use crate::headers::CanonicalField;

/// A problem that was skipped over rather than raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Data row whose field count differs from the header row (row 0 is the header)
    MalformedRow { row: usize, found: usize, expected: usize },
    /// No accepted spelling of a canonical field in the header row
    MissingHeader(CanonicalField),
    /// Question/answer line pair dropped from an entry
    UnmatchedLine { theme_word: String, line: usize },
    /// JSON aggregate item that does not fit the item schema
    InvalidItem { index: usize, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRow { row, found, expected } => {
                write!(f, "row {} has {} fields, expected {}", row, found, expected)
            }
            Diagnostic::MissingHeader(field) => write!(f, "missing required column '{}'", field),
            Diagnostic::UnmatchedLine { theme_word, line } => {
                write!(f, "'{}': question/answer line {} dropped", theme_word, line)
            }
            Diagnostic::InvalidItem { index, reason } => {
                write!(f, "JSON item {} skipped: {}", index, reason)
            }
        }
    }
}
