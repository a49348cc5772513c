//! CSV parsing for quiz sheets
//!
//! The first row is always the header row. Rows whose field count does not
//! match it (blank lines included) are skipped with a diagnostic instead of
//! failing the whole file.

use tracing::{debug, warn};

use crate::diagnostics::Diagnostic;
use crate::headers::{HeaderMap, RawRecord};

/// Output of [`parse_csv`]
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub headers: HeaderMap,
    pub records: Vec<RawRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Split CSV text into rows of raw fields
///
/// Any unescaped quote toggles quoting, wherever it sits in a field, and a
/// doubled quote inside quotes is a literal quote. Outside quotes `,` ends a
/// field and `\n` or `\r\n` ends a row; a lone `\r` is field content. A last
/// row without a trailing newline is kept if it has any content.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {
                chars.next();
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Parse raw CSV text into header-normalized records
pub fn parse_csv(text: &str) -> ParsedCsv {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parsed = ParsedCsv::default();

    for (row, fields) in tokenize(text).into_iter().enumerate() {
        if parsed.headers.is_empty() {
            parsed.headers = HeaderMap::from_headers(&fields);
            for field in parsed.headers.missing() {
                warn!(
                    "CSV is missing required column '{}' (headers: {:?})",
                    field,
                    parsed.headers.headers()
                );
                parsed.diagnostics.push(Diagnostic::MissingHeader(*field));
            }
            continue;
        }

        let expected = parsed.headers.len();
        if fields.len() != expected {
            warn!("Row {} has {} fields, expected {}", row, fields.len(), expected);
            parsed.diagnostics.push(Diagnostic::MalformedRow {
                row,
                found: fields.len(),
                expected,
            });
            continue;
        }

        parsed.records.push(parsed.headers.record(&fields));
    }

    debug!("Parsed {} rows from CSV", parsed.records.len());
    parsed
}
