//! Header normalization for quiz CSV files
//!
//! Quiz sheets come with either localized (Chinese) or English column names.
//! The header row is translated once into a [`HeaderMap`], and every data row
//! is then read through it into a [`RawRecord`] keyed by [`CanonicalField`].

use std::collections::HashMap;
use std::fmt;

/// The six fields every quiz row is normalized onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Category,
    ThemeWord,
    ImagePath,
    Question,
    Answer,
    Description,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Category,
        CanonicalField::ThemeWord,
        CanonicalField::ImagePath,
        CanonicalField::Question,
        CanonicalField::Answer,
        CanonicalField::Description,
    ];

    /// Accepted header spellings, in lookup order
    pub fn spellings(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Category => &["类别", "Category"],
            CanonicalField::ThemeWord => &["提取名字", "ThemeWord"],
            CanonicalField::ImagePath => &["图片路径", "ImagePath"],
            CanonicalField::Question => &["问题", "Question"],
            CanonicalField::Answer => &["答案", "Answer"],
            CanonicalField::Description => &["信息提取2", "信息提取_2", "Description"],
        }
    }

    /// Canonical (localized) key name
    pub fn key(self) -> &'static str {
        self.spellings()[0]
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Column translation table built from a header row
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    headers: Vec<String>,
    columns: Vec<Option<CanonicalField>>,
    missing: Vec<CanonicalField>,
}

impl HeaderMap {
    /// Build the lookup from a parsed header row (names are trimmed)
    pub fn from_headers<S: AsRef<str>>(raw: &[S]) -> Self {
        let headers: Vec<String> = raw.iter().map(|h| h.as_ref().trim().to_string()).collect();
        let mut columns = vec![None; headers.len()];
        let mut missing = Vec::new();

        for field in CanonicalField::ALL {
            let column = field
                .spellings()
                .iter()
                .find_map(|spelling| headers.iter().position(|h| h == spelling));

            match column {
                Some(idx) => columns[idx] = Some(field),
                None => missing.push(field),
            }
        }

        Self { headers, columns, missing }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// True until a header row has been read
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Canonical fields with no accepted spelling in the header row
    pub fn missing(&self) -> &[CanonicalField] {
        &self.missing
    }

    /// Canonical field a column maps to, if any
    pub fn field_at(&self, column: usize) -> Option<CanonicalField> {
        self.columns.get(column).copied().flatten()
    }

    /// Translate one data row; the caller guarantees the field count matches
    pub fn record<S: AsRef<str>>(&self, row: &[S]) -> RawRecord {
        let mut record = RawRecord::default();
        for (idx, header) in self.headers.iter().enumerate() {
            let value = row.get(idx).map(|v| v.as_ref().to_string()).unwrap_or_default();
            if let Some(field) = self.field_at(idx) {
                record.fields.insert(field, value.clone());
            }
            record.columns.insert(header.clone(), value);
        }
        record
    }
}

/// One data row, readable by canonical field or by its original header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<CanonicalField, String>,
    columns: HashMap<String, String>,
}

impl RawRecord {
    /// Value for a canonical field, empty when the column was missing
    pub fn get(&self, field: CanonicalField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Value under the header name exactly as it appeared in the file
    pub fn column(&self, header: &str) -> Option<&str> {
        self.columns.get(header).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_headers_map_all_fields() {
        let map =
            HeaderMap::from_headers(&["类别", "提取名字", "图片路径", "问题", "答案", "信息提取2"]);
        assert!(map.missing().is_empty());
        assert_eq!(map.field_at(0), Some(CanonicalField::Category));
        assert_eq!(map.field_at(5), Some(CanonicalField::Description));
    }

    #[test]
    fn test_english_headers_map_all_fields() {
        let map = HeaderMap::from_headers(&[
            "Category", "ThemeWord", "ImagePath", "Question", "Answer", "Description",
        ]);
        assert!(map.missing().is_empty());
        assert_eq!(map.field_at(3), Some(CanonicalField::Question));
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let map = HeaderMap::from_headers(&[" Category ", "Question", "Answer", "Notes"]);
        assert_eq!(
            map.missing(),
            &[CanonicalField::ThemeWord, CanonicalField::ImagePath, CanonicalField::Description]
        );
        assert_eq!(map.field_at(3), None);
        assert_eq!(map.headers()[0], "Category");
    }

    #[test]
    fn test_record_keeps_original_and_canonical_keys() {
        let map = HeaderMap::from_headers(&["Category", "信息提取_2", "Extra"]);
        let record = map.record(&["Animals", "Furry", "x"]);

        assert_eq!(record.get(CanonicalField::Category), "Animals");
        assert_eq!(record.get(CanonicalField::Description), "Furry");
        assert_eq!(record.get(CanonicalField::ThemeWord), "");
        assert_eq!(record.column("Category"), Some("Animals"));
        assert_eq!(record.column("信息提取_2"), Some("Furry"));
        assert_eq!(record.column("Extra"), Some("x"));
    }

    #[test]
    fn test_blank_header_row_still_counts_as_read() {
        assert!(HeaderMap::default().is_empty());
        let map = HeaderMap::from_headers(&[""]);
        assert!(!map.is_empty());
        assert_eq!(map.len(), 1);
    }
}
