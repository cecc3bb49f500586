//! Named column layout of a score sheet.
//!
//! Score sheets address their columns by spreadsheet letter. The layout is
//! parsed into zero-based indices once, when the schema is built, so the
//! loader never handles letters.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{Subject, SubjectMap};

/// Header/metadata rows above the first student row.
pub const DEFAULT_HEADER_ROWS: usize = 4;

/// Where the class label and each subject score live in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub class_column: usize,
    pub subject_columns: SubjectMap<usize>,
    pub header_rows: usize,
}

impl Default for ColumnSchema {
    // B, then H K N Q T.
    fn default() -> Self {
        Self {
            class_column: 1,
            subject_columns: SubjectMap::from_fn(|s| match s {
                Subject::Chinese => 7,
                Subject::Math => 10,
                Subject::English => 13,
                Subject::Science => 16,
                Subject::Politics => 19,
            }),
            header_rows: DEFAULT_HEADER_ROWS,
        }
    }
}

impl ColumnSchema {
    /// Parse a letter-based layout.
    pub fn from_layout(layout: &ColumnLayout) -> Result<Self, ValidationError> {
        let class_column = column_index(&layout.class)?;
        let mut subject_columns = SubjectMap::default();
        for subject in Subject::ALL {
            subject_columns[subject] = column_index(layout.subject(subject))?;
        }
        Ok(Self {
            class_column,
            subject_columns,
            header_rows: layout.header_rows,
        })
    }

    /// Every required column as `(index, description)`, class first.
    pub fn required_columns(&self) -> Vec<(usize, String)> {
        let mut columns = vec![(
            self.class_column,
            format!("{} (class)", column_letter(self.class_column)),
        )];
        for (subject, &index) in self.subject_columns.iter() {
            columns.push((index, format!("{} ({subject})", column_letter(index))));
        }
        columns
    }
}

/// Letter-based column layout as written in `gradestat.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    #[serde(default = "default_class")]
    pub class: String,
    #[serde(default = "default_chinese")]
    pub chinese: String,
    #[serde(default = "default_math")]
    pub math: String,
    #[serde(default = "default_english")]
    pub english: String,
    #[serde(default = "default_science")]
    pub science: String,
    #[serde(default = "default_politics")]
    pub politics: String,
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
}

impl ColumnLayout {
    pub fn subject(&self, subject: Subject) -> &str {
        match subject {
            Subject::Chinese => &self.chinese,
            Subject::Math => &self.math,
            Subject::English => &self.english,
            Subject::Science => &self.science,
            Subject::Politics => &self.politics,
        }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            class: default_class(),
            chinese: default_chinese(),
            math: default_math(),
            english: default_english(),
            science: default_science(),
            politics: default_politics(),
            header_rows: default_header_rows(),
        }
    }
}

fn default_class() -> String {
    "B".to_string()
}
fn default_chinese() -> String {
    "H".to_string()
}
fn default_math() -> String {
    "K".to_string()
}
fn default_english() -> String {
    "N".to_string()
}
fn default_science() -> String {
    "Q".to_string()
}
fn default_politics() -> String {
    "T".to_string()
}
fn default_header_rows() -> usize {
    DEFAULT_HEADER_ROWS
}

/// Convert a column letter reference (`A`, `h`, `AA`) to a zero-based index.
pub fn column_index(letters: &str) -> Result<usize, ValidationError> {
    let trimmed = letters.trim();
    if trimmed.is_empty() || trimmed.len() > 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidColumn(letters.to_string()));
    }
    let index = trimmed
        .to_ascii_uppercase()
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize);
    Ok(index - 1)
}

/// Convert a zero-based column index to its letter reference (0 = A, 26 = AA).
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
