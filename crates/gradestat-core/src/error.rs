//! Error types for loading, validating, and analyzing score tables.
//!
//! Every failure of an analysis is reported through one of three kinds so
//! that front ends can classify it without string matching: the input could
//! not be loaded, the configuration was rejected, or aggregation produced an
//! unusable figure.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Subject;

/// The score file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not a supported spreadsheet or CSV format.
    #[error("unsupported file format: {0} (expected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv)")]
    UnsupportedFormat(String),

    /// The spreadsheet reader rejected the workbook.
    #[error("failed to open workbook: {0}")]
    Workbook(String),

    /// The workbook has no worksheet to read.
    #[error("workbook contains no worksheets")]
    NoWorksheet,

    /// The CSV reader rejected the file.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns lie outside the table.
    #[error("missing required columns: {}; check the spreadsheet layout", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// No student rows remain after skipping the header rows.
    #[error("the file contains no student score rows")]
    NoRows,
}

impl LoadError {
    /// Returns `true` if the error was caused by the uploaded content rather
    /// than by the environment (disk, permissions).
    pub fn is_user_input(&self) -> bool {
        !matches!(self, LoadError::Io { .. })
    }
}

/// A configuration value was rejected before any aggregation ran.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A subject's maximum score is zero, negative, or not finite.
    #[error("{subject} maximum score must be a positive finite number (got {value})")]
    NonPositiveMaxScore { subject: Subject, value: f64 },

    /// A subject's maximum score could not be parsed as a number.
    #[error("{subject} maximum score is not a number: '{raw}'")]
    InvalidMaxScore { subject: Subject, raw: String },

    /// A column reference is not a spreadsheet column letter.
    #[error("invalid column reference '{0}' (expected letters such as B or AA)")]
    InvalidColumn(String),
}

/// Aggregation produced a figure that cannot be reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    /// An average or rate overflowed or became NaN.
    #[error("{subject} statistic for {group} is not a finite number")]
    NonFiniteStatistic { group: String, subject: Subject },
}

/// Any failure of a complete load-and-analyze run.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("analysis failed: {0}")]
    Compute(#[from] ComputeError),
}
