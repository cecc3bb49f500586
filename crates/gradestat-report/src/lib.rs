//! gradestat-report — Spreadsheet export of analysis reports.
//!
//! Writers here only format a finished [`gradestat_core::Report`]; they never
//! recompute statistics.

pub mod csv;
pub mod xlsx;

use chrono::{DateTime, Local};

/// Download/file name for a report generated at `at`, e.g.
/// `grade-report_20250630_140509.xlsx`.
pub fn report_file_name(at: DateTime<Local>, extension: &str) -> String {
    format!("grade-report_{}.{extension}", at.format("%Y%m%d_%H%M%S"))
}
