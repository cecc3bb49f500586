//! The analysis report and its tabular and narrative renderings.
//!
//! A [`Report`] is built once per analysis. The spreadsheet table, the
//! metadata table, and the narrative text are all rendered from the same
//! [`CohortStats`] rows, so their figures always agree.

use std::fmt::{self, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::{Subject, SubjectConfig};
use crate::statistics::{CohortStats, SubjectStats};

/// One-line statement of the statistical rules, echoed in every export.
pub const STATISTICAL_RULES: &str = "1. Averages use the top 95% of scores in each class/grade; \
     2. Excellent: score >= 80% of the subject maximum; \
     3. Pass: score >= 60% of the subject maximum; \
     4. Fail: score < 40% of the subject maximum";

/// Placeholder in the share column of the grade row.
pub const NO_SHARE: &str = "—";

const RULE: &str =
    "================================================================================";

/// A complete analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// When the analysis ran (local time).
    pub generated_at: DateTime<Local>,
    /// Maximum scores the analysis used.
    pub config: SubjectConfig,
    /// Grade row first, then one row per class in ascending label order.
    pub rows: Vec<CohortStats>,
    /// Human-readable summary of `rows`.
    pub narrative: String,
}

impl Report {
    pub(crate) fn assemble(
        generated_at: DateTime<Local>,
        config: SubjectConfig,
        grade: CohortStats,
        classes: Vec<CohortStats>,
    ) -> Self {
        let narrative = render_narrative(&grade, &classes);
        let mut rows = Vec::with_capacity(classes.len() + 1);
        rows.push(grade);
        rows.extend(classes);
        Self {
            generated_at,
            config,
            rows,
            narrative,
        }
    }

    /// The grade-level row.
    pub fn grade(&self) -> &CohortStats {
        &self.rows[0]
    }

    /// Per-class rows in ascending class order.
    pub fn classes(&self) -> &[CohortStats] {
        &self.rows[1..]
    }

    /// Statistics table: header plus one row per group.
    pub fn table(&self) -> ReportTable {
        let mut header = vec![
            "Group".to_string(),
            "Students".to_string(),
            "Share of grade".to_string(),
        ];
        for subject in Subject::ALL {
            header.push(format!("{subject} average"));
            header.push(format!("{subject} excellent rate"));
            header.push(format!("{subject} pass rate"));
            header.push(format!("{subject} fail rate"));
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    ReportCell::Text(row.label().to_string()),
                    ReportCell::Count(row.student_count),
                    ReportCell::Text(format_share(row.share)),
                ];
                for (_, stats) in row.subjects.iter() {
                    cells.push(ReportCell::Number(round2(stats.trimmed_average)));
                    cells.push(ReportCell::Text(format_rate(stats.excellent.rate)));
                    cells.push(ReportCell::Text(format_rate(stats.pass.rate)));
                    cells.push(ReportCell::Text(format_rate(stats.fail.rate)));
                }
                cells
            })
            .collect();

        ReportTable { header, rows }
    }

    /// Metadata table: timestamp, rules, and the maximum scores used.
    pub fn metadata(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("Analysis configuration".to_string(), String::new()),
            (
                "Analysis time".to_string(),
                self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            ("Statistical rules".to_string(), STATISTICAL_RULES.to_string()),
            (String::new(), String::new()),
            ("Max scores".to_string(), String::new()),
        ];
        rows.extend(
            self.config
                .iter()
                .map(|(subject, max)| (subject.to_string(), format!("{max} points"))),
        );
        rows
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}

/// A single cell of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportCell {
    Text(String),
    Count(usize),
    Number(f64),
}

impl fmt::Display for ReportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCell::Text(s) => f.write_str(s),
            ReportCell::Count(n) => write!(f, "{n}"),
            ReportCell::Number(v) => write!(f, "{v:.2}"),
        }
    }
}

/// Row-oriented statistics table ready for spreadsheet export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

/// Two-decimal percentage with a `%` suffix.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}

/// One-decimal class share, or the grade-row placeholder.
pub fn format_share(share: Option<f64>) -> String {
    match share {
        Some(share) => format!("{share:.1}%"),
        None => NO_SHARE.to_string(),
    }
}

/// Round to the two decimals shown in the narrative, so exported numbers
/// match the text exactly.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

fn render_narrative(grade: &CohortStats, classes: &[CohortStats]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "                    Grade-level statistics");
    let _ = writeln!(out, "{RULE}");
    for (subject, stats) in grade.subjects.iter() {
        write_grade_subject(&mut out, subject, stats);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "                    Per-class statistics");
    let _ = writeln!(out, "{RULE}");

    if grade.student_count == 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "No student data available for analysis.");
        return out;
    }

    for class in classes {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "[Class {}] ({} students, {} of grade)",
            class.label(),
            class.student_count,
            format_share(class.share)
        );
        for (subject, stats) in class.subjects.iter() {
            let _ = writeln!(out, "  {subject}:");
            let _ = writeln!(out, "    Class average: {:.2}", stats.trimmed_average);
            let _ = writeln!(
                out,
                "    Excellent: {} ({}) | Pass: {} ({}) | Fail: {} ({})",
                stats.excellent.count,
                format_rate(stats.excellent.rate),
                stats.pass.count,
                format_rate(stats.pass.rate),
                stats.fail.count,
                format_rate(stats.fail.rate),
            );
        }
    }

    out
}

fn write_grade_subject(out: &mut String, subject: Subject, stats: &SubjectStats) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{subject}:");
    let _ = writeln!(
        out,
        "  Grade average (top {} students): {:.2}",
        stats.averaged_count, stats.trimmed_average
    );
    let _ = writeln!(
        out,
        "  Excellent: {} students | rate {}",
        stats.excellent.count,
        format_rate(stats.excellent.rate)
    );
    let _ = writeln!(
        out,
        "  Pass: {} students | rate {}",
        stats.pass.count,
        format_rate(stats.pass.rate)
    );
    let _ = writeln!(
        out,
        "  Fail: {} students | rate {}",
        stats.fail.count,
        format_rate(stats.fail.rate)
    );
}
