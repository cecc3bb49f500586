//! The `gradestat analyze` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gradestat_core::config::{load_config_from, GradestatConfig};
use gradestat_core::loader::load_path;
use gradestat_core::report::{format_rate, format_share, Report};
use gradestat_core::{analyze, Subject, SubjectConfig};
use gradestat_report::csv::write_csv_report;
use gradestat_report::report_file_name;
use gradestat_report::xlsx::write_xlsx_report;

use crate::MaxScoreArgs;

const FORMATS: [&str; 3] = ["xlsx", "csv", "json"];

pub fn execute(
    input: PathBuf,
    max_scores: MaxScoreArgs,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    let config = load_config_from(config_path.as_deref())?;
    let subjects = subject_config(&config, &max_scores)?;
    let schema = config.column_schema()?;

    let table = load_path(&input, &schema)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let report = analyze(&table, &subjects)?;

    println!("{}", report.narrative);
    print_summary(&report);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    for fmt in formats {
        let path = output.join(report_file_name(report.generated_at, fmt));
        write_report(&report, fmt, &path)?;
        eprintln!("{} report: {}", fmt.to_uppercase(), path.display());
    }

    Ok(())
}

/// Config-file max scores with command-line overrides applied.
fn subject_config(config: &GradestatConfig, args: &MaxScoreArgs) -> Result<SubjectConfig> {
    let mut max_scores = config.max_scores.clone();
    let overrides = [
        (Subject::Chinese, args.chinese),
        (Subject::Math, args.math),
        (Subject::English, args.english),
        (Subject::Science, args.science),
        (Subject::Politics, args.politics),
    ];
    for (subject, value) in overrides {
        if let Some(value) = value {
            max_scores.set(subject, value);
        }
    }
    Ok(max_scores.to_subject_config()?)
}

fn parse_formats(format: &str) -> Result<Vec<&'static str>> {
    if format.trim() == "all" {
        return Ok(FORMATS.to_vec());
    }
    let mut formats = Vec::new();
    for name in format.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let known = FORMATS
            .iter()
            .find(|f| f.eq_ignore_ascii_case(name))
            .with_context(|| format!("unknown output format '{name}' (expected xlsx, csv, json or all)"))?;
        if !formats.contains(known) {
            formats.push(*known);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "no output format given");
    Ok(formats)
}

fn write_report(report: &Report, format: &str, path: &Path) -> Result<()> {
    match format {
        "xlsx" => write_xlsx_report(report, path),
        "csv" => write_csv_report(report, path),
        _ => report.save_json(path),
    }
}

fn print_summary(report: &Report) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    let mut header = vec![
        "Group".to_string(),
        "Students".to_string(),
        "Share".to_string(),
    ];
    header.extend(Subject::ALL.iter().map(|s| format!("{s} avg / pass")));
    table.set_header(header);

    for row in &report.rows {
        let mut cells = vec![
            Cell::new(row.label()),
            Cell::new(row.student_count),
            Cell::new(format_share(row.share)),
        ];
        cells.extend(row.subjects.values().map(|stats| {
            Cell::new(format!(
                "{:.2} / {}",
                stats.trimmed_average,
                format_rate(stats.pass.rate)
            ))
        }));
        table.add_row(cells);
    }

    println!("{table}");
}
