//! CSV export of the statistics table.

use std::path::Path;

use anyhow::{Context, Result};

use gradestat_core::report::Report;

/// Render the statistics table as CSV text.
pub fn generate_csv(report: &Report) -> Result<String> {
    let table = report.table();
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.header)?;
    for cells in &table.rows {
        writer.write_record(cells.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer.into_inner().context("failed to flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Write the statistics table to a CSV file, creating parent directories.
pub fn write_csv_report(report: &Report, path: &Path) -> Result<()> {
    let text = generate_csv(report)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradestat_core::engine::analyze;
    use gradestat_core::model::{ClassId, ScoreTable, StudentRecord, SubjectConfig, SubjectMap};

    #[test]
    fn csv_has_header_and_one_line_per_group() {
        let table = ScoreTable::new(vec![
            StudentRecord::new(ClassId::new("3"), SubjectMap::splat(85.0)),
            StudentRecord::new(ClassId::new("1"), SubjectMap::splat(55.0)),
        ]);
        let report = analyze(&table, &SubjectConfig::default()).unwrap();
        let text = generate_csv(&report).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Group,Students,Share of grade,Chinese average,"));
        assert!(lines[1].starts_with("Whole grade,2,—,70.00,50.00%,50.00%,0.00%"));
        assert!(lines[2].starts_with("1,1,50.0%,55.00,0.00%,0.00%,0.00%"));
        assert!(lines[2].ends_with(",55.00,0.00%,0.00%,0.00%"));
        assert!(lines[3].starts_with("3,1,50.0%,85.00,100.00%,100.00%,0.00%"));
    }

    #[test]
    fn empty_report_exports_grade_row_only() {
        let report = analyze(&ScoreTable::default(), &SubjectConfig::default()).unwrap();
        let text = generate_csv(&report).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Whole grade,0,—,0.00,0.00%"));
    }

    #[test]
    fn write_csv_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.csv");
        let report = analyze(&ScoreTable::default(), &SubjectConfig::default()).unwrap();
        write_csv_report(&report, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Group,"));
    }
}
