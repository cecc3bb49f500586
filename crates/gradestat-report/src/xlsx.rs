//! Excel workbook generator.
//!
//! The workbook has two sheets: "Statistics" (one row per group) and
//! "Analysis config" (timestamp, rules, max scores).

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use gradestat_core::report::{Report, ReportCell};

/// Name of the statistics sheet.
pub const STATISTICS_SHEET: &str = "Statistics";

/// Name of the metadata sheet.
pub const CONFIG_SHEET: &str = "Analysis config";

/// MIME type of the generated workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Render the report as an in-memory `.xlsx` file.
pub fn generate_xlsx(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(report)?;
    workbook
        .save_to_buffer()
        .context("failed to serialize workbook")
}

/// Write the report to an `.xlsx` file, creating parent directories.
pub fn write_xlsx_report(report: &Report, path: &Path) -> Result<()> {
    let bytes = generate_xlsx(report)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write workbook to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote xlsx report");
    Ok(())
}

fn build_workbook(report: &Report) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(STATISTICS_SHEET)?;
    write_statistics(sheet, report, &bold)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(CONFIG_SHEET)?;
    write_metadata(sheet, report, &bold)?;

    Ok(workbook)
}

fn write_statistics(sheet: &mut Worksheet, report: &Report, bold: &Format) -> Result<()> {
    let table = report.table();
    for (col, title) in table.header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, bold)?;
    }
    for (i, cells) in table.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                ReportCell::Text(text) => {
                    sheet.write_string(row, col, text)?;
                }
                ReportCell::Count(n) => {
                    sheet.write_number(row, col, *n as f64)?;
                }
                ReportCell::Number(v) => {
                    sheet.write_number(row, col, *v)?;
                }
            }
        }
    }
    sheet.set_column_width(0, 14)?;
    Ok(())
}

fn write_metadata(sheet: &mut Worksheet, report: &Report, bold: &Format) -> Result<()> {
    for (i, (key, value)) in report.metadata().iter().enumerate() {
        let row = i as u32;
        if !key.is_empty() {
            sheet.write_string_with_format(row, 0, key, bold)?;
        }
        if !value.is_empty() {
            sheet.write_string(row, 1, value)?;
        }
    }
    sheet.set_column_width(0, 24)?;
    Ok(())
}
