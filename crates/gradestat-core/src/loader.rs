//! Score sheet loader.
//!
//! Reads the first worksheet of a spreadsheet (or a header-less CSV file)
//! into a [`RawTable`] addressed by absolute cell position, then applies a
//! [`ColumnSchema`] to produce the cleaned [`ScoreTable`].

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::LoadError;
use crate::model::{ClassId, ScoreTable, StudentRecord};
use crate::schema::ColumnSchema;

/// A single cell as read from the file, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Dates, durations, and error cells.
    Other,
}

static EMPTY_CELL: RawCell = RawCell::Empty;

impl RawCell {
    /// Blank cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric score for this cell. Anything that is not a finite number
    /// (blank, unparseable text, dates, error cells) scores 0.
    pub fn as_score(&self) -> f64 {
        let value = match self {
            RawCell::Number(n) => *n,
            RawCell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            RawCell::Bool(b) => f64::from(u8::from(*b)),
            RawCell::Empty | RawCell::Other => 0.0,
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// Class label for this cell, `None` when blank.
    pub fn as_label(&self) -> Option<ClassId> {
        match self {
            RawCell::Number(n) if n.is_finite() => ClassId::new(n.to_string()),
            RawCell::Text(s) => ClassId::new(s),
            RawCell::Bool(b) => ClassId::new(b.to_string()),
            _ => None,
        }
    }
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => RawCell::Empty,
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Float(f) => RawCell::Number(*f),
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Bool(b) => RawCell::Bool(*b),
            _ => RawCell::Other,
        }
    }
}

/// Cells of one worksheet, row-major, starting at cell A1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        Self { rows }
    }

    /// Skip the header rows, drop blank rows, check that every required
    /// column exists, and clean each remaining row into a student record.
    pub fn into_score_table(self, schema: &ColumnSchema) -> Result<ScoreTable, LoadError> {
        let data_rows: Vec<Vec<RawCell>> = self
            .rows
            .into_iter()
            .skip(schema.header_rows)
            .filter(|row| !row.iter().all(RawCell::is_blank))
            .collect();

        if data_rows.is_empty() {
            return Err(LoadError::NoRows);
        }

        let width = data_rows.iter().map(Vec::len).max().unwrap_or(0);
        let missing: Vec<String> = schema
            .required_columns()
            .into_iter()
            .filter(|(index, _)| *index >= width)
            .map(|(_, description)| description)
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let students: Vec<StudentRecord> = data_rows
            .iter()
            .map(|row| {
                let cell = |index: usize| row.get(index).unwrap_or(&EMPTY_CELL);
                StudentRecord::new(
                    cell(schema.class_column).as_label(),
                    schema.subject_columns.map(|_, &index| cell(index).as_score()),
                )
            })
            .collect();

        tracing::debug!(rows = students.len(), width, "cleaned score table");
        Ok(ScoreTable::new(students))
    }
}

/// How a score file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    /// Pick the reader from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load and clean a score file.
pub fn load_path(path: &Path, schema: &ColumnSchema) -> Result<ScoreTable, LoadError> {
    let table = read_path(path)?.into_score_table(schema)?;
    tracing::info!("loaded {} student records from {}", table.len(), path.display());
    Ok(table)
}

/// Load and clean an in-memory workbook (e.g. an upload).
pub fn load_workbook_bytes(bytes: Vec<u8>, schema: &ColumnSchema) -> Result<ScoreTable, LoadError> {
    read_workbook_bytes(bytes)?.into_score_table(schema)
}

/// Read a score file without cleaning it.
pub fn read_path(path: &Path) -> Result<RawTable, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    match SourceFormat::from_path(path)? {
        SourceFormat::Workbook => read_workbook_bytes(std::fs::read(path).map_err(io_error)?),
        SourceFormat::Csv => read_csv(std::fs::File::open(path).map_err(io_error)?),
    }
}

/// Read the first worksheet of an xlsx/xls/xlsb/ods workbook.
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)?
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    Ok(range_to_table(&range))
}

/// Anchor a calamine range at A1 so schema indices are absolute.
fn range_to_table(range: &Range<Data>) -> RawTable {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![RawCell::Empty; start_col as usize];
        cells.extend(row.iter().map(RawCell::from));
        rows.push(cells);
    }
    RawTable::new(rows)
}

/// Read a header-less CSV file. Every non-blank field is kept as text and
/// converted during cleaning.
///
/// Empty lines are not records, so they do not count toward the skipped
/// header rows; a line of bare commas does.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subject;
    use crate::schema::ColumnLayout;

    fn compact_schema() -> ColumnSchema {
        // A = class, B..F = subjects, one header row.
        ColumnSchema::from_layout(&ColumnLayout {
            class: "A".into(),
            chinese: "B".into(),
            math: "C".into(),
            english: "D".into(),
            science: "E".into(),
            politics: "F".into(),
            header_rows: 1,
        })
        .unwrap()
    }

    #[test]
    fn coercion_replaces_bad_values_with_zero() {
        assert_eq!(RawCell::Number(87.5).as_score(), 87.5);
        assert_eq!(RawCell::Text(" 91 ".into()).as_score(), 91.0);
        assert_eq!(RawCell::Text("absent".into()).as_score(), 0.0);
        assert_eq!(RawCell::Text("NaN".into()).as_score(), 0.0);
        assert_eq!(RawCell::Number(f64::INFINITY).as_score(), 0.0);
        assert_eq!(RawCell::Empty.as_score(), 0.0);
        assert_eq!(RawCell::Other.as_score(), 0.0);
        assert_eq!(RawCell::Bool(true).as_score(), 1.0);
    }

    #[test]
    fn labels_from_numbers_and_text() {
        assert_eq!(RawCell::Number(3.0).as_label().unwrap().as_str(), "3");
        assert_eq!(RawCell::Text(" 7A ".into()).as_label().unwrap().as_str(), "7A");
        assert!(RawCell::Text("  ".into()).as_label().is_none());
        assert!(RawCell::Empty.as_label().is_none());
    }

    #[test]
    fn csv_table_is_cleaned() {
        let csv = "class,chinese,math,english,science,politics\n\
                   1,90,80,x,70,60\n\
                   ,,,,,\n\
                   2,100,,50,40,30\n";
        let table = read_csv(csv.as_bytes())
            .unwrap()
            .into_score_table(&compact_schema())
            .unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.students()[0];
        assert_eq!(first.class.as_ref().unwrap().as_str(), "1");
        assert_eq!(first.scores[Subject::English], 0.0);
        assert_eq!(first.total(), 300.0);
        let second = &table.students()[1];
        assert_eq!(second.scores[Subject::Math], 0.0);
    }

    #[test]
    fn short_rows_are_padded() {
        let csv = "h\n1,90,80,70,60,50\n2,10\n";
        let table = read_csv(csv.as_bytes())
            .unwrap()
            .into_score_table(&compact_schema())
            .unwrap();
        assert_eq!(table.students()[1].scores[Subject::Politics], 0.0);
    }

    #[test]
    fn missing_columns_reported() {
        let csv = "h\n1,90,80\n";
        let err = read_csv(csv.as_bytes())
            .unwrap()
            .into_score_table(&compact_schema())
            .unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["D (English)", "E (Science)", "F (Politics)"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let csv = "class,chinese,math,english,science,politics\n";
        let err = read_csv(csv.as_bytes())
            .unwrap()
            .into_score_table(&compact_schema())
            .unwrap_err();
        assert!(matches!(err, LoadError::NoRows));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let err = read_path(Path::new("scores.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
        assert_eq!(
            SourceFormat::from_path(Path::new("Scores.XLSX")).unwrap(),
            SourceFormat::Workbook
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_path(Path::new("/nonexistent/scores.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn garbage_workbook_rejected() {
        let err = read_workbook_bytes(b"not a spreadsheet".to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_)));
    }

    #[test]
    fn xlsx_with_default_layout() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        // Title and header rows, deliberately leaving column A empty so the
        // used range starts at B1.
        sheet.write_string(0, 1, "Grade 7 midterm").unwrap();
        sheet.write_string(3, 1, "Class").unwrap();
        let rows: [(&str, [f64; 5]); 3] = [
            ("2", [90.0, 80.0, 70.0, 60.0, 50.0]),
            ("1", [100.0, 100.0, 100.0, 100.0, 100.0]),
            ("", [10.0, 20.0, 30.0, 40.0, 50.0]),
        ];
        let columns = [7u16, 10, 13, 16, 19];
        for (i, (class, scores)) in rows.iter().enumerate() {
            let row = 4 + i as u32;
            if !class.is_empty() {
                sheet.write_string(row, 1, *class).unwrap();
            }
            for (col, score) in columns.iter().zip(scores) {
                sheet.write_number(row, *col, *score).unwrap();
            }
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load_workbook_bytes(bytes, &ColumnSchema::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.students()[0].scores[Subject::Chinese], 90.0);
        assert_eq!(table.students()[0].scores[Subject::Politics], 50.0);
        assert_eq!(table.students()[1].class.as_ref().unwrap().as_str(), "1");
        assert!(table.students()[2].class.is_none());
        assert_eq!(table.unlabeled_count(), 1);
    }

    #[test]
    fn load_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        std::fs::write(&path, "h\nA,1,2,3,4,5\n").unwrap();

        let table = load_path(&path, &compact_schema()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.students()[0].total(), 15.0);
    }
}
