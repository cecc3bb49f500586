//! The `gradestat init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = Path::new("gradestat.toml");
    if path.exists() {
        println!("gradestat.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created gradestat.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit gradestat.toml to match your score sheet and subject maximums");
    println!("  2. Run: gradestat validate --input scores.xlsx");
    println!("  3. Run: gradestat analyze --input scores.xlsx");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradestat configuration

# Maximum score per subject. Thresholds are relative to these:
# excellent >= 80%, pass >= 60%, fail < 40%.
[max_scores]
chinese = 100
math = 100
english = 100
science = 100
politics = 100

# Score sheet layout. Rows before `header_rows` are skipped; columns are
# spreadsheet letters.
[columns]
header_rows = 4
class = "B"
chinese = "H"
math = "K"
english = "N"
science = "Q"
politics = "T"

# `gradestat serve` settings. GRADESTAT_BIND and GRADESTAT_MAX_UPLOAD_BYTES
# override these.
[server]
bind = "0.0.0.0:5000"
max_upload_bytes = 16777216
"#;
