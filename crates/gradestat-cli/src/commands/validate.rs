//! The `gradestat validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradestat_core::config::load_config_from;
use gradestat_core::loader::load_path;

pub fn execute(input: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let schema = config.column_schema()?;

    let table = load_path(&input, &schema)
        .with_context(|| format!("failed to load {}", input.display()))?;

    println!("Score file: {}", input.display());
    println!("  {} student records", table.len());
    println!("  {} classes", table.class_count());

    let unlabeled = table.unlabeled_count();
    if unlabeled == 0 {
        println!("Score file valid.");
    } else {
        println!(
            "  WARNING: {unlabeled} record(s) have no class label and count toward the grade only"
        );
    }

    Ok(())
}
