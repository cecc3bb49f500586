//! The analysis pipeline.
//!
//! `analyze` validates the configuration, aggregates the whole grade, then
//! partitions students by class and aggregates each class. It holds no state
//! between calls; concurrent analyses of different tables never interact.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::error::{AnalyzeError, ComputeError};
use crate::model::{ClassId, ScoreTable, StudentRecord, SubjectConfig};
use crate::report::Report;
use crate::statistics::{CohortStats, GroupScope};

/// Analyze a cleaned score table, stamping the report with the current time.
pub fn analyze(table: &ScoreTable, config: &SubjectConfig) -> Result<Report, AnalyzeError> {
    analyze_at(table, config, Local::now())
}

/// Analyze with an explicit generation timestamp.
pub fn analyze_at(
    table: &ScoreTable,
    config: &SubjectConfig,
    generated_at: DateTime<Local>,
) -> Result<Report, AnalyzeError> {
    config.validate()?;

    let cohort_size = table.len();
    let everyone: Vec<&StudentRecord> = table.students().iter().collect();
    let grade = checked(CohortStats::compute(
        GroupScope::Grade,
        &everyone,
        cohort_size,
        config,
    ))?;

    let mut classes = Vec::new();
    if cohort_size > 0 {
        for (class, members) in partition_by_class(table) {
            if members.is_empty() {
                continue;
            }
            tracing::debug!(class = %class, students = members.len(), "aggregating class");
            classes.push(checked(CohortStats::compute(
                GroupScope::Class(class),
                &members,
                cohort_size,
                config,
            ))?);
        }
    }

    tracing::info!(
        students = cohort_size,
        classes = classes.len(),
        "analysis complete"
    );
    Ok(Report::assemble(generated_at, config.clone(), grade, classes))
}

/// Group students by class label in ascending label order. Students without
/// a label are left out.
pub fn partition_by_class(table: &ScoreTable) -> BTreeMap<ClassId, Vec<&StudentRecord>> {
    let mut groups: BTreeMap<ClassId, Vec<&StudentRecord>> = BTreeMap::new();
    for student in table.students() {
        if let Some(class) = &student.class {
            groups.entry(class.clone()).or_default().push(student);
        }
    }
    groups
}

fn checked(stats: CohortStats) -> Result<CohortStats, ComputeError> {
    for (subject, subject_stats) in stats.subjects.iter() {
        if !subject_stats.is_finite() {
            return Err(ComputeError::NonFiniteStatistic {
                group: stats.label().to_string(),
                subject,
            });
        }
    }
    Ok(stats)
}
