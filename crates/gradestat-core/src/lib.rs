//! gradestat-core — Score table loading, cohort statistics, and report shaping.
//!
//! This crate defines the data model, the score sheet loader, the statistics
//! engine, and the report value that every gradestat front end renders.

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod report;
pub mod schema;
pub mod statistics;

pub use engine::analyze;
pub use error::{AnalyzeError, ComputeError, LoadError, ValidationError};
pub use model::{ClassId, ScoreTable, StudentRecord, Subject, SubjectConfig, SubjectMap};
pub use report::Report;
