//! gradestat configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{Subject, SubjectConfig, SubjectMap, DEFAULT_MAX_SCORE};
use crate::schema::{ColumnLayout, ColumnSchema};

/// Top-level gradestat configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradestatConfig {
    /// Maximum score per subject.
    #[serde(default)]
    pub max_scores: MaxScores,
    /// Score sheet column layout.
    #[serde(default)]
    pub columns: ColumnLayout,
    /// Web endpoint settings.
    #[serde(default)]
    pub server: ServerSettings,
}

impl GradestatConfig {
    pub fn subject_config(&self) -> Result<SubjectConfig, ValidationError> {
        self.max_scores.to_subject_config()
    }

    pub fn column_schema(&self) -> Result<ColumnSchema, ValidationError> {
        ColumnSchema::from_layout(&self.columns)
    }
}

/// `[max_scores]` section. Omitted subjects default to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxScores {
    #[serde(default = "default_max_score")]
    pub chinese: f64,
    #[serde(default = "default_max_score")]
    pub math: f64,
    #[serde(default = "default_max_score")]
    pub english: f64,
    #[serde(default = "default_max_score")]
    pub science: f64,
    #[serde(default = "default_max_score")]
    pub politics: f64,
}

impl Default for MaxScores {
    fn default() -> Self {
        Self {
            chinese: DEFAULT_MAX_SCORE,
            math: DEFAULT_MAX_SCORE,
            english: DEFAULT_MAX_SCORE,
            science: DEFAULT_MAX_SCORE,
            politics: DEFAULT_MAX_SCORE,
        }
    }
}

impl MaxScores {
    pub fn get(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Chinese => self.chinese,
            Subject::Math => self.math,
            Subject::English => self.english,
            Subject::Science => self.science,
            Subject::Politics => self.politics,
        }
    }

    pub fn set(&mut self, subject: Subject, value: f64) {
        let slot = match subject {
            Subject::Chinese => &mut self.chinese,
            Subject::Math => &mut self.math,
            Subject::English => &mut self.english,
            Subject::Science => &mut self.science,
            Subject::Politics => &mut self.politics,
        };
        *slot = value;
    }

    pub fn to_subject_config(&self) -> Result<SubjectConfig, ValidationError> {
        SubjectConfig::new(SubjectMap::from_fn(|s| self.get(s)))
    }
}

fn default_max_score() -> f64 {
    DEFAULT_MAX_SCORE
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}
fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `gradestat.toml` in the current directory
/// 2. `~/.config/gradestat/config.toml`
///
/// Environment variable overrides: `GRADESTAT_BIND`, `GRADESTAT_MAX_UPLOAD_BYTES`.
pub fn load_config_from(path: Option<&Path>) -> Result<GradestatConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradestat.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!("reading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradestatConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradestatConfig::default(),
    };

    apply_env_overrides(config, |key| std::env::var(key).ok())
}

fn apply_env_overrides(
    mut config: GradestatConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GradestatConfig> {
    if let Some(bind) = lookup("GRADESTAT_BIND") {
        config.server.bind = bind;
    }
    if let Some(limit) = lookup("GRADESTAT_MAX_UPLOAD_BYTES") {
        config.server.max_upload_bytes = limit
            .trim()
            .parse()
            .with_context(|| format!("GRADESTAT_MAX_UPLOAD_BYTES is not a byte count: {limit}"))?;
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradestat"))
}
