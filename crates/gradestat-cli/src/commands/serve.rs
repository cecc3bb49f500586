//! The `gradestat serve` command.

use std::path::PathBuf;

use anyhow::Result;

use gradestat_core::config::load_config_from;
use gradestat_server::AppState;

pub async fn execute(bind: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let schema = config.column_schema()?;

    let mut settings = config.server;
    if let Some(bind) = bind {
        settings.bind = bind;
    }

    gradestat_server::serve(&settings, AppState { schema }).await
}
