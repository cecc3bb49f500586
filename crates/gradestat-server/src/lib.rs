//! gradestat-server — HTTP front end for score-sheet analysis.
//!
//! Routes:
//! - `GET /` → service status and a description of the analyze endpoint
//! - `POST /analyze` → multipart upload of an `.xlsx` score sheet plus
//!   optional per-subject maximum scores; responds with the xlsx report

pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use gradestat_core::config::ServerSettings;
use gradestat_core::schema::ColumnSchema;

/// Shared, read-only state of the service.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Layout every uploaded sheet is read with.
    pub schema: ColumnSchema,
}

/// Build the service router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(Arc::new(state))
}

/// Bind to `settings.bind` and serve until the process is stopped.
pub async fn serve(settings: &ServerSettings, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "gradestat server listening");
    axum::serve(listener, router(state, settings.max_upload_bytes))
        .await
        .context("server error")
}
