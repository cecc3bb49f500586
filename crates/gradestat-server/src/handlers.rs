//! Request handlers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use gradestat_core::loader::load_workbook_bytes;
use gradestat_core::{analyze as run_analysis, Subject, SubjectConfig, SubjectMap};
use gradestat_report::report_file_name;
use gradestat_report::xlsx::{generate_xlsx, XLSX_CONTENT_TYPE};

use crate::error::ApiError;
use crate::AppState;

/// `GET /` — liveness check with a short description of the API.
pub async fn health() -> Json<Value> {
    let mut params = serde_json::Map::new();
    params.insert("file".into(), json!("required, score sheet (.xlsx)"));
    for subject in Subject::ALL {
        params.insert(
            subject.key().into(),
            json!(format!("optional, {subject} maximum score (default 100)")),
        );
    }
    Json(json!({
        "code": 200,
        "msg": "grade analysis service is running",
        "api_doc": {
            "endpoint": "/analyze",
            "method": "POST",
            "params": params,
            "return": "xlsx grade analysis report",
        }
    }))
}

/// Fields collected from the multipart body.
#[derive(Default)]
struct Upload {
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
    max_scores: SubjectMap<Option<String>>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "file" {
            upload.file_name = field.file_name().map(str::to_owned);
            let bytes = field.bytes().await?;
            upload.bytes = Some(bytes.to_vec());
        } else if let Ok(subject) = name.parse::<Subject>() {
            let text = field.text().await?;
            upload.max_scores[subject] = Some(text);
        }
    }
    Ok(upload)
}

fn is_xlsx(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".xlsx")
}

/// `POST /analyze` — analyze an uploaded sheet and return the xlsx report.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;

    let bytes = upload.bytes.ok_or(ApiError::MissingFile)?;
    match upload.file_name.as_deref() {
        Some(name) if is_xlsx(name) => {}
        _ => return Err(ApiError::NotXlsx),
    }

    let config = SubjectConfig::from_text_fields(
        upload
            .max_scores
            .iter()
            .map(|(subject, raw)| (subject, raw.as_deref())),
    )?;

    let schema = state.schema.clone();
    let (report, workbook) = tokio::task::spawn_blocking(move || {
        let table = load_workbook_bytes(bytes, &schema)?;
        tracing::info!(students = table.len(), "loaded {} student records", table.len());
        let report = run_analysis(&table, &config)?;
        let workbook =
            generate_xlsx(&report).map_err(|e| ApiError::Internal(format!("{e:#}")))?;
        Ok::<_, ApiError>((report, workbook))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let file_name = report_file_name(report.generated_at, "xlsx");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"grade-report.xlsx\""));

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE))
        .header(CONTENT_DISPOSITION, disposition)
        .body(Body::from(workbook))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
