//! Error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use gradestat_core::{AnalyzeError, LoadError};

/// A request failure, rendered as `{"code": <status>, "msg": <message>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no score file was uploaded")]
    MissingFile,

    #[error("please upload a valid .xlsx score file")]
    NotXlsx,

    #[error("malformed upload: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        ApiError::Analyze(err.into())
    }
}

impl From<gradestat_core::ValidationError> for ApiError {
    fn from(err: gradestat_core::ValidationError) -> Self {
        ApiError::Analyze(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::NotXlsx => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Analyze(AnalyzeError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Analyze(AnalyzeError::Load(err)) if err.is_user_input() => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Analyze(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "analysis request failed");
        } else {
            tracing::warn!(error = %self, "analysis request rejected");
        }
        (
            status,
            Json(json!({ "code": status.as_u16(), "msg": self.to_string() })),
        )
            .into_response()
    }
}
