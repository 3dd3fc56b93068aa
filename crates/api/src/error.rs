use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jelly_core::error::CoreError;
use jelly_core::messages;
use jelly_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain and pipeline errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jelly_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure inside the ingestion or retrieval pipeline.
    #[error(transparent)]
    Pipeline(PipelineError),

    /// The upload form had no `file` field.
    #[error("{}", messages::FILE_REQUIRED)]
    MissingFile,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Core(core) => AppError::Core(core),
            other => AppError::Pipeline(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Pipeline(err) => {
                tracing::error!(error = %err, "Pipeline error");
                internal()
            }

            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "FILE_REQUIRED",
                messages::FILE_REQUIRED.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::TooLarge { .. } => (
            StatusCode::BAD_REQUEST,
            "FILE_TOO_LARGE",
            messages::FILE_TOO_LARGE.to_string(),
        ),
        CoreError::UnsupportedType { .. } => (
            StatusCode::BAD_REQUEST,
            "UNSUPPORTED_FILE_TYPE",
            messages::UNSUPPORTED_FILE_TYPE.to_string(),
        ),
        CoreError::InvalidId(_) => (
            StatusCode::BAD_REQUEST,
            "INVALID_ID",
            messages::INVALID_ID.to_string(),
        ),
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
