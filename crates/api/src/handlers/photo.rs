//! Handlers for photo upload and retrieval.

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use jelly_core::error::CoreError;
use jelly_core::limits::UploadLimits;
use jelly_core::messages;
use jelly_pipeline::dto::{PhotoDetails, RawPhotoDetails, UploadedPhoto};
use jelly_pipeline::{retrieval, UploadRequest};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Filename recorded when the multipart part does not carry one.
const DEFAULT_FILENAME: &str = "upload";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub photo: UploadedPhoto,
    pub message: &'static str,
}

/// POST /photo
///
/// Multipart form with a required `file` part, an optional `caption` and
/// any number of repeated `tags` parts.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let limits = state.pipeline.settings().limits;
    let mut multipart = multipart.map_err(|e| {
        tracing::info!(error = %e, "Failed to parse form");
        AppError::BadRequest(messages::FAILED_TO_PARSE_FORM.into())
    })?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut caption = String::new();
    let mut tags = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, &limits))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_FILENAME)
                    .to_string();
                let data = read_file(field, &limits).await?;
                file = Some((filename, data));
            }
            "caption" => {
                caption = field.text().await.map_err(|e| form_error(e, &limits))?;
            }
            "tags" => {
                tags.push(field.text().await.map_err(|e| form_error(e, &limits))?);
            }
            _ => {} // ignore unknown fields
        }
    }

    let (filename, data) = file.ok_or_else(|| {
        tracing::info!("Upload without file part");
        AppError::MissingFile
    })?;

    let outcome = state
        .pipeline
        .ingest(UploadRequest {
            filename: filename.clone(),
            data,
            caption,
            tags,
            user_id: None,
        })
        .await?;

    let photo = outcome.into_uploaded();
    tracing::info!(photo_id = %photo.id, filename = %filename, "Photo uploaded");

    Ok(Json(UploadResponse {
        photo,
        message: messages::UPLOAD_SUCCEEDED,
    }))
}

/// GET /photo/{id}
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PhotoDetails>> {
    let photo = retrieval::get_photo(state.pipeline.store().as_ref(), &id).await?;
    Ok(Json(photo))
}

/// GET /photo/raw/{id}
pub async fn get_raw_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RawPhotoDetails>> {
    let raw = retrieval::get_raw_photo(state.pipeline.store().as_ref(), &id).await?;
    Ok(Json(raw))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Stream the file part, failing as soon as it exceeds the upload limit.
async fn read_file(mut field: Field<'_>, limits: &UploadLimits) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        if is_too_large(&e) {
            too_large(limits)
        } else {
            tracing::error!(error = %e, "{}", messages::FAILED_TO_READ_FILE);
            AppError::InternalError(messages::FAILED_TO_READ_FILE.into())
        }
    })? {
        data.extend_from_slice(&chunk);
        limits.check_size(data.len() as u64).map_err(|e| {
            tracing::info!(max_mb = limits.max_megabytes(), "File size too large");
            AppError::Core(e)
        })?;
    }
    Ok(data)
}

fn form_error(err: MultipartError, limits: &UploadLimits) -> AppError {
    if is_too_large(&err) {
        return too_large(limits);
    }
    tracing::info!(error = %err, max_mb = limits.max_megabytes(), "Failed to parse form");
    AppError::BadRequest(messages::FAILED_TO_PARSE_FORM.into())
}

fn is_too_large(err: &MultipartError) -> bool {
    err.status() == StatusCode::PAYLOAD_TOO_LARGE
}

fn too_large(limits: &UploadLimits) -> AppError {
    tracing::info!(max_mb = limits.max_megabytes(), "File size too large");
    AppError::Core(CoreError::TooLarge {
        max_bytes: limits.max_bytes,
    })
}
