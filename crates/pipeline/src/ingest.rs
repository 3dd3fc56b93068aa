//! Upload ingestion state machine.
//!
//! ```text
//! Received -> Validated -> Fingerprinted -> StoredRaw -> PersistedRaw
//!     [-> Transformed -> StoredProcessed -> PersistedProcessed] -> Completed
//! ```
//!
//! Any failure after `StoredRaw` moves to `Failed` and schedules the raw
//! photo for deletion instead of rolling back synchronously. A failed raw
//! upload writes no record at all. Everything from
//! `Fingerprinted` onward runs in its own task, so a dropped client
//! connection cannot interrupt a half-finished ingestion.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jelly_core::fingerprint::{fingerprint, Fingerprint};
use jelly_core::ids::new_photo_id;
use jelly_core::limits::UploadLimits;
use jelly_core::naming::{processed_photo_key, raw_photo_key, thumbnail_key};
use jelly_core::types::PhotoId;
use jelly_db::models::photo::{Photo, RawPhoto, RawPhotoPatch};
use jelly_db::store::MetadataStore;
use jelly_storage::ObjectStorage;
use tracing::Instrument;

use crate::dto::UploadedPhoto;
use crate::error::PipelineError;
use crate::transform::PhotoTransformer;

/// Default delay before a failed ingestion's raw photo is reaped.
pub const DEFAULT_DELETION_GRACE_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Settings and request/response values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct IngestSettings {
    pub limits: UploadLimits,
    /// How long a failed ingestion's raw photo is kept before deletion.
    pub deletion_grace: Duration,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            limits: UploadLimits::default(),
            deletion_grace: Duration::days(DEFAULT_DELETION_GRACE_DAYS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    Validated,
    Fingerprinted,
    StoredRaw,
    PersistedRaw,
    Transformed,
    StoredProcessed,
    PersistedProcessed,
    Completed,
    Failed,
}

impl IngestState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Fingerprinted => "fingerprinted",
            Self::StoredRaw => "stored_raw",
            Self::PersistedRaw => "persisted_raw",
            Self::Transformed => "transformed",
            Self::StoredProcessed => "stored_processed",
            Self::PersistedProcessed => "persisted_processed",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A photo upload as received from the transport layer.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub filename: String,
    pub data: Vec<u8>,
    /// Empty when the uploader gave none.
    pub caption: String,
    pub tags: Vec<String>,
    pub user_id: Option<String>,
}

/// Result of a completed ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub raw: RawPhoto,
    /// Present only when a transformer produced a processed photo.
    pub photo: Option<Photo>,
    pub caption: String,
    pub tags: Vec<String>,
}

impl IngestOutcome {
    /// Acknowledgement for the uploader. Points at the processed photo when
    /// there is one, otherwise at the raw upload.
    pub fn into_uploaded(self) -> UploadedPhoto {
        let (id, url) = match self.photo {
            Some(photo) => (photo.id, photo.original_url),
            None => (self.raw.id, self.raw.storage_url),
        };
        UploadedPhoto {
            id,
            url,
            caption: self.caption,
            tags: self.tags,
            uploaded_at: self.raw.uploaded_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct IngestPipeline {
    storage: Arc<dyn ObjectStorage>,
    store: Arc<dyn MetadataStore>,
    transformer: Option<Arc<dyn PhotoTransformer>>,
    settings: IngestSettings,
}

impl IngestPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        store: Arc<dyn MetadataStore>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            storage,
            store,
            transformer: None,
            settings,
        }
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn PhotoTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Run an upload through the pipeline.
    ///
    /// Size and type checks happen before any storage or metadata call.
    #[tracing::instrument(
        name = "ingest",
        skip_all,
        fields(
            filename = %request.filename,
            size = request.data.len(),
            photo_id = tracing::field::Empty,
        )
    )]
    pub async fn ingest(&self, request: UploadRequest) -> Result<IngestOutcome, PipelineError> {
        tracing::debug!(state = %IngestState::Received, "Upload received");

        self.settings
            .limits
            .check_size(request.data.len() as u64)
            .inspect_err(|e| tracing::info!(error = %e, "Upload rejected"))?;
        tracing::debug!(state = %IngestState::Validated, "Upload size accepted");

        let fp = fingerprint(&request.data)
            .inspect_err(|e| tracing::info!(error = %e, "Upload rejected"))?;
        let id = new_photo_id();
        tracing::Span::current().record("photo_id", tracing::field::display(id));
        tracing::debug!(
            state = %IngestState::Fingerprinted,
            photo_id = %id,
            mime_type = fp.mime_type,
            content_hash = %fp.content_hash,
            "Upload fingerprinted",
        );

        let raw = draft_raw_photo(id, &fp, &request);
        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.persist(raw, request).await }.in_current_span())
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
    }

    /// Store and record a fingerprinted upload, compensating on failure.
    async fn persist(
        &self,
        mut raw: RawPhoto,
        request: UploadRequest,
    ) -> Result<IngestOutcome, PipelineError> {
        let mut state = IngestState::Fingerprinted;

        match self.run_steps(&mut raw, &request, &mut state).await {
            Ok(photo) => {
                tracing::info!(
                    state = %IngestState::Completed,
                    photo_id = %raw.id,
                    storage = self.storage.backend_name(),
                    store = self.store.store_name(),
                    processed = photo.is_some(),
                    "Photo ingested",
                );
                Ok(IngestOutcome {
                    raw,
                    photo,
                    caption: request.caption,
                    tags: request.tags,
                })
            }
            Err(err) => {
                tracing::error!(
                    state = %IngestState::Failed,
                    last_state = %state,
                    photo_id = %raw.id,
                    error = %err,
                    "Ingestion failed",
                );
                if state == IngestState::Fingerprinted {
                    // Nothing was stored, so there is nothing to reap.
                    tracing::warn!(photo_id = %raw.id, "Raw upload not stored, no record written");
                } else {
                    self.compensate(&raw).await;
                }
                Err(err)
            }
        }
    }

    async fn run_steps(
        &self,
        raw: &mut RawPhoto,
        request: &UploadRequest,
        state: &mut IngestState,
    ) -> Result<Option<Photo>, PipelineError> {
        raw.storage_url = self
            .storage
            .upload(&raw.storage_key, &request.data, &raw.mime_type)
            .await?;
        advance(state, IngestState::StoredRaw, raw.id);

        *raw = self.store.insert_raw_photo(raw).await?;
        advance(state, IngestState::PersistedRaw, raw.id);

        let Some(transformer) = self.transformer.clone() else {
            return Ok(None);
        };

        let transformed = transformer.transform(&request.data, raw).await?;
        advance(state, IngestState::Transformed, raw.id);

        let photo_id = new_photo_id();
        let mime = transformed.mime_type.as_str();
        let original_url = self
            .storage
            .upload(
                &processed_photo_key(photo_id, mime),
                &transformed.image,
                mime,
            )
            .await?;
        let thumbnail_url = self
            .storage
            .upload(&thumbnail_key(photo_id, mime), &transformed.thumbnail, mime)
            .await?;
        advance(state, IngestState::StoredProcessed, raw.id);

        let now = Utc::now();
        let photo = self
            .store
            .insert_photo(&Photo {
                id: photo_id,
                raw_photo_id: raw.id,
                user_id: raw.user_id.clone(),
                filename: raw.original_filename.clone(),
                original_url,
                thumbnail_url,
                caption: Some(request.caption.clone()),
                tags: request.tags.clone(),
                file_size: transformed.image.len() as i64,
                mime_type: transformed.mime_type.clone(),
                width: transformed.width.and_then(to_i32),
                height: transformed.height.and_then(to_i32),
                uploaded_at: raw.uploaded_at,
                updated_at: now,
                scheduled_deletion: None,
            })
            .await?;
        advance(state, IngestState::PersistedProcessed, raw.id);

        if let Some(processed) = self.store.mark_raw_photo_processed(raw.id, now).await? {
            *raw = processed;
        }
        Ok(Some(photo))
    }

    /// Mark the raw photo for deletion after the grace period.
    ///
    /// Only called once the raw bytes are stored. Inserts the record when it
    /// was never persisted so the stored object stays discoverable. Failures
    /// here are logged and swallowed.
    async fn compensate(&self, raw: &RawPhoto) {
        let at = Utc::now() + self.settings.deletion_grace;

        match self
            .store
            .update_raw_photo(raw.id, &RawPhotoPatch::schedule_deletion(at))
            .await
        {
            Ok(Some(_)) => {
                tracing::info!(photo_id = %raw.id, scheduled_deletion = %at, "Raw photo scheduled for deletion");
            }
            Ok(None) => {
                let orphan = RawPhoto {
                    scheduled_deletion: Some(at),
                    ..raw.clone()
                };
                match self.store.insert_raw_photo(&orphan).await {
                    Ok(_) => tracing::info!(
                        photo_id = %raw.id,
                        scheduled_deletion = %at,
                        "Orphaned upload recorded for deletion",
                    ),
                    Err(e) => tracing::error!(
                        photo_id = %raw.id,
                        operation = "insert_raw_photo",
                        error = %e,
                        "Failed to schedule deletion",
                    ),
                }
            }
            Err(e) => {
                tracing::error!(
                    photo_id = %raw.id,
                    operation = "update_raw_photo",
                    error = %e,
                    "Failed to schedule deletion",
                );
            }
        }
    }
}

fn advance(state: &mut IngestState, next: IngestState, id: PhotoId) {
    tracing::debug!(photo_id = %id, from = %state, to = %next, "Ingest state changed");
    *state = next;
}

fn to_i32(v: u32) -> Option<i32> {
    i32::try_from(v).ok()
}

fn draft_raw_photo(id: PhotoId, fp: &Fingerprint, request: &UploadRequest) -> RawPhoto {
    RawPhoto {
        id,
        user_id: request.user_id.clone(),
        original_filename: request.filename.clone(),
        storage_key: raw_photo_key(id, fp.mime_type),
        storage_url: String::new(),
        file_size: request.data.len() as i64,
        mime_type: fp.mime_type.to_string(),
        content_hash: fp.content_hash.clone(),
        width: fp.width.and_then(to_i32),
        height: fp.height.and_then(to_i32),
        exif_data: None,
        uploaded_at: Utc::now(),
        processed_at: None,
        scheduled_deletion: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
