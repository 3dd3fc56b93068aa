//! The metadata persistence seam used by the ingestion pipeline.
//!
//! "Not found" is never an error here: lookups return `Ok(None)` and
//! deletes return `Ok(false)`. [`MetadataError`] is reserved for failures
//! of the store itself.

mod memory;
mod postgres;

use async_trait::async_trait;
use jelly_core::types::{PhotoId, Timestamp};

use crate::models::photo::{Photo, RawPhoto, RawPhotoPatch};

pub use memory::InMemoryMetadataStore;
pub use postgres::PgMetadataStore;

/// Errors raised by a [`MetadataStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Metadata store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness or referential constraint was violated.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert_raw_photo(&self, raw: &RawPhoto) -> MetadataResult<RawPhoto>;

    /// Merge the `Some` fields of `patch` into the stored record.
    async fn update_raw_photo(
        &self,
        id: PhotoId,
        patch: &RawPhotoPatch,
    ) -> MetadataResult<Option<RawPhoto>>;

    async fn get_raw_photo_by_id(&self, id: PhotoId) -> MetadataResult<Option<RawPhoto>>;

    /// Set `processed_at` and clear any deletion marker.
    async fn mark_raw_photo_processed(
        &self,
        id: PhotoId,
        at: Timestamp,
    ) -> MetadataResult<Option<RawPhoto>>;

    async fn insert_photo(&self, photo: &Photo) -> MetadataResult<Photo>;

    async fn get_photo_by_id(&self, id: PhotoId) -> MetadataResult<Option<Photo>>;

    /// Overwrite the editable fields of a photo and bump `updated_at`.
    async fn update_photo(&self, photo: &Photo) -> MetadataResult<Option<Photo>>;

    /// Schedule a photo for deletion `after` from now. The record remains
    /// readable until it is reaped.
    async fn delete_photo(&self, id: PhotoId, after: chrono::Duration) -> MetadataResult<bool>;

    /// Short label for logging.
    fn store_name(&self) -> &'static str;
}
