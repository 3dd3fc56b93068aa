//! Repository for the `raw_photos` table.

use jelly_core::types::{PhotoId, Timestamp};
use sqlx::PgPool;

use crate::models::photo::{RawPhoto, RawPhotoPatch};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, original_filename, storage_key, storage_url, file_size, \
    mime_type, content_hash, width, height, exif_data, uploaded_at, processed_at, \
    scheduled_deletion";

/// Provides persistence for raw photo records.
pub struct RawPhotoRepo;

impl RawPhotoRepo {
    /// Insert a raw photo whose id was minted by the caller, returning the
    /// stored row.
    pub async fn create(pool: &PgPool, raw: &RawPhoto) -> Result<RawPhoto, sqlx::Error> {
        let query = format!(
            "INSERT INTO raw_photos
                (id, user_id, original_filename, storage_key, storage_url, file_size,
                 mime_type, content_hash, width, height, exif_data, uploaded_at,
                 processed_at, scheduled_deletion)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RawPhoto>(&query)
            .bind(raw.id)
            .bind(&raw.user_id)
            .bind(&raw.original_filename)
            .bind(&raw.storage_key)
            .bind(&raw.storage_url)
            .bind(raw.file_size)
            .bind(&raw.mime_type)
            .bind(&raw.content_hash)
            .bind(raw.width)
            .bind(raw.height)
            .bind(&raw.exif_data)
            .bind(raw.uploaded_at)
            .bind(raw.processed_at)
            .bind(raw.scheduled_deletion)
            .fetch_one(pool)
            .await
    }

    /// Find a raw photo by id. Rows scheduled for deletion are still returned.
    pub async fn find_by_id(pool: &PgPool, id: PhotoId) -> Result<Option<RawPhoto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM raw_photos WHERE id = $1");
        sqlx::query_as::<_, RawPhoto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a raw photo. Only non-`None` fields in `patch` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: PhotoId,
        patch: &RawPhotoPatch,
    ) -> Result<Option<RawPhoto>, sqlx::Error> {
        let query = format!(
            "UPDATE raw_photos SET
                storage_key        = COALESCE($2, storage_key),
                storage_url        = COALESCE($3, storage_url),
                width              = COALESCE($4, width),
                height             = COALESCE($5, height),
                exif_data          = COALESCE($6, exif_data),
                processed_at       = COALESCE($7, processed_at),
                scheduled_deletion = COALESCE($8, scheduled_deletion)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RawPhoto>(&query)
            .bind(id)
            .bind(&patch.storage_key)
            .bind(&patch.storage_url)
            .bind(patch.width)
            .bind(patch.height)
            .bind(&patch.exif_data)
            .bind(patch.processed_at)
            .bind(patch.scheduled_deletion)
            .fetch_optional(pool)
            .await
    }

    /// Record successful processing: sets `processed_at` and clears any
    /// pending deletion marker.
    pub async fn mark_processed(
        pool: &PgPool,
        id: PhotoId,
        at: Timestamp,
    ) -> Result<Option<RawPhoto>, sqlx::Error> {
        let query = format!(
            "UPDATE raw_photos SET processed_at = $2, scheduled_deletion = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RawPhoto>(&query)
            .bind(id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
