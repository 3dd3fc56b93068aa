//! Repository for the `photos` table.

use jelly_core::types::{PhotoId, Timestamp};
use sqlx::PgPool;

use crate::models::photo::Photo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, raw_photo_id, user_id, filename, original_url, thumbnail_url, \
    caption, tags, file_size, mime_type, width, height, uploaded_at, updated_at, \
    scheduled_deletion";

/// Provides persistence for processed photo records.
pub struct PhotoRepo;

impl PhotoRepo {
    /// Insert a processed photo, returning the stored row.
    ///
    /// Fails with a foreign-key violation if `raw_photo_id` does not exist.
    pub async fn create(pool: &PgPool, photo: &Photo) -> Result<Photo, sqlx::Error> {
        let query = format!(
            "INSERT INTO photos
                (id, raw_photo_id, user_id, filename, original_url, thumbnail_url,
                 caption, tags, file_size, mime_type, width, height, uploaded_at,
                 updated_at, scheduled_deletion)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(photo.id)
            .bind(photo.raw_photo_id)
            .bind(&photo.user_id)
            .bind(&photo.filename)
            .bind(&photo.original_url)
            .bind(&photo.thumbnail_url)
            .bind(&photo.caption)
            .bind(&photo.tags)
            .bind(photo.file_size)
            .bind(&photo.mime_type)
            .bind(photo.width)
            .bind(photo.height)
            .bind(photo.uploaded_at)
            .bind(photo.updated_at)
            .bind(photo.scheduled_deletion)
            .fetch_one(pool)
            .await
    }

    /// Find a photo by id. Rows scheduled for deletion stay readable until
    /// the reaper removes them.
    pub async fn find_by_id(pool: &PgPool, id: PhotoId) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the editable fields of a photo and bump `updated_at`.
    ///
    /// Identity, ownership, size and timestamps other than `updated_at` are
    /// not editable. Returns `None` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, photo: &Photo) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!(
            "UPDATE photos SET
                filename      = $2,
                original_url  = $3,
                thumbnail_url = $4,
                caption       = $5,
                tags          = $6,
                width         = $7,
                height        = $8,
                updated_at    = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(photo.id)
            .bind(&photo.filename)
            .bind(&photo.original_url)
            .bind(&photo.thumbnail_url)
            .bind(&photo.caption)
            .bind(&photo.tags)
            .bind(photo.width)
            .bind(photo.height)
            .fetch_optional(pool)
            .await
    }

    /// Schedule a photo for deletion at `at`. An earlier schedule is kept.
    ///
    /// Returns `true` if the row exists.
    pub async fn schedule_deletion(
        pool: &PgPool,
        id: PhotoId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE photos
             SET scheduled_deletion = COALESCE(scheduled_deletion, $2), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
