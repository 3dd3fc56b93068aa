//! Photo entity models.
//!
//! Covers two related tables:
//! - `raw_photos` -- the original upload, one row per ingestion attempt
//! - `photos` -- the processed, servable artifact derived from a raw photo

use jelly_core::types::{PhotoId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// RawPhoto
// ---------------------------------------------------------------------------

/// A row from the `raw_photos` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RawPhoto {
    pub id: PhotoId,
    pub user_id: Option<String>,
    pub original_filename: String,
    pub storage_key: String,
    pub storage_url: String,
    pub file_size: i64,
    pub mime_type: String,
    /// Lowercase hex SHA-256 of the stored bytes.
    pub content_hash: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub exif_data: Option<serde_json::Value>,
    pub uploaded_at: Timestamp,
    pub processed_at: Option<Timestamp>,
    /// Once set, only successful processing clears it.
    pub scheduled_deletion: Option<Timestamp>,
}

/// Sparse update for a raw photo.
///
/// Only `Some` fields are written; `None` leaves the stored value as is, so
/// a patch can never clear a column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPhotoPatch {
    pub storage_key: Option<String>,
    pub storage_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub exif_data: Option<serde_json::Value>,
    pub processed_at: Option<Timestamp>,
    pub scheduled_deletion: Option<Timestamp>,
}

impl RawPhotoPatch {
    /// Patch that only marks the record for deletion at `at`.
    pub fn schedule_deletion(at: Timestamp) -> Self {
        Self {
            scheduled_deletion: Some(at),
            ..Self::default()
        }
    }

    /// Merge the `Some` fields of this patch into `raw`.
    pub fn apply_to(&self, raw: &mut RawPhoto) {
        if let Some(v) = &self.storage_key {
            raw.storage_key = v.clone();
        }
        if let Some(v) = &self.storage_url {
            raw.storage_url = v.clone();
        }
        if self.width.is_some() {
            raw.width = self.width;
        }
        if self.height.is_some() {
            raw.height = self.height;
        }
        if self.exif_data.is_some() {
            raw.exif_data = self.exif_data.clone();
        }
        if self.processed_at.is_some() {
            raw.processed_at = self.processed_at;
        }
        if self.scheduled_deletion.is_some() {
            raw.scheduled_deletion = self.scheduled_deletion;
        }
    }
}

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

/// A row from the `photos` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub raw_photo_id: PhotoId,
    pub user_id: Option<String>,
    pub filename: String,
    pub original_url: String,
    pub thumbnail_url: String,
    pub caption: Option<String>,
    /// Order as supplied by the uploader; duplicates are kept.
    pub tags: Vec<String>,
    pub file_size: i64,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub uploaded_at: Timestamp,
    pub updated_at: Timestamp,
    pub scheduled_deletion: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawPhoto {
        RawPhoto {
            id: uuid::Uuid::new_v4(),
            user_id: None,
            original_filename: "a.jpg".into(),
            storage_key: "raw/a.jpg".into(),
            storage_url: "memory://objects/raw/a.jpg".into(),
            file_size: 3,
            mime_type: "image/jpeg".into(),
            content_hash: "00".repeat(32),
            width: None,
            height: None,
            exif_data: None,
            uploaded_at: chrono::Utc::now(),
            processed_at: None,
            scheduled_deletion: None,
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let original = raw();
        let mut patched = original.clone();
        RawPhotoPatch::default().apply_to(&mut patched);
        assert_eq!(patched, original);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut record = raw();
        record.width = Some(640);
        let at = chrono::Utc::now();

        RawPhotoPatch {
            height: Some(480),
            scheduled_deletion: Some(at),
            ..RawPhotoPatch::default()
        }
        .apply_to(&mut record);

        assert_eq!(record.width, Some(640));
        assert_eq!(record.height, Some(480));
        assert_eq!(record.scheduled_deletion, Some(at));
        assert_eq!(record.storage_key, "raw/a.jpg");
    }
}
