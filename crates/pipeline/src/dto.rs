//! JSON shapes returned by the HTTP layer.

use jelly_core::types::{PhotoId, Timestamp};
use jelly_db::models::photo::{Photo, RawPhoto};
use serde::Serialize;

/// Acknowledgement for a successful upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    pub id: PhotoId,
    pub url: String,
    pub caption: String,
    pub tags: Vec<String>,
    pub uploaded_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDetails {
    pub id: PhotoId,
    pub raw_photo_id: PhotoId,
    pub user_id: Option<String>,
    pub filename: String,
    pub original_url: String,
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub tags: Vec<String>,
    pub file_size: i64,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    pub uploaded_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(rename = "scheduleDeletion", skip_serializing_if = "Option::is_none")]
    pub scheduled_deletion: Option<Timestamp>,
}

impl From<Photo> for PhotoDetails {
    fn from(p: Photo) -> Self {
        Self {
            id: p.id,
            raw_photo_id: p.raw_photo_id,
            user_id: p.user_id,
            filename: p.filename,
            original_url: p.original_url,
            thumbnail_url: p.thumbnail_url,
            caption: p.caption,
            tags: p.tags,
            file_size: p.file_size,
            mime_type: p.mime_type,
            width: p.width,
            height: p.height,
            uploaded_at: p.uploaded_at,
            updated_at: p.updated_at,
            scheduled_deletion: p.scheduled_deletion,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPhotoDetails {
    pub id: PhotoId,
    pub user_id: Option<String>,
    pub original_filename: String,
    pub storage_url: String,
    pub file_size: i64,
    pub mime_type: String,
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif_data: Option<serde_json::Value>,
    pub uploaded_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<Timestamp>,
    #[serde(rename = "scheduleDeletion", skip_serializing_if = "Option::is_none")]
    pub scheduled_deletion: Option<Timestamp>,
}

impl From<RawPhoto> for RawPhotoDetails {
    fn from(r: RawPhoto) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            original_filename: r.original_filename,
            storage_url: r.storage_url,
            file_size: r.file_size,
            mime_type: r.mime_type,
            content_hash: r.content_hash,
            width: r.width,
            height: r.height,
            exif_data: r.exif_data,
            uploaded_at: r.uploaded_at,
            processed_at: r.processed_at,
            scheduled_deletion: r.scheduled_deletion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_details_use_camel_case_and_keep_empty_tags() {
        let now = chrono::Utc::now();
        let photo = Photo {
            id: uuid::Uuid::new_v4(),
            raw_photo_id: uuid::Uuid::new_v4(),
            user_id: None,
            filename: "a.png".into(),
            original_url: "http://x/photos/a.png".into(),
            thumbnail_url: "http://x/thumbnails/a.png".into(),
            caption: None,
            tags: Vec::new(),
            file_size: 10,
            mime_type: "image/png".into(),
            width: None,
            height: None,
            uploaded_at: now,
            updated_at: now,
            scheduled_deletion: None,
        };

        let json = serde_json::to_value(PhotoDetails::from(photo)).unwrap();
        assert_eq!(json["tags"], serde_json::json!([]));
        assert!(json.get("rawPhotoId").is_some());
        assert!(json.get("thumbnailUrl").is_some());
        assert!(json.get("caption").is_none());
        assert!(json.get("scheduleDeletion").is_none());
    }
}
