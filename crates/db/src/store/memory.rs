use std::collections::HashMap;

use async_trait::async_trait;
use jelly_core::types::{PhotoId, Timestamp};
use tokio::sync::RwLock;

use super::{MetadataError, MetadataResult, MetadataStore};
use crate::models::photo::{Photo, RawPhoto, RawPhotoPatch};

#[derive(Default)]
struct Tables {
    raw_photos: HashMap<PhotoId, RawPhoto>,
    photos: HashMap<PhotoId, Photo>,
}

/// In-process [`MetadataStore`] with the same constraint checks as the
/// Postgres schema (unique ids, `photos.raw_photo_id` must exist).
#[derive(Default)]
pub struct InMemoryMetadataStore {
    tables: RwLock<Tables>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn raw_photo_count(&self) -> usize {
        self.tables.read().await.raw_photos.len()
    }

    pub async fn photo_count(&self) -> usize {
        self.tables.read().await.photos.len()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert_raw_photo(&self, raw: &RawPhoto) -> MetadataResult<RawPhoto> {
        let mut tables = self.tables.write().await;
        if tables.raw_photos.contains_key(&raw.id) {
            return Err(MetadataError::Constraint(format!(
                "raw photo {} already exists",
                raw.id
            )));
        }
        tables.raw_photos.insert(raw.id, raw.clone());
        Ok(raw.clone())
    }

    async fn update_raw_photo(
        &self,
        id: PhotoId,
        patch: &RawPhotoPatch,
    ) -> MetadataResult<Option<RawPhoto>> {
        let mut tables = self.tables.write().await;
        Ok(tables.raw_photos.get_mut(&id).map(|raw| {
            patch.apply_to(raw);
            raw.clone()
        }))
    }

    async fn get_raw_photo_by_id(&self, id: PhotoId) -> MetadataResult<Option<RawPhoto>> {
        Ok(self.tables.read().await.raw_photos.get(&id).cloned())
    }

    async fn mark_raw_photo_processed(
        &self,
        id: PhotoId,
        at: Timestamp,
    ) -> MetadataResult<Option<RawPhoto>> {
        let mut tables = self.tables.write().await;
        Ok(tables.raw_photos.get_mut(&id).map(|raw| {
            raw.processed_at = Some(at);
            raw.scheduled_deletion = None;
            raw.clone()
        }))
    }

    async fn insert_photo(&self, photo: &Photo) -> MetadataResult<Photo> {
        let mut tables = self.tables.write().await;
        if !tables.raw_photos.contains_key(&photo.raw_photo_id) {
            return Err(MetadataError::Constraint(format!(
                "raw photo {} does not exist",
                photo.raw_photo_id
            )));
        }
        if tables.photos.contains_key(&photo.id) {
            return Err(MetadataError::Constraint(format!(
                "photo {} already exists",
                photo.id
            )));
        }
        tables.photos.insert(photo.id, photo.clone());
        Ok(photo.clone())
    }

    async fn get_photo_by_id(&self, id: PhotoId) -> MetadataResult<Option<Photo>> {
        Ok(self.tables.read().await.photos.get(&id).cloned())
    }

    async fn update_photo(&self, photo: &Photo) -> MetadataResult<Option<Photo>> {
        let mut tables = self.tables.write().await;
        Ok(tables.photos.get_mut(&photo.id).map(|stored| {
            stored.filename = photo.filename.clone();
            stored.original_url = photo.original_url.clone();
            stored.thumbnail_url = photo.thumbnail_url.clone();
            stored.caption = photo.caption.clone();
            stored.tags = photo.tags.clone();
            stored.width = photo.width;
            stored.height = photo.height;
            stored.updated_at = chrono::Utc::now();
            stored.clone()
        }))
    }

    async fn delete_photo(&self, id: PhotoId, after: chrono::Duration) -> MetadataResult<bool> {
        let now = chrono::Utc::now();
        let mut tables = self.tables.write().await;
        match tables.photos.get_mut(&id) {
            Some(photo) => {
                photo.scheduled_deletion.get_or_insert(now + after);
                photo.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
