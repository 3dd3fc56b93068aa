use async_trait::async_trait;
use jelly_core::types::{PhotoId, Timestamp};
use sqlx::PgPool;

use super::{MetadataError, MetadataResult, MetadataStore};
use crate::models::photo::{Photo, RawPhoto, RawPhotoPatch};
use crate::repositories::{PhotoRepo, RawPhotoRepo};

/// [`MetadataStore`] backed by Postgres via the repository layer.
#[derive(Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Classify constraint violations apart from other database failures.
fn classify(err: sqlx::Error) -> MetadataError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            return MetadataError::Constraint(db_err.message().to_string());
        }
    }
    if matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) {
        return MetadataError::Unavailable(err.to_string());
    }
    MetadataError::Database(err)
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn insert_raw_photo(&self, raw: &RawPhoto) -> MetadataResult<RawPhoto> {
        RawPhotoRepo::create(&self.pool, raw).await.map_err(classify)
    }

    async fn update_raw_photo(
        &self,
        id: PhotoId,
        patch: &RawPhotoPatch,
    ) -> MetadataResult<Option<RawPhoto>> {
        RawPhotoRepo::update(&self.pool, id, patch)
            .await
            .map_err(classify)
    }

    async fn get_raw_photo_by_id(&self, id: PhotoId) -> MetadataResult<Option<RawPhoto>> {
        RawPhotoRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn mark_raw_photo_processed(
        &self,
        id: PhotoId,
        at: Timestamp,
    ) -> MetadataResult<Option<RawPhoto>> {
        RawPhotoRepo::mark_processed(&self.pool, id, at)
            .await
            .map_err(classify)
    }

    async fn insert_photo(&self, photo: &Photo) -> MetadataResult<Photo> {
        PhotoRepo::create(&self.pool, photo).await.map_err(classify)
    }

    async fn get_photo_by_id(&self, id: PhotoId) -> MetadataResult<Option<Photo>> {
        PhotoRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn update_photo(&self, photo: &Photo) -> MetadataResult<Option<Photo>> {
        PhotoRepo::update(&self.pool, photo).await.map_err(classify)
    }

    async fn delete_photo(&self, id: PhotoId, after: chrono::Duration) -> MetadataResult<bool> {
        let at = chrono::Utc::now() + after;
        PhotoRepo::schedule_deletion(&self.pool, id, at)
            .await
            .map_err(classify)
    }

    fn store_name(&self) -> &'static str {
        "postgres"
    }
}
