//! Repository tests against a real Postgres database.
//!
//! Ignored by default; run with `DATABASE_URL` set and `--ignored`.

use chrono::{Duration, Utc};
use jelly_db::models::photo::{Photo, RawPhoto, RawPhotoPatch};
use jelly_db::repositories::{LikeRepo, PhotoRepo, RawPhotoRepo};
use jelly_db::store::{MetadataError, MetadataStore, PgMetadataStore};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_raw_photo() -> RawPhoto {
    let id = Uuid::new_v4();
    RawPhoto {
        id,
        user_id: Some("user-1".to_string()),
        original_filename: "beach.jpg".to_string(),
        storage_key: format!("raw/{id}.jpg"),
        storage_url: format!("http://localhost/raw/{id}.jpg"),
        file_size: 2048,
        mime_type: "image/jpeg".to_string(),
        content_hash: "cd".repeat(32),
        width: None,
        height: None,
        exif_data: None,
        uploaded_at: Utc::now(),
        processed_at: None,
        scheduled_deletion: None,
    }
}

fn new_photo(raw: &RawPhoto) -> Photo {
    let id = Uuid::new_v4();
    Photo {
        id,
        raw_photo_id: raw.id,
        user_id: raw.user_id.clone(),
        filename: raw.original_filename.clone(),
        original_url: format!("http://localhost/photos/{id}.jpg"),
        thumbnail_url: format!("http://localhost/thumbnails/{id}.jpg"),
        caption: Some("sunset".to_string()),
        tags: vec!["beach".to_string(), "sun".to_string()],
        file_size: raw.file_size,
        mime_type: raw.mime_type.clone(),
        width: Some(800),
        height: Some(600),
        uploaded_at: raw.uploaded_at,
        updated_at: raw.uploaded_at,
        scheduled_deletion: None,
    }
}

// ---------------------------------------------------------------------------
// Raw photos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn raw_photo_create_and_find(pool: PgPool) {
    let raw = new_raw_photo();
    let created = RawPhotoRepo::create(&pool, &raw).await.unwrap();
    assert_eq!(created.id, raw.id);
    assert_eq!(created.content_hash, raw.content_hash);

    let found = RawPhotoRepo::find_by_id(&pool, raw.id).await.unwrap();
    assert!(found.is_some());
    assert!(RawPhotoRepo::find_by_id(&pool, Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn raw_photo_patch_is_sparse(pool: PgPool) {
    let raw = new_raw_photo();
    RawPhotoRepo::create(&pool, &raw).await.unwrap();

    let at = Utc::now() + Duration::days(7);
    RawPhotoRepo::update(&pool, raw.id, &RawPhotoPatch::schedule_deletion(at))
        .await
        .unwrap();
    let patched = RawPhotoRepo::update(
        &pool,
        raw.id,
        &RawPhotoPatch {
            width: Some(640),
            ..RawPhotoPatch::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(patched.width, Some(640));
    assert_eq!(patched.storage_key, raw.storage_key);
    assert!(patched.scheduled_deletion.is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn mark_processed_clears_schedule(pool: PgPool) {
    let raw = new_raw_photo();
    RawPhotoRepo::create(&pool, &raw).await.unwrap();
    RawPhotoRepo::update(&pool, raw.id, &RawPhotoPatch::schedule_deletion(Utc::now()))
        .await
        .unwrap();

    let processed = RawPhotoRepo::mark_processed(&pool, raw.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert!(processed.processed_at.is_some());
    assert!(processed.scheduled_deletion.is_none());
}

// ---------------------------------------------------------------------------
// Photos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn photo_update_and_schedule_deletion(pool: PgPool) {
    let raw = new_raw_photo();
    RawPhotoRepo::create(&pool, &raw).await.unwrap();
    let photo = PhotoRepo::create(&pool, &new_photo(&raw)).await.unwrap();

    let mut edited = photo.clone();
    edited.caption = Some("dusk".to_string());
    edited.tags = vec!["sun".to_string(), "beach".to_string(), "sun".to_string()];
    let updated = PhotoRepo::update(&pool, &edited).await.unwrap().unwrap();
    assert_eq!(updated.caption.as_deref(), Some("dusk"));
    assert_eq!(updated.tags, edited.tags);

    assert!(PhotoRepo::schedule_deletion(&pool, photo.id, Utc::now())
        .await
        .unwrap());
    let still_there = PhotoRepo::find_by_id(&pool, photo.id).await.unwrap().unwrap();
    assert!(still_there.scheduled_deletion.is_some());

    assert!(!PhotoRepo::schedule_deletion(&pool, Uuid::new_v4(), Utc::now())
        .await
        .unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn store_maps_missing_raw_photo_to_constraint(pool: PgPool) {
    let store = PgMetadataStore::new(pool);
    let orphan = new_photo(&new_raw_photo());

    let err = store.insert_photo(&orphan).await.unwrap_err();
    assert!(matches!(err, MetadataError::Constraint(_)));
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn like_is_idempotent_per_user(pool: PgPool) {
    let raw = new_raw_photo();
    RawPhotoRepo::create(&pool, &raw).await.unwrap();
    let photo = PhotoRepo::create(&pool, &new_photo(&raw)).await.unwrap();

    assert!(LikeRepo::like(&pool, "alice", photo.id).await.unwrap());
    assert!(!LikeRepo::like(&pool, "alice", photo.id).await.unwrap());
    assert!(LikeRepo::like(&pool, "bob", photo.id).await.unwrap());

    assert_eq!(LikeRepo::count_likes(&pool, photo.id).await.unwrap(), 2);
    assert!(LikeRepo::is_liked_by(&pool, "alice", photo.id).await.unwrap());
    assert_eq!(LikeRepo::list_likers(&pool, photo.id).await.unwrap().len(), 2);
    assert_eq!(
        LikeRepo::list_liked_by_user(&pool, "bob").await.unwrap(),
        vec![photo.id]
    );

    assert!(LikeRepo::unlike(&pool, "alice", photo.id).await.unwrap());
    assert!(!LikeRepo::unlike(&pool, "alice", photo.id).await.unwrap());
    assert!(!LikeRepo::is_liked_by(&pool, "alice", photo.id).await.unwrap());
}
