//! Repository for the `photo_likes` table.

use jelly_core::types::PhotoId;
use sqlx::PgPool;

use crate::models::like::PhotoLike;

/// Provides like/unlike bookkeeping keyed by `(user_id, photo_id)`.
pub struct LikeRepo;

impl LikeRepo {
    /// Record a like. Returns `false` if the user already liked the photo.
    pub async fn like(pool: &PgPool, user_id: &str, photo_id: PhotoId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO photo_likes (user_id, photo_id) VALUES ($1, $2)
             ON CONFLICT (user_id, photo_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(photo_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a like. Returns `false` if there was nothing to remove.
    pub async fn unlike(
        pool: &PgPool,
        user_id: &str,
        photo_id: PhotoId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM photo_likes WHERE user_id = $1 AND photo_id = $2")
            .bind(user_id)
            .bind(photo_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All likes for a photo, oldest first.
    pub async fn list_likers(
        pool: &PgPool,
        photo_id: PhotoId,
    ) -> Result<Vec<PhotoLike>, sqlx::Error> {
        sqlx::query_as::<_, PhotoLike>(
            "SELECT user_id, photo_id, created_at FROM photo_likes
             WHERE photo_id = $1
             ORDER BY created_at ASC",
        )
        .bind(photo_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_likes(pool: &PgPool, photo_id: PhotoId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM photo_likes WHERE photo_id = $1")
            .bind(photo_id)
            .fetch_one(pool)
            .await
    }

    pub async fn is_liked_by(
        pool: &PgPool,
        user_id: &str,
        photo_id: PhotoId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM photo_likes WHERE user_id = $1 AND photo_id = $2)",
        )
        .bind(user_id)
        .bind(photo_id)
        .fetch_one(pool)
        .await
    }

    /// Ids of every photo the user has liked, most recent first.
    pub async fn list_liked_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<PhotoId>, sqlx::Error> {
        sqlx::query_scalar::<_, PhotoId>(
            "SELECT photo_id FROM photo_likes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
