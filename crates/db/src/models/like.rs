//! Photo like model.

use jelly_core::types::{PhotoId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `photo_likes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PhotoLike {
    pub user_id: String,
    pub photo_id: PhotoId,
    pub created_at: Timestamp,
}
