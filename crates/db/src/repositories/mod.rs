//! Repository layer: one zero-sized repo per table, all taking `&PgPool`.

mod like_repo;
mod photo_repo;
mod raw_photo_repo;

pub use like_repo::LikeRepo;
pub use photo_repo::PhotoRepo;
pub use raw_photo_repo::RawPhotoRepo;
