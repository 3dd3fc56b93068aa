//! Read-side use cases for stored photos.

use jelly_core::error::CoreError;
use jelly_core::ids::parse_photo_id;
use jelly_db::store::MetadataStore;

use crate::dto::{PhotoDetails, RawPhotoDetails};
use crate::error::PipelineError;

/// Look up a processed photo by its textual id.
///
/// The id is validated before the store is queried.
pub async fn get_photo(store: &dyn MetadataStore, id: &str) -> Result<PhotoDetails, PipelineError> {
    let photo_id = parse_photo_id(id)?;
    let photo = store
        .get_photo_by_id(photo_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "photo",
            id: photo_id.to_string(),
        })?;
    Ok(photo.into())
}

/// Look up a raw photo by its textual id.
pub async fn get_raw_photo(
    store: &dyn MetadataStore,
    id: &str,
) -> Result<RawPhotoDetails, PipelineError> {
    let photo_id = parse_photo_id(id)?;
    let raw = store
        .get_raw_photo_by_id(photo_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "raw photo",
            id: photo_id.to_string(),
        })?;
    Ok(raw.into())
}
