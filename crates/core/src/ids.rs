//! Identifier minting and parsing.

use crate::error::CoreError;
use crate::types::PhotoId;

/// Mint a fresh, random photo identifier.
pub fn new_photo_id() -> PhotoId {
    uuid::Uuid::new_v4()
}

/// Parse a path-supplied identifier, rejecting anything that is not a UUID.
pub fn parse_photo_id(raw: &str) -> Result<PhotoId, CoreError> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|_| CoreError::InvalidId(raw.to_string()))
}
