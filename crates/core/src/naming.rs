//! Storage key naming convention.
//!
//! Keys are derived from the photo identifier only, never from the uploaded
//! filename, so two uploads of the same file always land on distinct keys.
//!
//! Convention: `{prefix}/{id}.{ext}` where `prefix` is one of `raw`,
//! `photos` or `thumbnails`.

use crate::fingerprint::{MIME_JPEG, MIME_PNG};
use crate::types::PhotoId;

pub const RAW_PREFIX: &str = "raw";
pub const PROCESSED_PREFIX: &str = "photos";
pub const THUMBNAIL_PREFIX: &str = "thumbnails";

/// File extension for a MIME type; `bin` for anything unrecognised.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        MIME_JPEG => "jpg",
        MIME_PNG => "png",
        _ => "bin",
    }
}

/// Key for the original, as-uploaded bytes.
///
/// ```
/// use jelly_core::naming::raw_photo_key;
///
/// let id = uuid::Uuid::nil();
/// assert_eq!(
///     raw_photo_key(id, "image/jpeg"),
///     "raw/00000000-0000-0000-0000-000000000000.jpg"
/// );
/// ```
pub fn raw_photo_key(id: PhotoId, mime: &str) -> String {
    key(RAW_PREFIX, id, mime)
}

/// Key for the processed, servable image.
pub fn processed_photo_key(id: PhotoId, mime: &str) -> String {
    key(PROCESSED_PREFIX, id, mime)
}

/// Key for the thumbnail of a processed image.
pub fn thumbnail_key(id: PhotoId, mime: &str) -> String {
    key(THUMBNAIL_PREFIX, id, mime)
}

fn key(prefix: &str, id: PhotoId, mime: &str) -> String {
    format!("{prefix}/{id}.{}", extension_for_mime(mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_prefix_and_extension() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            processed_photo_key(id, MIME_PNG),
            "photos/00000000-0000-0000-0000-000000000000.png"
        );
        assert_eq!(
            thumbnail_key(id, MIME_JPEG),
            "thumbnails/00000000-0000-0000-0000-000000000000.jpg"
        );
    }

    #[test]
    fn unknown_mime_gets_bin_extension() {
        assert_eq!(extension_for_mime("image/gif"), "bin");
    }

    #[test]
    fn distinct_ids_give_distinct_keys() {
        let a = uuid::Uuid::new_v4();
        let b = uuid::Uuid::new_v4();
        assert_ne!(raw_photo_key(a, MIME_JPEG), raw_photo_key(b, MIME_JPEG));
    }
}
