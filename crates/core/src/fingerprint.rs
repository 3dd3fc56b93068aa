//! Content-type sniffing, accepted-type policy and photo fingerprints.
//!
//! The sniffer only looks at a short prefix of the payload, so it is cheap
//! enough to run on every upload before anything touches storage.

use std::io::Cursor;

use crate::error::CoreError;
use crate::hashing::sha256_hex;

// ---------------------------------------------------------------------------
// MIME constants
// ---------------------------------------------------------------------------

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_WEBP: &str = "image/webp";
pub const MIME_BMP: &str = "image/bmp";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain; charset=utf-8";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// Image types the service accepts for ingestion.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[MIME_JPEG, MIME_PNG];

/// Number of leading bytes considered when sniffing.
pub const SNIFF_LEN: usize = 512;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const BMP_MAGIC: &[u8] = b"BM";
const PDF_MAGIC: &[u8] = b"%PDF-";

// ---------------------------------------------------------------------------
// Sniffing
// ---------------------------------------------------------------------------

/// Detect the MIME type of `data` from its leading bytes.
///
/// Unknown binary content maps to `application/octet-stream`; content with
/// no binary control bytes (including an empty payload) maps to plain text.
pub fn detect_mime(data: &[u8]) -> &'static str {
    let prefix = &data[..data.len().min(SNIFF_LEN)];

    if prefix.starts_with(JPEG_MAGIC) {
        return MIME_JPEG;
    }
    if prefix.starts_with(PNG_MAGIC) {
        return MIME_PNG;
    }
    if prefix.starts_with(GIF87_MAGIC) || prefix.starts_with(GIF89_MAGIC) {
        return MIME_GIF;
    }
    if prefix.len() >= 14 && prefix.starts_with(b"RIFF") && &prefix[8..14] == b"WEBPVP" {
        return MIME_WEBP;
    }
    if prefix.starts_with(BMP_MAGIC) {
        return MIME_BMP;
    }
    if prefix.starts_with(PDF_MAGIC) {
        return MIME_PDF;
    }
    if prefix.iter().all(|b| !is_binary_byte(*b)) {
        return MIME_TEXT;
    }
    MIME_OCTET_STREAM
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Reject anything outside [`ACCEPTED_MIME_TYPES`].
pub fn ensure_accepted(mime: &str) -> Result<(), CoreError> {
    if ACCEPTED_MIME_TYPES.contains(&mime) {
        Ok(())
    } else {
        Err(CoreError::UnsupportedType {
            mime: mime.to_string(),
        })
    }
}

/// Read pixel dimensions from the image header without decoding pixels.
///
/// Returns `None` when the header is truncated or not a known format.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// MIME type and content hash of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub mime_type: &'static str,
    pub content_hash: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Sniff, validate and hash `data`.
///
/// Fails with [`CoreError::UnsupportedType`] before hashing if the payload
/// is not an accepted image type.
pub fn fingerprint(data: &[u8]) -> Result<Fingerprint, CoreError> {
    let mime_type = detect_mime(data);
    ensure_accepted(mime_type)?;

    let dimensions = image_dimensions(data);
    Ok(Fingerprint {
        mime_type,
        content_hash: sha256_hex(data),
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// Smallest valid PNG: 1x1, 8-bit greyscale.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x00, 0x00, 0x00,
        0x00, 0x3A, 0x7E, 0x9B, 0x55, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x48, 0xAF, 0xA4, 0x71, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn detects_jpeg_from_three_byte_signature() {
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF]), MIME_JPEG);
    }

    #[test]
    fn detects_png() {
        assert_eq!(detect_mime(TINY_PNG), MIME_PNG);
    }

    #[test]
    fn detects_other_known_formats() {
        assert_eq!(detect_mime(b"GIF89a\x01\x00"), MIME_GIF);
        assert_eq!(detect_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), MIME_WEBP);
        assert_eq!(detect_mime(b"%PDF-1.7\n"), MIME_PDF);
    }

    #[test]
    fn empty_payload_is_text() {
        assert_eq!(detect_mime(b""), MIME_TEXT);
    }

    #[test]
    fn plain_text_and_binary() {
        assert_eq!(detect_mime(b"fake image data"), MIME_TEXT);
        assert_eq!(detect_mime(&[0x00, 0x01, 0x02, 0x03]), MIME_OCTET_STREAM);
    }

    #[test]
    fn only_jpeg_and_png_are_accepted() {
        assert!(ensure_accepted(MIME_JPEG).is_ok());
        assert!(ensure_accepted(MIME_PNG).is_ok());
        assert_matches!(
            ensure_accepted(MIME_GIF),
            Err(CoreError::UnsupportedType { mime }) if mime == MIME_GIF
        );
        assert_matches!(
            ensure_accepted(MIME_TEXT),
            Err(CoreError::UnsupportedType { .. })
        );
    }

    #[test]
    fn fingerprint_reads_png_dimensions() {
        let fp = fingerprint(TINY_PNG).unwrap();
        assert_eq!(fp.mime_type, MIME_PNG);
        assert_eq!(fp.width, Some(1));
        assert_eq!(fp.height, Some(1));
        assert_eq!(fp.content_hash, sha256_hex(TINY_PNG));
    }

    #[test]
    fn fingerprint_tolerates_truncated_jpeg_header() {
        let fp = fingerprint(&[0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(fp.mime_type, MIME_JPEG);
        assert_eq!(fp.width, None);
        assert_eq!(fp.height, None);
    }

    #[test]
    fn fingerprint_rejects_empty_payload() {
        assert_matches!(fingerprint(b""), Err(CoreError::UnsupportedType { .. }));
    }
}
