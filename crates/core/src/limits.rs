//! Upload size policy.

use crate::error::CoreError;

/// Default maximum upload size in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Maximum accepted payload size for a single photo upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl UploadLimits {
    /// Build limits from a size in megabytes (1 MB = 1 MiB).
    pub fn from_megabytes(mb: u64) -> Self {
        Self {
            max_bytes: mb.saturating_mul(BYTES_PER_MB),
        }
    }

    /// Configured maximum, rounded down to whole megabytes.
    pub fn max_megabytes(&self) -> u64 {
        self.max_bytes / BYTES_PER_MB
    }

    /// Fail with [`CoreError::TooLarge`] if `len` exceeds the maximum.
    ///
    /// A payload of exactly `max_bytes` is accepted.
    pub fn check_size(&self, len: u64) -> Result<(), CoreError> {
        if len > self.max_bytes {
            Err(CoreError::TooLarge {
                max_bytes: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from_megabytes(DEFAULT_MAX_UPLOAD_MB)
    }
}
