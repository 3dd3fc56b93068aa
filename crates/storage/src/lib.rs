//! Object storage abstraction for photo bytes.
//!
//! The [`ObjectStorage`] trait is the only thing the ingestion pipeline knows
//! about where bytes live. Production wiring picks one backend at process
//! start; tests inject [`MemoryStorage`].
//!
//! | Backend          | Use                                      |
//! |------------------|------------------------------------------|
//! | [`S3Storage`]    | Amazon S3 or a compatible service        |
//! | [`LocalStorage`] | Local filesystem (single-node, dev)      |
//! | [`MemoryStorage`]| In-process map (tests, `local` env)      |

mod error;
mod local;
mod memory;
mod s3;

use std::time::Duration;

pub use error::StorageError;
pub use local::LocalStorage;
pub use memory::{MemoryStorage, StoredObject};
pub use s3::S3Storage;

/// Content type recorded when the caller does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Convenience alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;

/// Capability interface over opaque byte payloads keyed by string path.
///
/// Implementations must be safe to share between concurrent requests.
/// Concurrent uploads to distinct keys never interfere; two writers to the
/// same key resolve as last-writer-wins.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key` and return its stable public URL.
    ///
    /// Fails with [`StorageError::EmptyKey`] or [`StorageError::EmptyPayload`]
    /// before contacting the backend.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<String>;

    /// Fetch the bytes stored under `key`.
    ///
    /// Fails with [`StorageError::NotFound`] if the key is absent.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object under `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether an object exists under `key`.
    ///
    /// Absence is `Ok(false)`; only transport or permission failures error.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Issue a time-limited URL for `key`, valid until `now + ttl`.
    ///
    /// Fails with [`StorageError::InvalidExpiration`] when `ttl` is zero.
    async fn presigned_url(&self, key: &str, ttl: Duration) -> StorageResult<String>;

    /// Short backend name used in logs.
    fn backend_name(&self) -> &'static str;
}

/// Shared argument checks for [`ObjectStorage::upload`].
pub(crate) fn validate_upload(key: &str, data: &[u8]) -> StorageResult<()> {
    validate_key(key)?;
    if data.is_empty() {
        return Err(StorageError::EmptyPayload);
    }
    Ok(())
}

pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        Err(StorageError::EmptyKey)
    } else {
        Ok(())
    }
}

pub(crate) fn validate_ttl(ttl: Duration) -> StorageResult<()> {
    if ttl.is_zero() {
        Err(StorageError::InvalidExpiration)
    } else {
        Ok(())
    }
}

/// Join a base URL and a key with exactly one slash between them.
pub(crate) fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Unix timestamp (seconds) at which a URL issued now with `ttl` expires.
pub(crate) fn expiry_timestamp(ttl: Duration) -> i64 {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    chrono::Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
        .timestamp()
}
