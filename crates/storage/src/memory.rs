//! In-process storage backend.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::{
    expiry_timestamp, public_url, validate_key, validate_ttl, validate_upload, ObjectStorage,
    StorageError, StorageResult, DEFAULT_CONTENT_TYPE,
};

const DEFAULT_BASE_URL: &str = "memory://objects";

/// An object held by [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Storage backend backed by a `HashMap` behind an async `RwLock`.
///
/// Nothing is persisted across restarts.
#[derive(Debug)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    /// Copy of the object under `key`, including its content type.
    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<String> {
        validate_upload(key, data)?;
        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(public_url(&self.base_url, key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        validate_key(key)?;
        validate_ttl(ttl)?;
        let expires = expiry_timestamp(ttl);
        Ok(format!("{}?expires={expires}", public_url(&self.base_url, key)))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn upload_then_download_round_trips() {
        let storage = MemoryStorage::new();
        let url = storage
            .upload("raw/a.jpg", &[0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "memory://objects/raw/a.jpg");
        assert_eq!(storage.download("raw/a.jpg").await.unwrap(), vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(
            storage.object("raw/a.jpg").await.unwrap().content_type,
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn empty_content_type_defaults_to_octet_stream() {
        let storage = MemoryStorage::new();
        storage.upload("k", b"data", "").await.unwrap();
        assert_eq!(
            storage.object("k").await.unwrap().content_type,
            DEFAULT_CONTENT_TYPE
        );
    }

    #[tokio::test]
    async fn invalid_upload_arguments_store_nothing() {
        let storage = MemoryStorage::new();
        assert_matches!(storage.upload("", b"x", "").await, Err(StorageError::EmptyKey));
        assert_matches!(storage.upload("k", b"", "").await, Err(StorageError::EmptyPayload));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn missing_key_is_not_found_and_not_existing() {
        let storage = MemoryStorage::new();
        assert_matches!(
            storage.download("nope").await,
            Err(StorageError::NotFound { key }) if key == "nope"
        );
        assert!(!storage.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.upload("k", b"data", "text/plain").await.unwrap();
        storage.delete("k").await.unwrap();
        storage.delete("k").await.unwrap();
        assert!(!storage.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn same_key_is_last_writer_wins() {
        let storage = MemoryStorage::new();
        storage.upload("k", b"first", "").await.unwrap();
        storage.upload("k", b"second", "").await.unwrap();
        assert_eq!(storage.download("k").await.unwrap(), b"second");
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_uploads_to_distinct_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move {
                    storage
                        .upload(&format!("k{i}"), format!("v{i}").as_bytes(), "")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(storage.len().await, 16);
        assert_eq!(storage.download("k7").await.unwrap(), b"v7");
    }

    #[tokio::test]
    async fn presign_rejects_zero_ttl() {
        let storage = MemoryStorage::new();
        assert_matches!(
            storage.presigned_url("k", Duration::ZERO).await,
            Err(StorageError::InvalidExpiration)
        );
        let url = storage
            .presigned_url("k", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("memory://objects/k?expires="));
    }
}
