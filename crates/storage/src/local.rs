//! Filesystem storage backend.
//!
//! Objects live at `{root}/{key}`. Writes go to a temporary sibling file and
//! are renamed into place, so readers never observe a partially written
//! object and concurrent writers to one key resolve as last-writer-wins.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    expiry_timestamp, public_url, validate_key, validate_ttl, validate_upload, ObjectStorage,
    StorageError, StorageResult,
};

type HmacSha256 = Hmac<Sha256>;

/// Storage backend rooted at a local directory.
///
/// Presigned URLs carry an `expires` unix timestamp and an HMAC-SHA256
/// signature over `"{key}\n{expires}"`, for the file server in front of the
/// directory to check.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
    mac: HmacSha256,
}

impl LocalStorage {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
        signing_key: &[u8],
    ) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        let mac = HmacSha256::new_from_slice(signing_key)
            .map_err(|e| StorageError::backend("initialise signer", e))?;

        Ok(Self {
            root,
            base_url: base_url.into(),
            mac,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a path under the root, refusing anything that could
    /// escape it.
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn signature(&self, key: &str, expires: i64) -> String {
        let mut mac = self.mac.clone();
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        format!("{:x}", mac.finalize().into_bytes())
    }
}

#[async_trait::async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<String> {
        validate_upload(key, data)?;
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        if let Err(err) = tokio::fs::write(&tmp, data).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        tracing::debug!(key, size = data.len(), content_type, "Stored object on local disk");
        Ok(public_url(&self.base_url, key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                key: key.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        self.resolve(key)?;
        validate_ttl(ttl)?;

        let expires = expiry_timestamp(ttl);
        let signature = self.signature(key, expires);
        Ok(format!(
            "{}?expires={expires}&signature={signature}",
            public_url(&self.base_url, key)
        ))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
