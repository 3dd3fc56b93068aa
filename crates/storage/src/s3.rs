//! Amazon S3 storage backend.

use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use sha2::{Digest, Sha256};

use crate::{
    public_url, validate_key, validate_ttl, validate_upload, ObjectStorage, StorageError,
    StorageResult, DEFAULT_CONTENT_TYPE,
};

/// Storage backend for an S3 bucket.
///
/// Objects are written with a public-read ACL; the returned URL is either the
/// bucket's virtual-hosted endpoint or a custom base URL (e.g. a CDN domain).
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    base_url: String,
}

impl S3Storage {
    /// Wrap an existing client, serving objects from the bucket endpoint
    /// `https://{bucket}.s3.{region}.amazonaws.com`.
    pub fn new(client: Client, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let region = region.into();
        let base_url = format!("https://{bucket}.s3.{region}.amazonaws.com");
        Self {
            client,
            bucket,
            region,
            base_url,
        }
    }

    /// Wrap an existing client, serving objects from `base_url` instead of
    /// the bucket endpoint. A trailing slash is ignored.
    pub fn with_custom_url(
        client: Client,
        bucket: impl Into<String>,
        region: impl Into<String>,
        base_url: &str,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the default AWS credential chain for `region`.
    pub async fn connect(bucket: &str, region: &str, base_url: Option<&str>) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let client = Client::new(&shared);

        match base_url {
            Some(url) => Self::with_custom_url(client, bucket, region, url),
            None => Self::new(client, bucket, region),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Base64 SHA-256 of `data`, as S3 expects in `x-amz-checksum-sha256`.
///
/// Decodes to the same digest as the hex `content_hash` kept in metadata.
fn sha256_base64(data: &[u8]) -> String {
    BASE64_STANDARD.encode(Sha256::digest(data))
}

fn sdk_failure<E>(operation: &'static str, err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::backend(operation, DisplayErrorContext(&err))
}

#[async_trait::async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<String> {
        validate_upload(key, data)?;
        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .checksum_sha256(sha256_base64(data))
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| sdk_failure("upload", e))?;

        tracing::debug!(bucket = %self.bucket, key, size = data.len(), "Uploaded object to S3");
        Ok(public_url(&self.base_url, key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(GetObjectError::is_no_such_key) => {
                return Err(StorageError::NotFound {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(sdk_failure("download", err)),
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| sdk_failure("read object body", e))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;

        // S3 reports success for absent keys, which gives idempotence for free.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_failure("delete", e))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(HeadObjectError::is_not_found) => {
                Ok(false)
            }
            Err(err) => Err(sdk_failure("check object existence", err)),
        }
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        validate_key(key)?;
        validate_ttl(ttl)?;

        // S3 caps presigned URLs at one week.
        let config = PresigningConfig::expires_in(ttl).map_err(|_| StorageError::InvalidExpiration)?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| sdk_failure("presign", e))?;
        Ok(request.uri().to_string())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use aws_sdk_s3::config::Credentials;

    use super::*;

    /// Client with static credentials; never contacted by these tests.
    fn offline_client(region: &str) -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new("AKIDTEST", "SECRETTEST", None, None, "test"))
            .build();
        Client::from_conf(config)
    }

    #[test]
    fn default_base_url_uses_bucket_endpoint() {
        let cases = [
            ("test-bucket", "us-east-1", "https://test-bucket.s3.us-east-1.amazonaws.com"),
            ("my-photos", "eu-west-1", "https://my-photos.s3.eu-west-1.amazonaws.com"),
        ];
        for (bucket, region, expected) in cases {
            let storage = S3Storage::new(offline_client(region), bucket, region);
            assert_eq!(storage.bucket(), bucket);
            assert_eq!(storage.region(), region);
            assert_eq!(storage.base_url(), expected);
        }
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let storage = S3Storage::with_custom_url(
            offline_client("us-west-2"),
            "photos",
            "us-west-2",
            "https://photos.example.com/",
        );
        assert_eq!(storage.base_url(), "https://photos.example.com");
    }

    #[test]
    fn upload_checksum_is_base64_sha256() {
        assert_eq!(
            sha256_base64(b""),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );

        let decoded = BASE64_STANDARD.decode(sha256_base64(b"abc")).unwrap();
        let hex: String = decoded.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(
            hex,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn invalid_arguments_fail_before_any_request() {
        let storage = S3Storage::new(offline_client("us-east-1"), "b", "us-east-1");

        assert_matches!(storage.upload("", b"x", "").await, Err(StorageError::EmptyKey));
        assert_matches!(storage.upload("k", b"", "").await, Err(StorageError::EmptyPayload));
        assert_matches!(storage.download("").await, Err(StorageError::EmptyKey));
        assert_matches!(storage.delete("").await, Err(StorageError::EmptyKey));
        assert_matches!(storage.exists("").await, Err(StorageError::EmptyKey));
        assert_matches!(
            storage.presigned_url("k", Duration::ZERO).await,
            Err(StorageError::InvalidExpiration)
        );
    }

    #[tokio::test]
    async fn presigned_url_is_signed_locally() {
        let storage = S3Storage::new(offline_client("us-east-1"), "test-bucket", "us-east-1");

        let url = storage
            .presigned_url("raw/photo.jpg", Duration::from_secs(900))
            .await
            .unwrap();

        assert!(url.contains("test-bucket"));
        assert!(url.contains("raw/photo.jpg"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn presign_beyond_one_week_is_invalid() {
        let storage = S3Storage::new(offline_client("us-east-1"), "b", "us-east-1");
        assert_matches!(
            storage
                .presigned_url("k", Duration::from_secs(8 * 24 * 60 * 60))
                .await,
            Err(StorageError::InvalidExpiration)
        );
    }
}
