//! Startup wiring for the storage backend and metadata store.

use std::sync::Arc;

use jelly_db::store::{InMemoryMetadataStore, MetadataStore, PgMetadataStore};
use jelly_storage::{LocalStorage, MemoryStorage, ObjectStorage, S3Storage, StorageError};

use crate::config::{ConfigError, ServerConfig, StorageConfig, StorageKind};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage initialisation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the object storage backend selected by `STORAGE_TYPE`.
pub async fn build_storage(
    config: &StorageConfig,
    port: u16,
) -> Result<Arc<dyn ObjectStorage>, StartupError> {
    let storage: Arc<dyn ObjectStorage> = match config.kind {
        StorageKind::S3 => {
            let bucket = config
                .s3_bucket
                .as_deref()
                .ok_or(ConfigError::Missing("STORAGE_S3_BUCKET"))?;
            let region = config
                .s3_region
                .as_deref()
                .ok_or(ConfigError::Missing("STORAGE_S3_REGION"))?;
            Arc::new(S3Storage::connect(bucket, region, config.public_base_url.as_deref()).await)
        }
        StorageKind::Local => {
            let base_url = config
                .public_base_url
                .clone()
                .unwrap_or_else(|| format!("http://localhost:{port}/files"));
            Arc::new(LocalStorage::new(
                &config.local_path,
                base_url,
                config.signing_secret.as_bytes(),
            )?)
        }
        StorageKind::Memory => match &config.public_base_url {
            Some(url) => Arc::new(MemoryStorage::with_base_url(url.clone())),
            None => Arc::new(MemoryStorage::new()),
        },
    };
    tracing::info!(backend = storage.backend_name(), "Object storage ready");
    Ok(storage)
}

/// Create the metadata store: in memory for `ENVIRONMENT=local`, otherwise
/// Postgres with migrations applied.
pub async fn build_metadata_store(
    config: &ServerConfig,
) -> Result<Arc<dyn MetadataStore>, StartupError> {
    if config.is_local() {
        tracing::warn!("ENVIRONMENT=local: metadata is kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryMetadataStore::new()));
    }

    let database_url = config
        .database_url
        .as_deref()
        .ok_or(ConfigError::Missing("DATABASE_URL"))?;

    let pool = jelly_db::create_pool(database_url).await?;
    tracing::info!("Database connection pool created");

    jelly_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    jelly_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgMetadataStore::new(pool)))
}
