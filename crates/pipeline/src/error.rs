use jelly_core::error::CoreError;
use jelly_db::store::MetadataError;
use jelly_storage::StorageError;

use crate::transform::TransformError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// The spawned persistence task panicked or was cancelled.
    #[error("Ingestion task failed: {0}")]
    Task(String),
}
