//! Hook for deriving a processed image and thumbnail from a raw upload.
//!
//! No implementation ships with the service. When none is configured the
//! pipeline stops after persisting the raw photo.

use async_trait::async_trait;
use jelly_db::models::photo::RawPhoto;

/// Output of a [`PhotoTransformer`].
#[derive(Debug, Clone)]
pub struct TransformedPhoto {
    pub image: Vec<u8>,
    pub thumbnail: Vec<u8>,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("Transformation failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait PhotoTransformer: Send + Sync {
    /// Produce the servable image and thumbnail for `raw`.
    async fn transform(&self, data: &[u8], raw: &RawPhoto)
        -> Result<TransformedPhoto, TransformError>;
}
