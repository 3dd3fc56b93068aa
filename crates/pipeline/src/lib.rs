//! Photo ingestion and retrieval use cases.
//!
//! [`ingest::IngestPipeline`] drives an upload from raw bytes to durable
//! metadata, scheduling a compensating deletion when any step after
//! fingerprinting fails. [`retrieval`] serves stored records as the
//! camelCase DTOs in [`dto`].

pub mod dto;
pub mod error;
pub mod ingest;
pub mod retrieval;
pub mod transform;

pub use error::PipelineError;
pub use ingest::{IngestOutcome, IngestPipeline, IngestSettings, IngestState, UploadRequest};
pub use transform::{PhotoTransformer, TransformError, TransformedPhoto};
