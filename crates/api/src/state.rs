use std::sync::Arc;

use jelly_pipeline::IngestPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pipeline only holds `Arc`s to the storage backend
/// and metadata store created at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pipeline: IngestPipeline,
}
