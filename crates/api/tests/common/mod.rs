#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use jelly_api::config::{PhotoConfig, ServerConfig, StorageConfig, StorageKind};
use jelly_api::router::build_app_router;
use jelly_api::state::AppState;
use jelly_db::store::InMemoryMetadataStore;
use jelly_pipeline::IngestPipeline;
use jelly_storage::MemoryStorage;

pub const BOUNDARY: &str = "jelly-test-boundary";

/// Three-byte JPEG signature: sniffs as `image/jpeg` but has no readable
/// header.
pub const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Build a test `ServerConfig`: local environment, in-memory storage.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        environment: "local".to_string(),
        database_url: None,
        photo: PhotoConfig {
            max_file_size_mb: 10,
            deletion_grace_days: 7,
        },
        storage: StorageConfig {
            kind: StorageKind::Memory,
            local_path: PathBuf::from("./unused"),
            s3_bucket: None,
            s3_region: None,
            public_base_url: None,
            signing_secret: "test-secret".to_string(),
        },
    }
}

/// The application router plus handles on its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub storage: Arc<MemoryStorage>,
    pub store: Arc<InMemoryMetadataStore>,
}

impl TestApp {
    /// A fresh clone of the router, ready for `oneshot`.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with_config(test_config())
}

/// Build the full application router with all middleware layers, backed by
/// in-memory storage and metadata.
pub fn build_test_app_with_config(config: ServerConfig) -> TestApp {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(InMemoryMetadataStore::new());
    let pipeline = IngestPipeline::new(storage.clone(), store.clone(), config.ingest_settings());

    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline,
    };

    TestApp {
        router: build_app_router(state, &config),
        storage,
        store,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
}

/// Encode `parts` as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Upload `data` as `file` with the given caption and tags.
pub async fn upload(app: Router, data: &[u8], caption: &str, tags: &[&str]) -> Response<Body> {
    let mut parts = vec![
        Part::File {
            name: "file",
            filename: "photo.jpg",
            data,
        },
        Part::Text("caption", caption),
    ];
    parts.extend(tags.iter().map(|t| Part::Text("tags", t)));
    post_multipart(app, "/photo", &parts).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
