use std::path::PathBuf;
use std::str::FromStr;

use jelly_core::limits::{UploadLimits, DEFAULT_MAX_UPLOAD_MB};
use jelly_pipeline::ingest::{IngestSettings, DEFAULT_DELETION_GRACE_DAYS};

/// Signing secret used for local presigned URLs when none is configured.
const DEV_SIGNING_SECRET: &str = "jelly-dev-signing-secret";

/// Longest accepted deletion grace period.
const MAX_DELETION_GRACE_DAYS: i64 = 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Which [`jelly_storage::ObjectStorage`] backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    Local,
    Memory,
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_TYPE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub local_path: PathBuf,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Overrides the backend's own public URL (e.g. a CDN in front of S3).
    pub public_base_url: Option<String>,
    pub signing_secret: String,
}

#[derive(Debug, Clone)]
pub struct PhotoConfig {
    pub max_file_size_mb: u64,
    pub deletion_grace_days: i64,
}

/// Server configuration loaded from environment variables.
///
/// Read once at startup; handlers only ever see it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deployment environment (default: `production`).
    pub environment: String,
    /// Required unless running with `ENVIRONMENT=local`.
    pub database_url: Option<String>,
    pub photo: PhotoConfig,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                     | Default                  |
    /// |-----------------------------|--------------------------|
    /// | `HOST`                      | `0.0.0.0`                |
    /// | `PORT`                      | `8080`                   |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                     |
    /// | `ENVIRONMENT`               | `production`             |
    /// | `DATABASE_URL`              | unset                    |
    /// | `PHOTO_MAX_FILE_SIZE_MB`    | `10`                     |
    /// | `PHOTO_DELETION_GRACE_DAYS` | `7` (1 to 365)           |
    /// | `STORAGE_TYPE`              | `local`                  |
    /// | `STORAGE_LOCAL_PATH`        | `./data/photos`          |
    /// | `STORAGE_S3_BUCKET`         | unset                    |
    /// | `STORAGE_S3_REGION`         | unset                    |
    /// | `STORAGE_PUBLIC_BASE_URL`   | backend default          |
    /// | `STORAGE_SIGNING_SECRET`    | development secret       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = parse_var("PORT", &var("PORT", "8080"))?;
        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout_secs =
            parse_var("REQUEST_TIMEOUT_SECS", &var("REQUEST_TIMEOUT_SECS", "30"))?;
        let environment = var("ENVIRONMENT", "production").to_ascii_lowercase();
        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let photo = PhotoConfig {
            max_file_size_mb: max_file_size_mb(lookup("PHOTO_MAX_FILE_SIZE_MB")),
            deletion_grace_days: deletion_grace_days(lookup("PHOTO_DELETION_GRACE_DAYS")),
        };

        let kind: StorageKind = var("STORAGE_TYPE", "local").parse()?;
        let storage = StorageConfig {
            kind,
            local_path: PathBuf::from(var("STORAGE_LOCAL_PATH", "./data/photos")),
            s3_bucket: lookup("STORAGE_S3_BUCKET").filter(|s| !s.is_empty()),
            s3_region: lookup("STORAGE_S3_REGION").filter(|s| !s.is_empty()),
            public_base_url: lookup("STORAGE_PUBLIC_BASE_URL").filter(|s| !s.is_empty()),
            signing_secret: var("STORAGE_SIGNING_SECRET", DEV_SIGNING_SECRET),
        };

        if kind == StorageKind::S3 {
            if storage.s3_bucket.is_none() {
                return Err(ConfigError::Missing("STORAGE_S3_BUCKET"));
            }
            if storage.s3_region.is_none() {
                return Err(ConfigError::Missing("STORAGE_S3_REGION"));
            }
        }

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            environment,
            database_url,
            photo,
            storage,
        };
        if !config.is_local() && config.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(config)
    }

    /// `ENVIRONMENT=local`: in-memory metadata, no database.
    pub fn is_local(&self) -> bool {
        self.environment == "local"
    }

    /// Human-readable debug logs instead of JSON.
    pub fn is_development(&self) -> bool {
        matches!(self.environment.as_str(), "local" | "dev")
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits::from_megabytes(self.photo.max_file_size_mb)
    }

    pub fn ingest_settings(&self) -> IngestSettings {
        IngestSettings {
            limits: self.upload_limits(),
            deletion_grace: chrono::Duration::days(self.photo.deletion_grace_days),
        }
    }
}

/// Current `ENVIRONMENT`, readable before the full config is loaded so the
/// log format can be chosen first.
pub fn environment_from_env() -> String {
    std::env::var("ENVIRONMENT")
        .unwrap_or_else(|_| "production".into())
        .to_ascii_lowercase()
}

fn parse_var<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

/// An unusable upload limit falls back to the default rather than failing
/// startup.
fn max_file_size_mb(raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return DEFAULT_MAX_UPLOAD_MB;
    };
    match raw.trim().parse::<u64>() {
        Ok(mb) if mb > 0 => mb,
        _ => {
            tracing::warn!(
                value = %raw,
                default_mb = DEFAULT_MAX_UPLOAD_MB,
                "Invalid PHOTO_MAX_FILE_SIZE_MB, using default",
            );
            DEFAULT_MAX_UPLOAD_MB
        }
    }
}

/// The grace period must be positive and bounded; anything else falls back
/// to the default.
fn deletion_grace_days(raw: Option<String>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_DELETION_GRACE_DAYS;
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if (1..=MAX_DELETION_GRACE_DAYS).contains(&days) => days,
        _ => {
            tracing::warn!(
                value = %raw,
                default_days = DEFAULT_DELETION_GRACE_DAYS,
                max_days = MAX_DELETION_GRACE_DAYS,
                "Invalid PHOTO_DELETION_GRACE_DAYS, using default",
            );
            DEFAULT_DELETION_GRACE_DAYS
        }
    }
}
