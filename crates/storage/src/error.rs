/// Errors raised by [`ObjectStorage`](crate::ObjectStorage) backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage key cannot be empty")]
    EmptyKey,

    #[error("Upload payload cannot be empty")]
    EmptyPayload,

    /// The key would escape the backend's namespace (e.g. `..` segments).
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Presigned URL expiration must be positive")]
    InvalidExpiration,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport, permission or service failure reported by the backend.
    #[error("Storage backend failed to {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StorageError {
    pub(crate) fn backend(operation: &'static str, message: impl ToString) -> Self {
        Self::Backend {
            operation,
            message: message.to_string(),
        }
    }
}
