use crate::messages;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// The uploaded payload exceeds the configured maximum.
    ///
    /// Reported as its own condition rather than a generic form failure.
    #[error("{msg}: limit is {max_bytes} bytes", msg = messages::FILE_TOO_LARGE)]
    TooLarge { max_bytes: u64 },

    #[error("{msg}: {mime}", msg = messages::UNSUPPORTED_FILE_TYPE)]
    UnsupportedType { mime: String },

    #[error("{msg}: {0}", msg = messages::INVALID_ID)]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_lead_with_user_facing_text() {
        assert_eq!(
            CoreError::InvalidId("abc".into()).to_string(),
            "Invalid UUID format for ID: abc"
        );
        assert_eq!(
            CoreError::TooLarge { max_bytes: 10 }.to_string(),
            "File is too large: limit is 10 bytes"
        );
        assert_eq!(
            CoreError::UnsupportedType { mime: "text/plain".into() }.to_string(),
            "Unsupported file type: text/plain"
        );
    }
}
