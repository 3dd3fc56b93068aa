/// Photo identifiers are random UUIDs minted at ingestion start.
pub type PhotoId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
