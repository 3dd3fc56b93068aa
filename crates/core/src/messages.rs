//! User-facing error messages shared by the pipeline and the HTTP layer.

pub const FILE_TOO_LARGE: &str = "File is too large";
pub const FAILED_TO_PARSE_FORM: &str = "Failed to parse form";
pub const FILE_REQUIRED: &str = "File is required";
pub const FAILED_TO_READ_FILE: &str = "Failed to read file";
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";
pub const INVALID_ID: &str = "Invalid UUID format for ID";
pub const UPLOAD_SUCCEEDED: &str = "Photo uploaded successfully";
