//! Error types for the murmur core.
//!
//! Validation errors for records crossing the store boundary in either
//! direction, display names entered by the user, and raw snapshot documents.

use thiserror::Error;

use crate::name::{MAX_DISPLAY_NAME_CHARS, MIN_DISPLAY_NAME_CHARS};

/// Errors produced while validating a message record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Message text is empty after trimming.
    #[error("message text is empty")]
    EmptyText,

    /// A required field is absent from the stored record.
    #[error("record is missing field `{0}`")]
    MissingField(&'static str),

    /// Record is not an object or a field has the wrong type.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Errors produced while validating a display name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    /// Fewer than [`MIN_DISPLAY_NAME_CHARS`] characters after trimming.
    #[error("display name must be at least {MIN_DISPLAY_NAME_CHARS} characters")]
    TooShort,

    /// More than [`MAX_DISPLAY_NAME_CHARS`] characters after trimming.
    #[error("display name must be at most {MAX_DISPLAY_NAME_CHARS} characters")]
    TooLong,
}

/// Errors produced while parsing a raw snapshot document.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Document is not valid JSON, or not a map of ids to records.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
