//! Store error types.

use thiserror::Error;

/// Errors reported by an [`ExternalStore`](crate::ExternalStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Collection path or write path is malformed.
    #[error("invalid path `{path}`")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// Appended record is not an object.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The subscription stream failed and will deliver nothing further.
    #[error("subscription stream failed: {0}")]
    Stream(String),

    /// Internal lock was poisoned by a panicking writer.
    #[error("store state poisoned")]
    Poisoned,
}

impl StoreError {
    /// Returns true if the operation may succeed when attempted again.
    ///
    /// Invalid paths and records are caller bugs and never transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Stream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_errors_are_transient() {
        assert!(StoreError::Unavailable("timeout".into()).is_transient());
        assert!(StoreError::Stream("reset".into()).is_transient());
    }

    #[test]
    fn caller_errors_are_fatal() {
        assert!(!StoreError::InvalidPath { path: "a//b".into() }.is_transient());
        assert!(!StoreError::InvalidRecord("not an object".into()).is_transient());
        assert!(!StoreError::Poisoned.is_transient());
    }
}
