//! Client error types.

use murmur_store::StoreError;
use thiserror::Error;

/// Errors surfaced by a chat session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Message text was blank after trimming. Rejected before any store call.
    #[error("message text is empty")]
    EmptyMessage,

    /// Appending the message to the store failed.
    ///
    /// Not retried, and nothing was added locally. The caller decides whether
    /// to send again.
    #[error("failed to send message: {0}")]
    SendFailed(StoreError),

    /// Background seen write failed.
    ///
    /// Only ever logged. The next snapshot that still shows the message
    /// unseen issues the write again.
    #[error("failed to mark messages seen: {0}")]
    SeenUpdateFailed(StoreError),

    /// The initial subscription could not be established.
    #[error("failed to subscribe: {0}")]
    Subscribe(StoreError),

    /// The live subscription failed. The session keeps its last view but no
    /// longer updates.
    #[error("subscription failed: {reason}")]
    Subscription {
        /// Failure reported by the store.
        reason: String,
    },

    /// The session task ended abnormally.
    #[error("session task failed: {0}")]
    Shutdown(String),
}

impl ClientError {
    /// Returns true if repeating the operation may succeed.
    ///
    /// Store errors defer to [`StoreError::is_transient`]. A failed
    /// subscription is transient for a new session, not for this one.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::SendFailed(e) | Self::SeenUpdateFailed(e) | Self::Subscribe(e) => {
                e.is_transient()
            },
            Self::Subscription { .. } => true,
            Self::EmptyMessage | Self::Shutdown(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_failures_follow_store_classification() {
        let unavailable = ClientError::SendFailed(StoreError::Unavailable("offline".into()));
        assert!(unavailable.is_transient());

        let bad_path = ClientError::SendFailed(StoreError::InvalidPath { path: "".into() });
        assert!(!bad_path.is_transient());
    }

    #[test]
    fn validation_is_never_transient() {
        assert!(!ClientError::EmptyMessage.is_transient());
    }

    #[test]
    fn send_failure_message() {
        let err = ClientError::SendFailed(StoreError::Unavailable("timeout".into()));
        assert_eq!(err.to_string(), "failed to send message: store unavailable: timeout");
    }
}
