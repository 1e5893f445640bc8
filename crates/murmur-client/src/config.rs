//! Session configuration.

/// Default collection path holding the messages.
pub const DEFAULT_MESSAGES_PATH: &str = "messages";

/// Default capacity of the session inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 16;

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Store path of the messages collection.
    pub messages_path: String,

    /// Capacity of the channel carrying out-of-band completions (permission
    /// results) back into the session task.
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            messages_path: DEFAULT_MESSAGES_PATH.to_owned(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}
