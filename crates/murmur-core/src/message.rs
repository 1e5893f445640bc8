//! Message data model.
//!
//! [`MessageRecord`] is the loosely-typed shape stored in the external store;
//! [`Message`] is the validated form the rest of the system works with. The
//! conversion between the two is where malformed records are rejected.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::MessageError;

/// Record field holding the read-receipt flag.
pub const SEEN_FIELD: &str = "seen";

/// Opaque message identifier assigned by the external store.
///
/// Identifiers are roughly creation-ordered but carry no ordering guarantee;
/// display order always comes from [`Message::sent_at`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can address a record in a write path: non-empty and
    /// free of `/`.
    pub fn is_writable(&self) -> bool {
        !self.0.is_empty() && !self.0.contains('/')
    }

    /// Store path suffix of this message's read-receipt flag (`<id>/seen`).
    pub fn seen_path(&self) -> String {
        format!("{}/{SEEN_FIELD}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A validated chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Store-assigned identifier, unique within the collection.
    pub id: MessageId,
    /// Non-empty message text.
    pub text: String,
    /// Display name of the author.
    pub author: String,
    /// Client-assigned send time (milliseconds since the Unix epoch).
    pub sent_at: u64,
    /// Whether a non-author viewer has processed this message.
    pub seen: bool,
}

impl Message {
    /// Whether `viewer` wrote this message.
    pub fn is_authored_by(&self, viewer: &str) -> bool {
        self.author == viewer
    }
}

/// Raw record as held by the external store.
///
/// Every field is optional so that any object deserializes; validation
/// happens in [`MessageRecord::into_message`]. Records written by older
/// clients used `username` and `timestamp`. Both shapes are kept as separate
/// fields so a record carrying old and new names side by side still parses;
/// the current name wins when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Legacy name of `author`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Send time in milliseconds since the Unix epoch.
    #[serde(default, rename = "sentAt", skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<u64>,
    /// Legacy name of `sentAt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Read-receipt flag. Absent or `null` means unseen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen: Option<bool>,
}

impl MessageRecord {
    /// Deserialize a record from a raw store value.
    pub fn from_value(value: &Value) -> Result<Self, MessageError> {
        Self::deserialize(value).map_err(|e| MessageError::InvalidRecord(e.to_string()))
    }

    /// Validate the record and attach its identifier.
    pub fn into_message(self, id: MessageId) -> Result<Message, MessageError> {
        let text = self.text.ok_or(MessageError::MissingField("text"))?;
        if text.trim().is_empty() {
            return Err(MessageError::EmptyText);
        }
        let author = self.author.or(self.username).ok_or(MessageError::MissingField("author"))?;
        let sent_at = self.sent_at.or(self.timestamp).ok_or(MessageError::MissingField("sentAt"))?;

        Ok(Message { id, text, author, sent_at, seen: self.seen.unwrap_or(false) })
    }
}

/// A new message ready to be appended to the store.
///
/// Text is trimmed and guaranteed non-empty. New messages always start
/// unseen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    text: String,
    author: String,
    sent_at: u64,
}

impl OutgoingMessage {
    /// Build an outgoing message, rejecting blank text.
    pub fn new(text: &str, author: &str, sent_at: u64) -> Result<Self, MessageError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MessageError::EmptyText);
        }
        Ok(Self { text: text.to_owned(), author: author.to_owned(), sent_at })
    }

    /// Trimmed message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Author display name.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Send time in milliseconds since the Unix epoch.
    pub fn sent_at(&self) -> u64 {
        self.sent_at
    }

    /// Store representation of this message.
    pub fn to_record(&self) -> Value {
        json!({
            "text": self.text,
            "author": self.author,
            "sentAt": self.sent_at,
            SEEN_FIELD: false,
        })
    }
}
