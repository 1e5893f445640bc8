//! Local materialized view of the messages collection.
//!
//! Reconciliation is full-replace: every snapshot rebuilds the view from
//! scratch, so the local list can never drift from the external store.

use crate::{
    message::{Message, MessageId, MessageRecord},
    snapshot::Snapshot,
};

/// Convert a snapshot into messages ordered by send time.
///
/// The sort is stable: messages with equal `sent_at` keep snapshot order.
/// Malformed records are logged and skipped. A missing snapshot yields an
/// empty list.
pub fn reconcile(snapshot: Option<&Snapshot>) -> Vec<Message> {
    let Some(snapshot) = snapshot else {
        return Vec::new();
    };

    let mut messages: Vec<Message> =
        snapshot.iter().filter_map(|(id, value)| parse_entry(id, value)).collect();
    messages.sort_by_key(|message| message.sent_at);

    debug_assert!(messages.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));
    messages
}

fn parse_entry(id: &MessageId, value: &serde_json::Value) -> Option<Message> {
    match MessageRecord::from_value(value).and_then(|record| record.into_message(id.clone())) {
        Ok(message) => Some(message),
        Err(error) => {
            tracing::warn!(%id, %error, "excluding malformed message record");
            None
        },
    }
}

/// Authoritative local view of all messages.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the view with the contents of `snapshot`.
    pub fn reconcile(&mut self, snapshot: Option<&Snapshot>) -> &[Message] {
        self.messages = reconcile(snapshot);
        &self.messages
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Message with the given id. `None` if absent.
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    /// Identifiers of all messages in display order.
    pub fn ids(&self) -> impl Iterator<Item = &MessageId> {
        self.messages.iter().map(|message| &message.id)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
