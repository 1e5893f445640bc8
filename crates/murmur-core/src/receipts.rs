//! Read receipts.
//!
//! A viewer owes a `seen` write for every message it did not author that is
//! still unseen. The computation is repeated on every snapshot, so a write
//! that was lost is simply issued again on the next cycle.

use serde_json::Value;

use crate::message::{Message, MessageId};

/// Batch of pending `<id>/seen = true` writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenUpdates {
    ids: Vec<MessageId>,
}

impl SeenUpdates {
    /// Messages to be flagged, in display order.
    pub fn ids(&self) -> &[MessageId] {
        &self.ids
    }

    /// Whether `id` is part of the batch.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Number of pending writes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The batch as store writes (`<id>/seen` paths mapped to `true`).
    pub fn to_writes(&self) -> Vec<(String, Value)> {
        self.ids.iter().map(|id| (id.seen_path(), Value::Bool(true))).collect()
    }
}

/// Seen writes owed by `viewer` for `messages`.
///
/// Never includes a message authored by the viewer, nor one already seen.
/// Ids that cannot form a `<id>/seen` write path are skipped so they cannot
/// sink the rest of the batch.
pub fn compute_seen_updates(messages: &[Message], viewer: &str) -> SeenUpdates {
    let ids = messages
        .iter()
        .filter(|message| !message.seen && !message.is_authored_by(viewer))
        .filter(|message| {
            let writable = message.id.is_writable();
            if !writable {
                tracing::warn!(id = %message.id, "skipping seen write for unaddressable id");
            }
            writable
        })
        .map(|message| message.id.clone())
        .collect();
    SeenUpdates { ids }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, author: &str, seen: bool) -> Message {
        Message { id: id.into(), text: "hi".into(), author: author.into(), sent_at: 1, seen }
    }

    #[test]
    fn own_messages_are_never_flagged() {
        let messages = [message("m1", "bob", false), message("m2", "bob", true)];
        assert!(compute_seen_updates(&messages, "bob").is_empty());
    }

    #[test]
    fn seen_messages_are_not_flagged_again() {
        let messages = [message("m1", "alice", true)];
        assert!(compute_seen_updates(&messages, "bob").is_empty());
    }

    #[test]
    fn unseen_messages_from_others_are_flagged() {
        let messages = [
            message("m1", "alice", false),
            message("m2", "bob", false),
            message("m3", "carol", false),
            message("m4", "carol", true),
        ];
        let updates = compute_seen_updates(&messages, "bob");

        assert_eq!(updates.ids(), [MessageId::from("m1"), MessageId::from("m3")]);
        assert_eq!(updates.to_writes(), [
            ("m1/seen".to_owned(), Value::Bool(true)),
            ("m3/seen".to_owned(), Value::Bool(true)),
        ]);
    }

    #[test]
    fn unaddressable_ids_do_not_block_the_batch() {
        let messages = [
            message("", "alice", false),
            message("m1", "alice", false),
            message("rooms/m2", "alice", false),
            message("m3", "carol", false),
        ];
        let updates = compute_seen_updates(&messages, "bob");

        assert_eq!(updates.ids(), [MessageId::from("m1"), MessageId::from("m3")]);
        assert!(updates.to_writes().iter().all(|(path, _)| path.matches('/').count() == 1));
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        assert!(compute_seen_updates(&[], "bob").is_empty());
    }
}
