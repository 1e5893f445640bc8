//! Point-in-time copies of the messages collection.
//!
//! A [`Snapshot`] keeps the iteration order of the source collection, which
//! is the tie-breaker when two messages share a timestamp. Identifiers are
//! unique: pushing an existing id replaces its value in place.

use std::{collections::HashMap, fmt};

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use serde_json::Value;

use crate::{error::SnapshotError, message::MessageId};

/// Ordered, id-unique mapping from message id to raw record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<(MessageId, Value)>,
    index: HashMap<MessageId, usize>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. `null` means the collection does not exist.
    ///
    /// Key order of the document is preserved. Duplicate keys keep the
    /// position of their first occurrence and the value of their last.
    pub fn from_json(json: &str) -> Result<Option<Self>, SnapshotError> {
        Ok(serde_json::from_str::<Option<Self>>(json)?)
    }

    /// Insert or replace a record.
    pub fn push(&mut self, id: MessageId, value: Value) {
        if let Some(&position) = self.index.get(&id) {
            self.entries[position].1 = value;
        } else {
            self.index.insert(id.clone(), self.entries.len());
            self.entries.push((id, value));
        }
    }

    /// Raw record for `id`. `None` if absent.
    pub fn get(&self, id: &MessageId) -> Option<&Value> {
        self.index.get(id).map(|&position| &self.entries[position].1)
    }

    /// Entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&MessageId, &Value)> {
        self.entries.iter().map(|(id, value)| (id, value))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(MessageId, Value)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (MessageId, Value)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (id, value) in iter {
            snapshot.push(id, value);
        }
        snapshot
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = Snapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of message ids to records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Snapshot, A::Error> {
                let mut snapshot = Snapshot::new();
                while let Some((id, value)) = map.next_entry::<String, Value>()? {
                    snapshot.push(MessageId::from(id), value);
                }
                Ok(snapshot)
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}
