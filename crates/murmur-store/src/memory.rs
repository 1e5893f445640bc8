#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use murmur_core::{MessageId, Snapshot};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use super::{
    Delivery, ExternalStore, StoreError, Subscription, split_write_path, validate_collection_path,
};

/// In-memory store implementation for simulation and testing.
///
/// Behaves like a realtime database node: records live in per-path
/// collections kept in key order, subscribers receive the current snapshot
/// on subscribe and a full snapshot after every change. Generated ids are
/// zero-padded counters, so key order equals append order.
///
/// All state is wrapped in `Arc<Mutex<>>`; clones share the same
/// collections.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

struct MemoryStoreInner {
    /// Records per collection path, keyed by record id.
    collections: HashMap<String, BTreeMap<String, Value>>,

    /// Live subscribers keyed by registration id.
    subscribers: HashMap<u64, Subscriber>,

    /// Next subscriber registration id.
    next_subscriber: u64,

    /// Next generated record id.
    next_record: u64,
}

struct Subscriber {
    path: String,
    sender: mpsc::UnboundedSender<Delivery>,
}

impl MemoryStoreInner {
    fn snapshot(&self, path: &str) -> Option<Snapshot> {
        let records = self.collections.get(path).filter(|records| !records.is_empty())?;
        Some(
            records
                .iter()
                .map(|(id, value)| (MessageId::new(id.clone()), value.clone()))
                .collect(),
        )
    }

    /// Deliver the current state of `path` to its subscribers, dropping any
    /// whose receiver is gone.
    fn broadcast(&mut self, path: &str) {
        let snapshot = self.snapshot(path);
        self.subscribers.retain(|_, subscriber| {
            subscriber.path != path || subscriber.sender.send(Ok(snapshot.clone())).is_ok()
        });
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner {
                collections: HashMap::new(),
                subscribers: HashMap::new(),
                next_subscriber: 0,
                next_record: 0,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Number of live subscribers on `path`.
    pub fn subscriber_count(&self, path: &str) -> Result<usize, StoreError> {
        Ok(self.lock()?.subscribers.values().filter(|s| s.path == path).count())
    }

    /// Raw record `id` under `path`. `None` if absent.
    pub fn record(&self, path: &str, id: &MessageId) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.collections.get(path).and_then(|records| records.get(id.as_str())).cloned())
    }

    /// Current snapshot of `path`, as a subscriber would receive it.
    pub fn snapshot(&self, path: &str) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.lock()?.snapshot(path))
    }

    /// Fail every subscription on `path` with a stream error.
    ///
    /// Subscribers receive the error and are then disconnected. Used to
    /// simulate a lost connection.
    pub fn disconnect(&self, path: &str, reason: &str) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.subscribers.len();
        inner.subscribers.retain(|_, subscriber| {
            if subscriber.path == path {
                let _ = subscriber.sender.send(Err(StoreError::Stream(reason.to_owned())));
                false
            } else {
                true
            }
        });
        let dropped = before - inner.subscribers.len();
        tracing::debug!(path, dropped, reason, "disconnected subscribers");
        Ok(dropped)
    }

    fn append_now(&self, path: &str, record: Value) -> Result<MessageId, StoreError> {
        validate_collection_path(path)?;
        if !record.is_object() {
            return Err(StoreError::InvalidRecord(format!("expected an object, got {record}")));
        }

        let mut inner = self.lock()?;
        let id = format!("-{:012}", inner.next_record);
        inner.next_record += 1;
        inner.collections.entry(path.to_owned()).or_default().insert(id.clone(), record);
        inner.broadcast(path);

        Ok(MessageId::new(id))
    }

    fn update_now(&self, path: &str, writes: Vec<(String, Value)>) -> Result<(), StoreError> {
        validate_collection_path(path)?;
        // Validate the whole batch before touching anything
        for (write_path, _) in &writes {
            split_write_path(write_path)?;
        }
        if writes.is_empty() {
            return Ok(());
        }

        let mut inner = self.lock()?;
        let records = inner.collections.entry(path.to_owned()).or_default();
        for (write_path, value) in writes {
            let (id, field) = split_write_path(&write_path)?;
            let record = records.entry(id.to_owned()).or_insert_with(|| Value::Object(Map::new()));
            if !record.is_object() {
                *record = Value::Object(Map::new());
            }
            if let Value::Object(fields) = record {
                fields.insert(field.to_owned(), value);
            }
        }
        inner.broadcast(path);

        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalStore for MemoryStore {
    fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        validate_collection_path(path)?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock()?;
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;

        // Initial delivery; the receiver is alive so this cannot fail
        let _ = sender.send(Ok(inner.snapshot(path)));
        inner.subscribers.insert(id, Subscriber { path: path.to_owned(), sender });
        drop(inner);

        let weak = Arc::downgrade(&self.inner);
        Ok(Subscription::new(receiver, move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut inner) = inner.lock() {
                    inner.subscribers.remove(&id);
                }
            }
        }))
    }

    fn append(
        &self,
        path: &str,
        record: Value,
    ) -> impl Future<Output = Result<MessageId, StoreError>> + Send {
        std::future::ready(self.append_now(path, record))
    }

    fn update(
        &self,
        path: &str,
        writes: Vec<(String, Value)>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        std::future::ready(self.update_now(path, writes))
    }
}
