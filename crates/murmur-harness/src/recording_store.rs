//! Store wrapper that records seen writes.

#![allow(clippy::disallowed_types, reason = "Synchronous bookkeeping only")]

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use murmur_core::{MessageId, SEEN_FIELD};
use murmur_store::{ExternalStore, StoreError, Subscription, split_write_path};
use serde_json::Value;

/// Per-session view of a shared store that logs the session's seen writes.
///
/// Each session gets its own wrapper around the same inner store, so the log
/// tells exactly which viewer attempted which receipt. Attempts are logged
/// before delegating, whether or not the inner store accepts them.
#[derive(Debug, Clone)]
pub struct RecordingStore<S: ExternalStore> {
    inner: S,
    seen_writes: Arc<Mutex<Vec<MessageId>>>,
}

impl<S: ExternalStore> RecordingStore<S> {
    /// Wrap `inner` with an empty log.
    pub fn new(inner: S) -> Self {
        Self { inner, seen_writes: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Underlying store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Every message id this wrapper was asked to mark seen, in call order.
    pub fn seen_writes(&self) -> Vec<MessageId> {
        self.seen_writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<S: ExternalStore> ExternalStore for RecordingStore<S> {
    fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        self.inner.subscribe(path)
    }

    fn append(
        &self,
        path: &str,
        record: Value,
    ) -> impl Future<Output = Result<MessageId, StoreError>> + Send {
        self.inner.append(path, record)
    }

    fn update(
        &self,
        path: &str,
        writes: Vec<(String, Value)>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        {
            let mut log = self.seen_writes.lock().unwrap_or_else(PoisonError::into_inner);
            for (write_path, _) in &writes {
                if let Ok((id, SEEN_FIELD)) = split_write_path(write_path) {
                    log.push(MessageId::from(id));
                }
            }
        }
        self.inner.update(path, writes)
    }
}
