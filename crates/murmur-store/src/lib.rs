//! Store
//!
//! Abstraction over the external real-time store that holds the messages
//! collection. The store is the sole source of truth: clients append records,
//! write read-receipt flags, and receive a full snapshot of the collection
//! after every change.
//!
//! # Components
//!
//! - [`ExternalStore`]: the collaborator contract (subscribe, append, update)
//! - [`Subscription`]: scoped snapshot stream, released on drop
//! - [`MemoryStore`]: in-process implementation for simulation and tests
//! - [`ChaoticStore`]: wrapper that injects write failures

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod error;
mod memory;
mod path;
mod subscription;

use std::future::Future;

pub use chaotic::ChaoticStore;
pub use error::StoreError;
pub use memory::MemoryStore;
use murmur_core::MessageId;
pub use path::{split_write_path, validate_collection_path};
use serde_json::Value;
pub use subscription::{Delivery, Subscription};

/// External real-time store holding record collections.
///
/// Must be Clone (a session hands copies to background writers) and
/// Send + Sync. Implementations typically share state behind an `Arc`, so
/// clones observe the same collections.
pub trait ExternalStore: Clone + Send + Sync + 'static {
    /// Subscribe to the collection at `path`.
    ///
    /// The first delivery is the current state of the collection; every
    /// subsequent change produces another full snapshot. A stream failure is
    /// delivered as an `Err` and ends the stream.
    fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;

    /// Create a child record under `path` with a store-generated id.
    fn append(
        &self,
        path: &str,
        record: Value,
    ) -> impl Future<Output = Result<MessageId, StoreError>> + Send;

    /// Apply `<id>/<field> -> value` writes under `path`.
    ///
    /// # Invariants
    ///
    /// - Writes are atomic relative to each other: all apply or none do.
    /// - Subscribers see at most one snapshot for the whole batch.
    fn update(
        &self,
        path: &str,
        writes: Vec<(String, Value)>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
