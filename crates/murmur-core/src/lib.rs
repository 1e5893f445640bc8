//! Core
//!
//! Pure synchronization logic for murmur group chat. Nothing in this crate
//! performs I/O: snapshots of the external store go in, ordered messages,
//! pending read-receipt writes and notification events come out.
//!
//! # Components
//!
//! - [`MessageStore`]: full-replace reconciliation of a [`Snapshot`] into an
//!   ordered message list
//! - [`compute_seen_updates`]: read-receipt writes owed by a viewer
//! - [`compute_notifications`]: alert gating with dedup against known ids
//! - [`ClientSyncState`]: session-scoped state threaded through every cycle
//! - [`Environment`]: clock abstraction for deterministic testing

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod error;
mod message;
mod name;
mod notify;
mod receipts;
mod snapshot;
mod state;
mod store;

pub use env::Environment;
pub use error::{DisplayNameError, MessageError, SnapshotError};
pub use message::{Message, MessageId, MessageRecord, OutgoingMessage, SEEN_FIELD};
pub use name::{DisplayName, MAX_DISPLAY_NAME_CHARS, MIN_DISPLAY_NAME_CHARS};
pub use notify::{
    NOTIFICATION_BODY_MAX_CHARS, NotificationEvent, Permission, compute_notifications,
};
pub use receipts::{SeenUpdates, compute_seen_updates};
pub use snapshot::Snapshot;
pub use state::{ClientSyncState, SessionHealth};
pub use store::{MessageStore, reconcile};
