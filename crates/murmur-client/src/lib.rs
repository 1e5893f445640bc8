//! Client
//!
//! Snapshot-driven synchronization for one chat participant. Turns the
//! stream of full-collection snapshots delivered by the store into an ordered
//! message list, read-receipt writes and deduplicated new-message alerts.
//!
//! # Architecture
//!
//! The [`SyncEngine`] is a Sans-IO state machine: it receives events
//! ([`SyncEvent`]), runs pure reconciliation logic from [`murmur_core`], and
//! returns actions ([`SyncAction`]) for the caller to execute. The
//! [`Session`] runtime is that caller: a tokio task that owns the
//! subscription, serializes cycles and executes actions against the
//! [`ExternalStore`](murmur_store::ExternalStore) and a
//! [`NotificationSurface`].
//!
//! # Components
//!
//! - [`SyncEngine`]: per-session cycle state machine
//! - [`Session`] / [`SessionHandle`]: async runtime and its control handle
//! - [`ChatView`]: render-ready session state
//! - [`NotificationSurface`]: platform alert capability
//! - [`SystemEnv`]: wall-clock environment

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod engine;
mod error;
mod event;
mod session;
mod surface;
mod system_env;
mod view;

pub use config::{DEFAULT_INBOX_CAPACITY, DEFAULT_MESSAGES_PATH, SessionConfig};
pub use engine::SyncEngine;
pub use error::ClientError;
pub use event::{SyncAction, SyncEvent};
pub use murmur_core::{Environment, Permission};
pub use session::{Session, SessionHandle};
pub use surface::NotificationSurface;
pub use system_env::SystemEnv;
pub use view::{ChatView, Receipt, ViewStatus};
