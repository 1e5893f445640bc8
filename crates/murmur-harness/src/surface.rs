//! Recording notification surface.

#![allow(clippy::disallowed_types, reason = "Synchronous bookkeeping only")]

use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use murmur_client::NotificationSurface;
use murmur_core::{MessageId, NotificationEvent, Permission};

/// Notification surface that records what it shows.
///
/// Behaves like a platform notification center: alerts with a tag that was
/// already shown are swallowed. Both the shown alerts and every `fire` call
/// are kept, so tests can tell engine-level dedup from surface-level dedup.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    inner: Arc<Mutex<SurfaceState>>,
}

#[derive(Debug)]
struct SurfaceState {
    permission: Permission,
    /// What a permission request resolves to.
    decision: Permission,
    requests: usize,
    shown: Vec<NotificationEvent>,
    tags: HashSet<MessageId>,
    fired: usize,
}

impl RecordingSurface {
    /// Surface with a permission already decided.
    pub fn new(permission: Permission) -> Self {
        Self::with_decision(permission, permission)
    }

    /// Surface that has not asked yet and will resolve to `decision` when it
    /// does.
    pub fn answering(decision: Permission) -> Self {
        Self::with_decision(Permission::Unknown, decision)
    }

    fn with_decision(permission: Permission, decision: Permission) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SurfaceState {
                permission,
                decision,
                requests: 0,
                shown: Vec::new(),
                tags: HashSet::new(),
                fired: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Alerts that reached the user, in order.
    pub fn shown(&self) -> Vec<NotificationEvent> {
        self.state().shown.clone()
    }

    /// Tags of the alerts that reached the user, in order.
    pub fn shown_tags(&self) -> Vec<MessageId> {
        self.state().shown.iter().map(|event| event.tag.clone()).collect()
    }

    /// Number of `fire` calls, including swallowed duplicates.
    pub fn fire_count(&self) -> usize {
        self.state().fired
    }

    /// Number of permission requests made.
    pub fn request_count(&self) -> usize {
        self.state().requests
    }
}

impl NotificationSurface for RecordingSurface {
    fn permission(&self) -> Permission {
        self.state().permission
    }

    fn request_permission(&self) -> impl Future<Output = Permission> + Send {
        let mut state = self.state();
        state.requests += 1;
        state.permission = state.decision;
        std::future::ready(state.decision)
    }

    fn fire(&self, event: &NotificationEvent) {
        let mut state = self.state();
        state.fired += 1;
        if state.tags.insert(event.tag.clone()) {
            state.shown.push(event.clone());
        }
    }
}
