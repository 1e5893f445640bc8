//! Session-scoped synchronization state.
//!
//! Everything one session remembers between snapshot cycles lives in
//! [`ClientSyncState`]. It is owned by a single engine instance and only
//! mutated from inside that engine's serialized cycle.

use std::collections::HashSet;

use crate::{
    message::{Message, MessageId},
    notify::Permission,
};

/// Health of the session's live view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionHealth {
    /// Snapshots are flowing.
    #[default]
    Live,
    /// The subscription failed; the last-known messages stay visible but no
    /// longer update.
    Stale {
        /// Failure reported by the store.
        reason: String,
    },
}

/// Per-session state threaded through every cycle.
#[derive(Debug, Clone)]
pub struct ClientSyncState {
    /// Message ids observed in the previous snapshot.
    known_ids: HashSet<MessageId>,
    /// Notification delivery permission.
    permission: Permission,
    /// True until the first snapshot has been processed.
    loading: bool,
    /// Whether the live view is still updating.
    health: SessionHealth,
}

impl ClientSyncState {
    /// Fresh state for a new session.
    pub fn new(permission: Permission) -> Self {
        Self {
            known_ids: HashSet::new(),
            permission,
            loading: true,
            health: SessionHealth::Live,
        }
    }

    /// Ids seen in the previous snapshot.
    pub fn known_ids(&self) -> &HashSet<MessageId> {
        &self.known_ids
    }

    /// Replace the known ids with those of `messages`.
    pub fn advance_known_ids(&mut self, messages: &[Message]) {
        self.known_ids = messages.iter().map(|message| message.id.clone()).collect();
    }

    /// Current notification permission.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Record the outcome of a permission request.
    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    /// Whether the first snapshot is still pending.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Mark the first cycle as complete.
    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// Current view health.
    pub fn health(&self) -> &SessionHealth {
        &self.health
    }

    /// Whether the live view has stopped updating.
    pub fn is_stale(&self) -> bool {
        matches!(self.health, SessionHealth::Stale { .. })
    }

    /// Mark the live view as stopped.
    pub fn mark_stale(&mut self, reason: impl Into<String>) {
        self.health = SessionHealth::Stale { reason: reason.into() };
    }
}

impl Default for ClientSyncState {
    fn default() -> Self {
        Self::new(Permission::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_loading_and_live() {
        let state = ClientSyncState::default();
        assert!(state.is_loading());
        assert!(!state.is_stale());
        assert!(state.known_ids().is_empty());
        assert_eq!(state.permission(), Permission::Unknown);
    }

    #[test]
    fn known_ids_are_replaced_not_merged() {
        let mut state = ClientSyncState::default();
        let message = |id: &str| Message {
            id: id.into(),
            text: "t".into(),
            author: "a".into(),
            sent_at: 0,
            seen: false,
        };

        state.advance_known_ids(&[message("a"), message("b")]);
        state.advance_known_ids(&[message("c")]);

        assert_eq!(state.known_ids().len(), 1);
        assert!(state.known_ids().contains(&MessageId::from("c")));
    }

    #[test]
    fn stale_records_reason() {
        let mut state = ClientSyncState::default();
        state.mark_stale("connection reset");
        assert_eq!(state.health(), &SessionHealth::Stale { reason: "connection reset".into() });
    }
}
