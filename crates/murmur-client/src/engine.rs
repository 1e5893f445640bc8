//! Snapshot sync engine.
//!
//! The `SyncEngine` runs one reconciliation cycle per snapshot delivered by
//! the store subscription: rebuild the ordered message list, work out which
//! read receipts this viewer owes, decide which messages deserve an alert,
//! then advance the dedup state. It performs no I/O; every side effect is
//! returned as a [`SyncAction`].

use murmur_core::{
    ClientSyncState, Message, MessageStore, Permission, SessionHealth, Snapshot,
    compute_notifications, compute_seen_updates,
};

use crate::{
    event::{SyncAction, SyncEvent},
    view::ChatView,
};

/// Per-session synchronization state machine.
///
/// # Invariants
///
/// - Cycles are applied strictly one at a time, in delivery order
/// - `known_ids` after a cycle equals the id set of that cycle's snapshot
/// - At most one permission request is ever issued
/// - Once stale, no snapshot changes the message list again
#[derive(Debug, Clone)]
pub struct SyncEngine {
    /// Display name of the session's user.
    viewer: String,

    /// Materialized message list.
    store: MessageStore,

    /// Dedup ids, permission, loading and health.
    state: ClientSyncState,

    /// Whether `RequestPermission` has been emitted.
    permission_requested: bool,
}

impl SyncEngine {
    /// Create an engine for `viewer` with the surface's current permission.
    pub fn new(viewer: impl Into<String>, permission: Permission) -> Self {
        Self {
            viewer: viewer.into(),
            store: MessageStore::new(),
            state: ClientSyncState::new(permission),
            permission_requested: false,
        }
    }

    /// Display name of the session's user.
    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Session state threaded through the cycles.
    pub fn state(&self) -> &ClientSyncState {
        &self.state
    }

    /// Render-ready copy of the current state.
    pub fn view(&self) -> ChatView {
        let stale = match self.state.health() {
            SessionHealth::Live => None,
            SessionHealth::Stale { reason } => Some(reason.clone()),
        };
        ChatView {
            viewer: self.viewer.clone(),
            messages: self.store.messages().to_vec(),
            loading: self.state.is_loading(),
            stale,
        }
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: SyncEvent) -> Vec<SyncAction> {
        match event {
            SyncEvent::SnapshotReceived(snapshot) => self.handle_snapshot(snapshot.as_ref()),
            SyncEvent::SubscriptionFailed { reason } => self.handle_subscription_failed(reason),
            SyncEvent::PermissionResolved(permission) => {
                self.handle_permission_resolved(permission)
            },
        }
    }

    fn handle_snapshot(&mut self, snapshot: Option<&Snapshot>) -> Vec<SyncAction> {
        if self.state.is_stale() {
            tracing::debug!(viewer = %self.viewer, "ignoring snapshot on stale session");
            return Vec::new();
        }

        let is_first_load = self.state.is_loading();
        let messages = self.store.reconcile(snapshot);
        let mut actions = Vec::new();

        if !messages.is_empty() {
            let updates = compute_seen_updates(messages, &self.viewer);
            if !updates.is_empty() {
                actions.push(SyncAction::WriteSeen(updates));
            }
        }

        if !is_first_load {
            let events = compute_notifications(
                messages,
                &self.viewer,
                self.state.known_ids(),
                self.state.permission(),
                false,
            );
            actions.extend(events.into_iter().map(SyncAction::Notify));
        }

        self.state.advance_known_ids(messages);
        self.state.finish_loading();

        tracing::debug!(
            viewer = %self.viewer,
            count = self.store.len(),
            first_load = is_first_load,
            actions = actions.len(),
            "snapshot cycle complete"
        );

        if self.state.permission() == Permission::Unknown && !self.permission_requested {
            self.permission_requested = true;
            actions.push(SyncAction::RequestPermission);
        }

        actions.push(SyncAction::Render);
        actions
    }

    fn handle_subscription_failed(&mut self, reason: String) -> Vec<SyncAction> {
        if self.state.is_stale() {
            return Vec::new();
        }

        tracing::warn!(viewer = %self.viewer, %reason, "subscription failed, view is stale");
        self.state.mark_stale(reason);
        self.state.finish_loading();
        vec![SyncAction::Render]
    }

    fn handle_permission_resolved(&mut self, permission: Permission) -> Vec<SyncAction> {
        tracing::info!(viewer = %self.viewer, ?permission, "notification permission resolved");
        self.state.set_permission(permission);
        vec![SyncAction::Render]
    }
}

#[cfg(test)]
mod tests {
    use murmur_core::{MessageId, NotificationEvent};
    use serde_json::{Value, json};

    use super::*;

    fn record(text: &str, author: &str, sent_at: u64, seen: bool) -> Value {
        json!({ "text": text, "author": author, "sentAt": sent_at, "seen": seen })
    }

    fn snapshot(entries: Vec<(&str, Value)>) -> Option<Snapshot> {
        Some(entries.into_iter().map(|(id, value)| (MessageId::from(id), value)).collect())
    }

    fn seen_writes(actions: &[SyncAction]) -> Vec<MessageId> {
        actions
            .iter()
            .filter_map(|a| match a {
                SyncAction::WriteSeen(updates) => Some(updates.ids().to_vec()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn notifications(actions: &[SyncAction]) -> Vec<NotificationEvent> {
        actions
            .iter()
            .filter_map(|a| match a {
                SyncAction::Notify(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_store_finishes_loading() {
        let mut engine = SyncEngine::new("alice", Permission::Granted);
        assert!(engine.state().is_loading());

        let actions = engine.handle(SyncEvent::SnapshotReceived(None));

        assert_eq!(actions, [SyncAction::Render]);
        assert!(engine.messages().is_empty());
        assert!(!engine.state().is_loading());
    }

    #[test]
    fn first_load_writes_receipts_but_stays_silent() {
        let mut engine = SyncEngine::new("bob", Permission::Granted);

        let actions = engine.handle(SyncEvent::SnapshotReceived(snapshot(vec![(
            "m1",
            record("hi", "alice", 1000, false),
        )])));

        assert_eq!(seen_writes(&actions), [MessageId::from("m1")]);
        assert!(notifications(&actions).is_empty());
        assert_eq!(actions.last(), Some(&SyncAction::Render));
    }

    #[test]
    fn later_arrivals_notify_once() {
        let mut engine = SyncEngine::new("bob", Permission::Granted);
        engine.handle(SyncEvent::SnapshotReceived(None));

        let update = snapshot(vec![("m1", record("hi", "alice", 1000, false))]);
        let actions = engine.handle(SyncEvent::SnapshotReceived(update.clone()));

        let events = notifications(&actions);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag, MessageId::from("m1"));
        assert_eq!(events[0].title, "New message from alice");

        // Same snapshot again: ids are known now
        let actions = engine.handle(SyncEvent::SnapshotReceived(update));
        assert!(notifications(&actions).is_empty());
    }

    #[test]
    fn own_messages_never_flagged_or_alerted() {
        let mut engine = SyncEngine::new("alice", Permission::Granted);
        engine.handle(SyncEvent::SnapshotReceived(None));

        let actions = engine.handle(SyncEvent::SnapshotReceived(snapshot(vec![(
            "m1",
            record("hi", "alice", 1000, false),
        )])));

        assert!(seen_writes(&actions).is_empty());
        assert!(notifications(&actions).is_empty());
    }

    #[test]
    fn unseen_messages_are_rewritten_every_cycle() {
        let mut engine = SyncEngine::new("bob", Permission::Denied);
        let unseen = snapshot(vec![("m1", record("hi", "alice", 1000, false))]);

        engine.handle(SyncEvent::SnapshotReceived(unseen.clone()));
        let actions = engine.handle(SyncEvent::SnapshotReceived(unseen));
        assert_eq!(seen_writes(&actions), [MessageId::from("m1")]);

        let seen = snapshot(vec![("m1", record("hi", "alice", 1000, true))]);
        let actions = engine.handle(SyncEvent::SnapshotReceived(seen));
        assert!(seen_writes(&actions).is_empty());
    }

    #[test]
    fn permission_requested_once_when_unknown() {
        let mut engine = SyncEngine::new("bob", Permission::Unknown);

        let first = engine.handle(SyncEvent::SnapshotReceived(None));
        assert!(first.contains(&SyncAction::RequestPermission));

        let second = engine.handle(SyncEvent::SnapshotReceived(None));
        assert!(!second.contains(&SyncAction::RequestPermission));
    }

    #[test]
    fn permission_never_requested_when_decided() {
        for permission in [Permission::Granted, Permission::Denied] {
            let mut engine = SyncEngine::new("bob", permission);
            let actions = engine.handle(SyncEvent::SnapshotReceived(None));
            assert!(!actions.contains(&SyncAction::RequestPermission));
        }
    }

    #[test]
    fn resolved_permission_gates_later_cycles() {
        let mut engine = SyncEngine::new("bob", Permission::Unknown);
        engine.handle(SyncEvent::SnapshotReceived(None));

        let m1 = snapshot(vec![("m1", record("one", "alice", 1, false))]);
        assert!(notifications(&engine.handle(SyncEvent::SnapshotReceived(m1))).is_empty());

        let actions = engine.handle(SyncEvent::PermissionResolved(Permission::Granted));
        assert_eq!(actions, [SyncAction::Render]);

        let both = snapshot(vec![
            ("m1", record("one", "alice", 1, false)),
            ("m2", record("two", "alice", 2, false)),
        ]);
        let events = notifications(&engine.handle(SyncEvent::SnapshotReceived(both)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag, MessageId::from("m2"));
    }

    #[test]
    fn subscription_failure_keeps_last_list() {
        let mut engine = SyncEngine::new("bob", Permission::Denied);
        engine.handle(SyncEvent::SnapshotReceived(snapshot(vec![(
            "m1",
            record("hi", "alice", 1000, true),
        )])));

        let actions =
            engine.handle(SyncEvent::SubscriptionFailed { reason: "connection reset".into() });
        assert_eq!(actions, [SyncAction::Render]);

        let view = engine.view();
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.stale.as_deref(), Some("connection reset"));

        // Late deliveries are ignored
        assert!(engine.handle(SyncEvent::SnapshotReceived(None)).is_empty());
        assert_eq!(engine.messages().len(), 1);
    }

    #[test]
    fn failure_before_first_snapshot_clears_loading() {
        let mut engine = SyncEngine::new("bob", Permission::Denied);
        engine.handle(SyncEvent::SubscriptionFailed { reason: "denied".into() });

        let view = engine.view();
        assert!(!view.loading);
        assert!(view.stale.is_some());
    }

    #[test]
    fn malformed_records_do_not_stop_the_cycle() {
        let mut engine = SyncEngine::new("bob", Permission::Denied);

        let actions = engine.handle(SyncEvent::SnapshotReceived(snapshot(vec![
            ("bad", json!({ "author": "alice", "sentAt": 5 })),
            ("m1", record("hi", "alice", 1000, false)),
        ])));

        assert_eq!(engine.messages().len(), 1);
        assert_eq!(seen_writes(&actions), [MessageId::from("m1")]);
    }
}
