//! Property-based tests for read receipts and notification gating.

use std::collections::HashSet;

use murmur_core::{
    Message, MessageId, Permission, Snapshot, compute_notifications, compute_seen_updates,
    reconcile,
};
use proptest::prelude::*;
use serde_json::json;

const AUTHORS: [&str; 3] = ["alice", "bob", "carol"];

fn message_strategy() -> impl Strategy<Value = (String, u64, bool)> {
    (prop::sample::select(AUTHORS.to_vec()), 0u64..100, any::<bool>())
        .prop_map(|(author, sent_at, seen)| (author.to_owned(), sent_at, seen))
}

fn messages_strategy() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message_strategy(), 0..30).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (author, sent_at, seen))| Message {
                id: MessageId::new(format!("m{i}")),
                text: format!("message {i}"),
                author,
                sent_at,
                seen,
            })
            .collect()
    })
}

fn permission_strategy() -> impl Strategy<Value = Permission> {
    prop_oneof![Just(Permission::Unknown), Just(Permission::Granted), Just(Permission::Denied)]
}

proptest! {
    #[test]
    fn prop_seen_messages_are_never_rewritten(
        messages in messages_strategy(),
        viewer in prop::sample::select(AUTHORS.to_vec()),
    ) {
        let updates = compute_seen_updates(&messages, viewer);
        for message in messages.iter().filter(|m| m.seen) {
            prop_assert!(!updates.contains(&message.id));
        }
    }

    #[test]
    fn prop_viewer_never_flags_own_messages(
        messages in messages_strategy(),
        viewer in prop::sample::select(AUTHORS.to_vec()),
    ) {
        let updates = compute_seen_updates(&messages, viewer);
        for message in messages.iter().filter(|m| m.author == viewer) {
            prop_assert!(!updates.contains(&message.id));
        }
    }

    #[test]
    fn prop_applying_updates_leaves_nothing_owed(
        mut messages in messages_strategy(),
        viewer in prop::sample::select(AUTHORS.to_vec()),
    ) {
        let updates = compute_seen_updates(&messages, viewer);
        for message in &mut messages {
            if updates.contains(&message.id) {
                message.seen = true;
            }
        }
        prop_assert!(compute_seen_updates(&messages, viewer).is_empty());
    }

    #[test]
    fn prop_notifications_only_for_unknown_foreign_messages(
        messages in messages_strategy(),
        viewer in prop::sample::select(AUTHORS.to_vec()),
        known_mask in prop::collection::vec(any::<bool>(), 30),
        permission in permission_strategy(),
        first_load in any::<bool>(),
    ) {
        let known: HashSet<MessageId> = messages
            .iter()
            .zip(&known_mask)
            .filter(|(_, known)| **known)
            .map(|(m, _)| m.id.clone())
            .collect();

        let events = compute_notifications(&messages, viewer, &known, permission, first_load);

        if first_load || permission != Permission::Granted {
            prop_assert!(events.is_empty());
        }
        let mut tags = HashSet::new();
        for event in &events {
            prop_assert!(!known.contains(&event.tag));
            prop_assert!(tags.insert(event.tag.clone()), "duplicate tag {}", event.tag);
            let source = messages.iter().find(|m| m.id == event.tag);
            prop_assert!(source.is_some_and(|m| m.author != viewer));
        }
    }

    #[test]
    fn prop_first_load_suppresses_everything(
        messages in messages_strategy(),
        viewer in prop::sample::select(AUTHORS.to_vec()),
    ) {
        let events =
            compute_notifications(&messages, viewer, &HashSet::new(), Permission::Granted, true);
        prop_assert!(events.is_empty());
    }
}

fn record(text: &str, author: &str, sent_at: u64) -> serde_json::Value {
    json!({ "text": text, "author": author, "sentAt": sent_at, "seen": false })
}

fn snapshot(ids: &[&str]) -> Snapshot {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| (MessageId::from(id), record("hey", "alice", i as u64)))
        .collect()
}

#[test]
fn dedup_yields_single_event_until_known_ids_advance() {
    let messages = reconcile(Some(&snapshot(&["a", "b", "c"])));
    let known: HashSet<MessageId> = ["a", "b"].into_iter().map(MessageId::from).collect();

    let first = compute_notifications(&messages, "bob", &known, Permission::Granted, false);
    let second = compute_notifications(&messages, "bob", &known, Permission::Granted, false);

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].tag, MessageId::from("c"));
    assert_eq!(first, second);
}

#[test]
fn first_load_of_foreign_history_is_silent() {
    let messages = reconcile(Some(&snapshot(&["a", "b", "c"])));
    let events =
        compute_notifications(&messages, "bob", &HashSet::new(), Permission::Granted, true);
    assert!(events.is_empty());
}

#[test]
fn bob_loads_alice_greeting() {
    let snapshot: Snapshot = [(MessageId::from("m1"), record("hi", "alice", 1000))]
        .into_iter()
        .collect();
    let messages = reconcile(Some(&snapshot));

    let updates = compute_seen_updates(&messages, "bob");
    assert_eq!(updates.to_writes(), [("m1/seen".to_owned(), json!(true))]);

    let on_first_load =
        compute_notifications(&messages, "bob", &HashSet::new(), Permission::Granted, true);
    assert!(on_first_load.is_empty());

    let later = compute_notifications(&messages, "bob", &HashSet::new(), Permission::Granted, false);
    assert_eq!(later.len(), 1);
    assert_eq!(later[0].tag, MessageId::from("m1"));
}
