//! Fuzz target for SyncEngine cycles
//!
//! Builds a growing sequence of structured snapshots (including malformed
//! records and re-deliveries) and drives a SyncEngine through them. Checks:
//! - No message is alerted twice
//! - Nothing from the first snapshot is alerted
//! - Seen writes never target the viewer's own messages
//! - The view stays sorted

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use murmur_client::{SyncAction, SyncEngine, SyncEvent};
use murmur_core::{MessageId, Permission, Snapshot};
use serde_json::{Value, json};

const VIEWER: &str = "alice";

#[derive(Debug, Arbitrary)]
struct FuzzRecord {
    text: Option<String>,
    author: u8,
    sent_at: u16,
    seen: Option<bool>,
    legacy: bool,
}

impl FuzzRecord {
    fn to_value(&self) -> Value {
        let author = ["alice", "bob", "carol", ""][usize::from(self.author % 4)];
        let mut record = if self.legacy {
            json!({ "username": author, "timestamp": self.sent_at })
        } else {
            json!({ "author": author, "sentAt": self.sent_at })
        };
        if let Some(text) = &self.text {
            record["text"] = json!(text);
        }
        if let Some(seen) = self.seen {
            record["seen"] = json!(seen);
        }
        record
    }
}

#[derive(Debug, Arbitrary)]
enum Step {
    Append(FuzzRecord),
    Redeliver,
    Fail,
}

fuzz_target!(|steps: Vec<Step>| {
    let mut engine = SyncEngine::new(VIEWER, Permission::Granted);
    let mut snapshot = Snapshot::new();
    let mut next_id = 0u32;
    let mut first_load: Option<HashSet<MessageId>> = None;
    let mut alerted = HashSet::new();

    for step in &steps {
        let event = match step {
            Step::Append(record) => {
                snapshot.push(MessageId::new(format!("-{next_id:08}")), record.to_value());
                next_id += 1;
                SyncEvent::SnapshotReceived(Some(snapshot.clone()))
            },
            Step::Redeliver => SyncEvent::SnapshotReceived(Some(snapshot.clone())),
            Step::Fail => SyncEvent::SubscriptionFailed { reason: "fuzz".to_owned() },
        };

        for action in engine.handle(event) {
            match action {
                SyncAction::Notify(event) => {
                    let initial = first_load.as_ref().is_some_and(|ids| ids.contains(&event.tag));
                    assert!(!initial, "first-load message alerted");
                    assert!(alerted.insert(event.tag), "message alerted twice");
                },
                SyncAction::WriteSeen(updates) => {
                    for id in updates.ids() {
                        let message = engine.messages().iter().find(|m| &m.id == id);
                        assert!(message.is_some_and(|m| m.author != VIEWER), "self seen write");
                    }
                },
                SyncAction::RequestPermission | SyncAction::Render => {},
            }
        }

        if first_load.is_none() && !engine.state().is_loading() {
            first_load = Some(engine.messages().iter().map(|m| m.id.clone()).collect());
        }

        for pair in engine.messages().windows(2) {
            assert!(pair[0].sent_at <= pair[1].sent_at);
        }
    }
});
