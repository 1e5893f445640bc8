//! Fuzz target for Snapshot::from_json and reconcile
//!
//! Feeds arbitrary bytes to the snapshot decoder. Anything that decodes is
//! reconciled. Checks:
//! - Decoding never panics, invalid input is an error
//! - Reconciled output is sorted by sent_at
//! - Reconciled output never holds more messages than the snapshot

#![no_main]

use libfuzzer_sys::fuzz_target;
use murmur_core::{MessageStore, Snapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = Snapshot::from_json(json) else {
        return;
    };

    let mut store = MessageStore::new();
    let messages = store.reconcile(snapshot.as_ref());

    let records = snapshot.as_ref().map_or(0, Snapshot::len);
    assert!(messages.len() <= records);
    for pair in messages.windows(2) {
        assert!(pair[0].sent_at <= pair[1].sent_at, "reconciled output out of order");
    }
});
