//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::{HashMap, HashSet};

use murmur_core::MessageId;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Every view lists messages in ascending `sent_at` order.
pub struct MessagesSorted;

impl Invariant for MessagesSorted {
    fn name(&self) -> &'static str {
        "messages_sorted"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            for (index, view) in session.views.iter().enumerate() {
                if let Some(pair) = view.messages.windows(2).find(|w| w[0].sent_at > w[1].sent_at) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "{} view {}: {} ({}) listed before {} ({})",
                            session.viewer,
                            index,
                            pair[0].id,
                            pair[0].sent_at,
                            pair[1].id,
                            pair[1].sent_at
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// No view lists the same message id twice.
pub struct UniqueIds;

impl Invariant for UniqueIds {
    fn name(&self) -> &'static str {
        "unique_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            for (index, view) in session.views.iter().enumerate() {
                let mut ids = HashSet::new();
                for message in &view.messages {
                    if !ids.insert(&message.id) {
                        return Err(Violation {
                            invariant: self.name(),
                            message: format!(
                                "{} view {}: duplicate id {}",
                                session.viewer, index, message.id
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Once a session has shown a message as seen, it never shows it unseen.
pub struct SeenMonotonic;

impl Invariant for SeenMonotonic {
    fn name(&self) -> &'static str {
        "seen_monotonic"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            let mut seen: HashSet<&MessageId> = HashSet::new();
            for (index, view) in session.views.iter().enumerate() {
                for message in &view.messages {
                    if message.seen {
                        seen.insert(&message.id);
                    } else if seen.contains(&message.id) {
                        return Err(Violation {
                            invariant: self.name(),
                            message: format!(
                                "{} view {}: {} reverted to unseen",
                                session.viewer, index, message.id
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// A session never tries to mark its own viewer's messages seen.
pub struct NoSelfSeen;

impl Invariant for NoSelfSeen {
    fn name(&self) -> &'static str {
        "no_self_seen"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            let authors: HashMap<&MessageId, &str> = session
                .views
                .iter()
                .flat_map(|view| &view.messages)
                .map(|message| (&message.id, message.author.as_str()))
                .collect();

            for id in &session.seen_writes {
                if authors.get(id) == Some(&session.viewer.as_str()) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("{} marked own message {} seen", session.viewer, id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Once a view has left the loading state it never returns to it.
pub struct LoadingOnlyAtStart;

impl Invariant for LoadingOnlyAtStart {
    fn name(&self) -> &'static str {
        "loading_only_at_start"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            if let Some(loaded) = session.views.iter().position(|view| !view.loading) {
                if let Some(offset) = session.views[loaded..].iter().position(|view| view.loading)
                {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "{} view {}: loading again after first snapshot",
                            session.viewer,
                            loaded + offset
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// All live sessions show the same message list.
///
/// Only meaningful once the simulation has settled, so it is not part of
/// the standard registry.
pub struct ViewConvergence;

impl Invariant for ViewConvergence {
    fn name(&self) -> &'static str {
        "view_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut live = state
            .sessions
            .iter()
            .filter_map(|session| session.latest().map(|view| (session, view)))
            .filter(|(session, view)| session.active && view.stale.is_none());

        let Some((first, reference)) = live.next() else {
            return Ok(());
        };

        for (session, view) in live {
            if view.messages != reference.messages {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{} shows {} messages, {} shows {}",
                        first.viewer,
                        reference.messages.len(),
                        session.viewer,
                        view.messages.len()
                    ),
                });
            }
        }
        Ok(())
    }
}
