//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during system execution.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all possible execution paths.
//!
//! # Architecture
//!
//! The invariant system collects the views each session published, plus the
//! seen writes it attempted, into a [`SystemSnapshot`], then runs registered
//! [`Invariant`] checks against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = world.snapshot();
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    LoadingOnlyAtStart, MessagesSorted, NoSelfSeen, SeenMonotonic, UniqueIds, ViewConvergence,
};
pub use snapshot::{SessionSnapshot, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against system state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the invariants that hold at every instant.
    ///
    /// Includes:
    /// - [`MessagesSorted`]: views are ordered by send time
    /// - [`UniqueIds`]: no message listed twice
    /// - [`SeenMonotonic`]: seen never reverts
    /// - [`NoSelfSeen`]: authors never flag their own messages
    /// - [`LoadingOnlyAtStart`]: loading ends once and for all
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(MessagesSorted);
        registry.add(UniqueIds);
        registry.add(SeenMonotonic);
        registry.add(NoSelfSeen);
        registry.add(LoadingOnlyAtStart);
        registry
    }

    /// Standard invariants plus [`ViewConvergence`], for settled systems.
    pub fn settled() -> Self {
        let mut registry = Self::standard();
        registry.add(ViewConvergence);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking on the first failure.
    ///
    /// Use this in tests where you want immediate failure with context.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use murmur_client::ChatView;
    use murmur_core::Message;

    use super::*;

    fn message(id: &str, author: &str, sent_at: u64, seen: bool) -> Message {
        Message { id: id.into(), text: "hi".into(), author: author.into(), sent_at, seen }
    }

    fn loaded(viewer: &str, messages: Vec<Message>) -> ChatView {
        ChatView { viewer: viewer.into(), messages, loading: false, stale: None }
    }

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 5);
        assert_eq!(InvariantRegistry::settled().len(), 6);
    }

    #[test]
    fn empty_snapshot_passes_invariants() {
        let registry = InvariantRegistry::settled();
        assert!(registry.check_all(&SystemSnapshot::empty()).is_ok());
    }

    #[test]
    fn unsorted_view_is_reported() {
        let mut session = SessionSnapshot::new("bob");
        session.record_view(loaded("bob", vec![
            message("a", "alice", 20, false),
            message("b", "alice", 10, false),
        ]));

        let violations =
            MessagesSorted.check(&SystemSnapshot::from_sessions(vec![session])).unwrap_err();
        assert_eq!(violations.invariant, "messages_sorted");
    }

    #[test]
    fn seen_reverting_is_reported() {
        let mut session = SessionSnapshot::new("bob");
        session.record_view(loaded("bob", vec![message("a", "alice", 1, true)]));
        session.record_view(loaded("bob", vec![message("a", "alice", 1, false)]));

        assert!(SeenMonotonic.check(&SystemSnapshot::from_sessions(vec![session])).is_err());
    }

    #[test]
    fn self_seen_write_is_reported() {
        let mut session = SessionSnapshot::new("alice");
        session.record_view(loaded("alice", vec![message("a", "alice", 1, false)]));
        session.seen_writes.push("a".into());

        assert!(NoSelfSeen.check(&SystemSnapshot::from_sessions(vec![session])).is_err());
    }

    #[test]
    fn reloading_is_reported() {
        let mut session = SessionSnapshot::new("bob");
        session.record_view(ChatView::loading("bob"));
        session.record_view(loaded("bob", Vec::new()));
        session.record_view(ChatView::loading("bob"));

        assert!(LoadingOnlyAtStart.check(&SystemSnapshot::from_sessions(vec![session])).is_err());
    }

    #[test]
    fn diverging_views_are_reported() {
        let mut alice = SessionSnapshot::new("alice");
        alice.record_view(loaded("alice", vec![message("a", "alice", 1, false)]));
        let mut bob = SessionSnapshot::new("bob");
        bob.record_view(loaded("bob", Vec::new()));

        let state = SystemSnapshot::from_sessions(vec![alice, bob]);
        assert!(ViewConvergence.check(&state).is_err());
    }

    #[test]
    fn ended_sessions_are_not_compared() {
        let mut alice = SessionSnapshot::new("alice");
        alice.record_view(loaded("alice", vec![message("a", "alice", 1, false)]));
        let mut bob = SessionSnapshot::new("bob");
        bob.record_view(loaded("bob", Vec::new()));
        bob.active = false;

        let state = SystemSnapshot::from_sessions(vec![alice, bob]);
        assert!(ViewConvergence.check(&state).is_ok());
    }
}
