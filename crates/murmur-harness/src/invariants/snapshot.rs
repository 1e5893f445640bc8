//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture what each session has shown over time. Invariants
//! operate on snapshots rather than live sessions so that every check sees
//! one consistent picture.

use murmur_client::ChatView;
use murmur_core::MessageId;

/// Snapshot of every session in a simulation.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-session snapshots.
    pub sessions: Vec<SessionSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no sessions).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot from multiple sessions.
    pub fn from_sessions(sessions: Vec<SessionSnapshot>) -> Self {
        Self { sessions }
    }

    /// Add a session snapshot.
    pub fn add_session(&mut self, session: SessionSnapshot) {
        self.sessions.push(session);
    }
}

/// Observable history of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Display name of the session's user.
    pub viewer: String,
    /// Every distinct view the session published, oldest first.
    pub views: Vec<ChatView>,
    /// Every message id the session tried to mark seen.
    pub seen_writes: Vec<MessageId>,
    /// Whether the session was still running when the snapshot was taken.
    pub active: bool,
}

impl SessionSnapshot {
    /// Create an empty history for `viewer`.
    pub fn new(viewer: impl Into<String>) -> Self {
        Self { viewer: viewer.into(), active: true, ..Default::default() }
    }

    /// Record a published view. Consecutive duplicates are dropped.
    pub fn record_view(&mut self, view: ChatView) {
        if self.views.last() != Some(&view) {
            self.views.push(view);
        }
    }

    /// Most recent view.
    pub fn latest(&self) -> Option<&ChatView> {
        self.views.last()
    }
}
