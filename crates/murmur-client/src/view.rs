//! Render-ready session state.

use murmur_core::Message;

/// Read-receipt state of one of the viewer's own messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// Stored, not yet processed by anyone else.
    Sent,
    /// Processed by at least one other viewer.
    Seen,
}

impl Receipt {
    /// Check-mark rendering: one tick for sent, two for seen.
    pub fn mark(self) -> &'static str {
        match self {
            Self::Sent => "✓",
            Self::Seen => "✓✓",
        }
    }
}

/// What the view should show as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// No snapshot processed yet.
    Loading,
    /// Loaded, no messages.
    Empty,
    /// Loaded with messages.
    Ready,
    /// The live subscription failed. Messages are the last known list.
    Stale,
}

/// Snapshot of a session's state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    /// Display name of the session's user.
    pub viewer: String,
    /// Messages in display order.
    pub messages: Vec<Message>,
    /// True until the first snapshot has been processed.
    pub loading: bool,
    /// Subscription failure, once the view stopped updating.
    pub stale: Option<String>,
}

impl ChatView {
    /// View of a session that has not received anything yet.
    pub fn loading(viewer: impl Into<String>) -> Self {
        Self { viewer: viewer.into(), messages: Vec::new(), loading: true, stale: None }
    }

    /// Whether there are no messages to show.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the viewer wrote `message`.
    pub fn is_own(&self, message: &Message) -> bool {
        message.is_authored_by(&self.viewer)
    }

    /// Receipt to display next to `message`. Only the viewer's own messages
    /// carry one.
    pub fn receipt(&self, message: &Message) -> Option<Receipt> {
        if !self.is_own(message) {
            return None;
        }
        Some(if message.seen { Receipt::Seen } else { Receipt::Sent })
    }

    /// Overall status. A failed subscription wins over everything else.
    pub fn status(&self) -> ViewStatus {
        if self.stale.is_some() {
            ViewStatus::Stale
        } else if self.loading {
            ViewStatus::Loading
        } else if self.messages.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(author: &str, seen: bool) -> Message {
        Message { id: "m1".into(), text: "hi".into(), author: author.into(), sent_at: 1, seen }
    }

    #[test]
    fn receipts_only_on_own_messages() {
        let view = ChatView { loading: false, ..ChatView::loading("alice") };

        assert_eq!(view.receipt(&message("alice", false)), Some(Receipt::Sent));
        assert_eq!(view.receipt(&message("alice", true)), Some(Receipt::Seen));
        assert_eq!(view.receipt(&message("bob", true)), None);
    }

    #[test]
    fn status_progression() {
        let mut view = ChatView::loading("alice");
        assert_eq!(view.status(), ViewStatus::Loading);

        view.loading = false;
        assert_eq!(view.status(), ViewStatus::Empty);

        view.messages.push(message("bob", false));
        assert_eq!(view.status(), ViewStatus::Ready);

        view.stale = Some("connection reset".into());
        assert_eq!(view.status(), ViewStatus::Stale);
    }

    #[test]
    fn receipt_marks() {
        assert_eq!(Receipt::Sent.mark(), "✓");
        assert_eq!(Receipt::Seen.mark(), "✓✓");
    }
}
