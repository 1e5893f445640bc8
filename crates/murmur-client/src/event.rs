//! Engine events and actions.

use murmur_core::{NotificationEvent, Permission, SeenUpdates, Snapshot};

/// Events the caller feeds into the [`SyncEngine`](crate::SyncEngine).
///
/// The caller is responsible for:
/// - Forwarding every subscription delivery, in order
/// - Reporting stream failures
/// - Reporting the outcome of a permission request it was asked to make
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The store delivered the full collection. `None` means no messages.
    SnapshotReceived(Option<Snapshot>),

    /// The subscription stream failed and will deliver nothing further.
    SubscriptionFailed {
        /// Failure reported by the store.
        reason: String,
    },

    /// A permission request issued via [`SyncAction::RequestPermission`]
    /// completed.
    PermissionResolved(Permission),
}

/// Actions the engine produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Write `seen = true` for these messages. Best effort; failures are
    /// logged and never fed back.
    WriteSeen(SeenUpdates),

    /// Show a notification on the notification surface.
    Notify(NotificationEvent),

    /// Ask the user for notification permission, then report the result as
    /// [`SyncEvent::PermissionResolved`].
    RequestPermission,

    /// The view model changed and should be redrawn.
    Render,
}
