//! New-message notification gating.
//!
//! Decides which messages in a snapshot deserve a user-visible alert. The
//! gate only reads permission state; asking the user for permission happens
//! elsewhere and feeds back in as a [`Permission`] value.

use std::collections::HashSet;

use crate::message::{Message, MessageId};

/// Maximum notification body length in characters.
pub const NOTIFICATION_BODY_MAX_CHARS: usize = 120;

/// Notification delivery permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Permission {
    /// The user has not been asked yet.
    #[default]
    Unknown,
    /// Notifications may be shown.
    Granted,
    /// The user refused notifications.
    Denied,
}

impl Permission {
    /// Whether notifications may be delivered.
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// A user-visible alert for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Dedup tag. Equal to the message id, so the notification surface shows
    /// at most one alert per message even if a snapshot is delivered twice.
    pub tag: MessageId,
    /// Alert title naming the author.
    pub title: String,
    /// Message text, truncated to [`NOTIFICATION_BODY_MAX_CHARS`].
    pub body: String,
}

impl NotificationEvent {
    /// Build the alert for `message`.
    pub fn for_message(message: &Message) -> Self {
        Self {
            tag: message.id.clone(),
            title: format!("New message from {}", message.author),
            body: truncate(&message.text, NOTIFICATION_BODY_MAX_CHARS),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Alerts owed to `viewer` for `messages`.
///
/// A message alerts only if someone else wrote it, its id is not in
/// `known_ids`, permission is granted and this is not the first load.
/// Advancing `known_ids` is the caller's job.
pub fn compute_notifications(
    messages: &[Message],
    viewer: &str,
    known_ids: &HashSet<MessageId>,
    permission: Permission,
    is_first_load: bool,
) -> Vec<NotificationEvent> {
    if is_first_load || !permission.is_granted() {
        return Vec::new();
    }

    messages
        .iter()
        .filter(|message| !message.is_authored_by(viewer) && !known_ids.contains(&message.id))
        .map(NotificationEvent::for_message)
        .collect()
}
