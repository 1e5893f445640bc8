//! Transcript rendering.
//!
//! Pure functions from [`ChatView`] to lines of text. The runtime decides
//! where the lines go.

use std::fmt::Display;

use chrono::TimeZone;
use murmur_client::{ChatView, ViewStatus};
use murmur_core::Message;

/// Shown while the first snapshot is outstanding.
pub const LOADING_TEXT: &str = "Loading messages...";

/// Shown once loaded with nothing to display.
pub const EMPTY_TEXT: &str = "No messages yet. Start the conversation!";

/// Shown when a send is rejected by the store.
pub const SEND_FAILED_TEXT: &str = "Failed to send message. Please try again.";

/// Placeholder for timestamps the time zone cannot represent.
const UNKNOWN_TIME: &str = "--:--";

/// Render the last `history` messages of `view` in time zone `tz`.
pub fn render_view<Tz>(view: &ChatView, history: usize, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = Vec::new();
    match view.status() {
        ViewStatus::Loading => {
            lines.push(LOADING_TEXT.to_owned());
            return lines;
        },
        ViewStatus::Empty => {
            lines.push(EMPTY_TEXT.to_owned());
            return lines;
        },
        ViewStatus::Stale => {
            let reason = view.stale.as_deref().unwrap_or("unknown error");
            lines.push(format!("Connection lost ({reason}). Showing last known messages."));
        },
        ViewStatus::Ready => {},
    }

    let skip = view.messages.len().saturating_sub(history);
    for message in &view.messages[skip..] {
        lines.push(render_message(view, message, tz));
    }
    lines
}

/// `[HH:MM] author: text`, followed by the receipt mark on own messages.
pub fn render_message<Tz>(view: &ChatView, message: &Message, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = format_time(message.sent_at, tz);
    let mut line = format!("[{time}] {}: {}", message.author, message.text);
    if let Some(receipt) = view.receipt(message) {
        line.push(' ');
        line.push_str(receipt.mark());
    }
    line
}

fn format_time<Tz>(sent_at: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(sent_at)
        .ok()
        .and_then(|millis| tz.timestamp_millis_opt(millis).single())
        .map_or_else(|| UNKNOWN_TIME.to_owned(), |time| time.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use murmur_core::MessageId;

    use super::*;

    fn message(id: &str, author: &str, text: &str, sent_at: u64, seen: bool) -> Message {
        Message {
            id: MessageId::new(id),
            text: text.to_owned(),
            author: author.to_owned(),
            sent_at,
            seen,
        }
    }

    fn ready(messages: Vec<Message>) -> ChatView {
        ChatView { viewer: "alice".to_owned(), messages, loading: false, stale: None }
    }

    #[test]
    fn loading_and_empty_states() {
        let loading = ChatView::loading("alice");
        assert_eq!(render_view(&loading, 50, &Utc), [LOADING_TEXT]);

        let empty = ready(Vec::new());
        assert_eq!(render_view(&empty, 50, &Utc), [EMPTY_TEXT]);
    }

    #[test]
    fn receipts_only_on_own_messages() {
        // 2024-01-01 09:05 UTC
        let at = 1_704_099_900_000;
        let view = ready(vec![
            message("a", "alice", "hi", at, false),
            message("b", "bob", "hey", at, false),
            message("c", "alice", "read?", at, true),
        ]);

        assert_eq!(render_view(&view, 50, &Utc), [
            "[09:05] alice: hi ✓",
            "[09:05] bob: hey",
            "[09:05] alice: read? ✓✓",
        ]);
    }

    #[test]
    fn time_zone_applies() {
        let view = ready(vec![message("a", "bob", "hey", 1_704_099_900_000, false)]);
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(render_view(&view, 50, &offset), ["[11:05] bob: hey"]);
    }

    #[test]
    fn history_keeps_latest() {
        let view = ready((0..5).map(|i| message(&i.to_string(), "bob", "x", i, false)).collect());

        let lines = render_view(&view, 2, &Utc);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.ends_with("bob: x")));
    }

    #[test]
    fn stale_keeps_last_messages() {
        let mut view = ready(vec![message("a", "bob", "hey", 0, false)]);
        view.stale = Some("subscription stream failed: gone".to_owned());

        let lines = render_view(&view, 50, &Utc);
        assert_eq!(lines[0], "Connection lost (subscription stream failed: gone). Showing last known messages.");
        assert_eq!(lines[1], "[00:00] bob: hey");
    }

    #[test]
    fn unrepresentable_time_has_placeholder() {
        let view = ready(vec![message("a", "bob", "far", u64::MAX, false)]);
        assert_eq!(render_view(&view, 50, &Utc), ["[--:--] bob: far"]);
    }
}
