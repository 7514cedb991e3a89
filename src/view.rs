//! Presentation helpers
//!
//! Pure formatting of session state into display text. Nothing here touches
//! the store.

use chrono::{DateTime, Local};

use crate::model::ChatMessage;
use crate::types::ConnectionId;

/// "Alice is typing..." / "Alice, Bob are typing..."
pub fn typing_indicator(names: &[&str]) -> Option<String> {
    match names {
        [] => None,
        [one] => Some(format!("{} is typing...", one)),
        many => Some(format!("{} are typing...", many.join(", "))),
    }
}

/// "1 user online" / "3 users online"
pub fn online_count(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} user{} online", count, plural)
}

/// Local `HH:MM` for an ISO-8601 timestamp
///
/// Unparseable timestamps are shown as-is.
pub fn format_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(ts) => ts.with_timezone(&Local).format("%H:%M").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// One feed line for a message
pub fn message_line(msg: &ChatMessage, own: Option<&ConnectionId>) -> String {
    if msg.is_system {
        return format!("-- {} --", msg.message);
    }

    let mut header = format!("[{}] {}", format_time(&msg.timestamp), msg.sender);
    if msg.is_from(own) {
        header.push_str(" (you)");
    }
    if msg.is_private {
        header.push_str(" [Private]");
    }
    format!("{}: {}", header, msg.message)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::MessageId;

    fn msg(text: &str, private: bool) -> ChatMessage {
        ChatMessage {
            id: MessageId::Number(1),
            sender: "Alice".to_string(),
            sender_id: Some(ConnectionId::new("a")),
            message: text.to_string(),
            timestamp: "not-a-time".to_string(),
            is_system: false,
            is_private: private,
        }
    }

    #[test]
    fn test_typing_indicator() {
        assert_eq!(typing_indicator(&[]), None);
        assert_eq!(typing_indicator(&["Bob"]).unwrap(), "Bob is typing...");
        assert_eq!(
            typing_indicator(&["Bob", "Eve"]).unwrap(),
            "Bob, Eve are typing..."
        );
    }

    #[test]
    fn test_online_count() {
        assert_eq!(online_count(0), "0 users online");
        assert_eq!(online_count(1), "1 user online");
        assert_eq!(online_count(4), "4 users online");
    }

    #[test]
    fn test_format_time_shape() {
        let formatted = format_time("2024-05-01T12:30:00.000Z");
        assert_eq!(formatted.len(), 5);
        assert_eq!(formatted.as_bytes()[2], b':');

        assert_eq!(format_time("garbage"), "garbage");
    }

    #[test]
    fn test_message_lines() {
        let own = ConnectionId::new("a");
        assert_eq!(
            message_line(&msg("hi", false), None),
            "[not-a-time] Alice: hi"
        );
        assert_eq!(
            message_line(&msg("psst", true), Some(&own)),
            "[not-a-time] Alice (you) [Private]: psst"
        );

        let notice = ChatMessage::system("Bob joined the chat", Utc::now());
        assert_eq!(message_line(&notice, None), "-- Bob joined the chat --");
    }
}
