//! Session data model
//!
//! Chat messages, connection status and the local identity.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::types::{ConnectionId, MessageId, Username};

/// Sender name used for locally synthesized notices
pub const SYSTEM_SENDER: &str = "System";

/// A message in the feed
///
/// Immutable once appended to the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: String,
    /// Absent only for system notices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<ConnectionId>,
    pub message: String,
    /// ISO-8601
    pub timestamp: String,
    pub is_system: bool,
    pub is_private: bool,
}

impl ChatMessage {
    /// Synthesize a system notice stamped with local wall-clock time
    pub fn system(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::local(),
            sender: SYSTEM_SENDER.to_string(),
            sender_id: None,
            message: text.into(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            is_system: true,
            is_private: false,
        }
    }

    /// Whether this message was sent from the given connection
    pub fn is_from(&self, connection: Option<&ConnectionId>) -> bool {
        match (&self.sender_id, connection) {
            (Some(sender), Some(own)) => sender == own,
            _ => false,
        }
    }
}

/// Transport connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    ConnectionError,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Connected
    }

    /// Human-readable label for status lines
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::ConnectionError => "Connection Error",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Local identity
///
/// The connection id exists only while connected; the username is set
/// once the user asks to join.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub connection_id: Option<ConnectionId>,
    pub username: Option<Username>,
}
