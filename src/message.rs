//! Message protocol definitions
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Outbound events serialize through Serde's adjacently tagged enum; inbound
//! frames are decoded in two steps (envelope, then typed payload) so that
//! unknown or malformed events are rejected here and never reach the reconciler.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PayloadError;
use crate::model::ChatMessage;
use crate::roster::RosterEntry;
use crate::types::{ConnectionId, MessageId, MessageText, Username};

/// Client → Server event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Request to join the room under a display name
    UserJoin(Username),
    /// Broadcast a chat message
    SendMessage { message: MessageText },
    /// Local typing status changed
    Typing(bool),
    /// Direct message to one connection
    PrivateMessage { to: ConnectionId, message: MessageText },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::UserJoin(_) => "user_join",
            OutboundEvent::SendMessage { .. } => "send_message",
            OutboundEvent::Typing(_) => "typing",
            OutboundEvent::PrivateMessage { .. } => "private_message",
        }
    }

    /// Encode as a text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Server → Client event, after boundary validation
///
/// `Disconnect` and `ConnectError` are produced by the transport itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Connection established
    ///
    /// The transport reports the handshake without an id; a server
    /// `connect` frame may follow carrying the assigned id.
    Connect { id: Option<ConnectionId> },
    /// Connection lost
    Disconnect,
    /// Connection attempt failed
    ConnectError { detail: String },
    /// Shared-channel message
    ReceiveMessage(ChatMessage),
    /// Full presence snapshot
    UserList(Vec<RosterEntry>),
    /// Someone joined
    UserJoined { username: String },
    /// Someone left
    UserLeft { username: String },
    /// Full typing snapshot
    TypingUsers(Vec<String>),
    /// Direct message
    PrivateMessage(ChatMessage),
}

/// Closed set of inbound event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundEventKind {
    Connect,
    Disconnect,
    ConnectError,
    ReceiveMessage,
    UserList,
    UserJoined,
    UserLeft,
    TypingUsers,
    PrivateMessage,
}

impl InboundEventKind {
    /// Wire name of this event
    pub fn name(self) -> &'static str {
        match self {
            InboundEventKind::Connect => "connect",
            InboundEventKind::Disconnect => "disconnect",
            InboundEventKind::ConnectError => "connect_error",
            InboundEventKind::ReceiveMessage => "receive_message",
            InboundEventKind::UserList => "user_list",
            InboundEventKind::UserJoined => "user_joined",
            InboundEventKind::UserLeft => "user_left",
            InboundEventKind::TypingUsers => "typing_users",
            InboundEventKind::PrivateMessage => "private_message",
        }
    }

    /// Connection lifecycle events, as opposed to content events
    pub fn is_lifecycle(self) -> bool {
        matches!(
            self,
            InboundEventKind::Connect
                | InboundEventKind::Disconnect
                | InboundEventKind::ConnectError
        )
    }
}

impl std::fmt::Display for InboundEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl InboundEvent {
    pub fn kind(&self) -> InboundEventKind {
        match self {
            InboundEvent::Connect { .. } => InboundEventKind::Connect,
            InboundEvent::Disconnect => InboundEventKind::Disconnect,
            InboundEvent::ConnectError { .. } => InboundEventKind::ConnectError,
            InboundEvent::ReceiveMessage(_) => InboundEventKind::ReceiveMessage,
            InboundEvent::UserList(_) => InboundEventKind::UserList,
            InboundEvent::UserJoined { .. } => InboundEventKind::UserJoined,
            InboundEvent::UserLeft { .. } => InboundEventKind::UserLeft,
            InboundEvent::TypingUsers(_) => InboundEventKind::TypingUsers,
            InboundEvent::PrivateMessage(_) => InboundEventKind::PrivateMessage,
        }
    }
}

/// Raw frame envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// `connect` payload, when the server sends one
#[derive(Debug, Deserialize)]
struct ConnectPayload {
    #[serde(default)]
    id: Option<ConnectionId>,
}

/// `user_joined` / `user_left` payload
#[derive(Debug, Deserialize)]
struct UserPayload {
    username: String,
}

/// Chat message as received
///
/// `senderId` is required on the wire; the flags default to false.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePayload {
    id: MessageId,
    sender: String,
    sender_id: ConnectionId,
    message: String,
    timestamp: String,
    #[serde(default)]
    is_system: bool,
    #[serde(default)]
    is_private: bool,
}

impl From<MessagePayload> for ChatMessage {
    fn from(p: MessagePayload) -> Self {
        ChatMessage {
            id: p.id,
            sender: p.sender,
            sender_id: Some(p.sender_id),
            message: p.message,
            timestamp: p.timestamp,
            is_system: p.is_system,
            is_private: p.is_private,
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: InboundEventKind,
    data: Value,
) -> Result<T, PayloadError> {
    serde_json::from_value(data).map_err(|source| PayloadError::Malformed {
        event: kind.name(),
        source,
    })
}

/// Decode a server text frame into a validated inbound event
///
/// Only server-sent events are accepted; `disconnect` and `connect_error`
/// are reserved for the transport and rejected as unknown.
pub fn decode_inbound(text: &str) -> Result<InboundEvent, PayloadError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(PayloadError::InvalidFrame)?;

    let event = match envelope.event.as_str() {
        "connect" => {
            let p: Option<ConnectPayload> = payload(InboundEventKind::Connect, envelope.data)?;
            InboundEvent::Connect {
                id: p.and_then(|p| p.id),
            }
        }
        "receive_message" => {
            let p: MessagePayload = payload(InboundEventKind::ReceiveMessage, envelope.data)?;
            InboundEvent::ReceiveMessage(p.into())
        }
        "user_list" => InboundEvent::UserList(payload(InboundEventKind::UserList, envelope.data)?),
        "user_joined" => {
            let p: UserPayload = payload(InboundEventKind::UserJoined, envelope.data)?;
            InboundEvent::UserJoined { username: p.username }
        }
        "user_left" => {
            let p: UserPayload = payload(InboundEventKind::UserLeft, envelope.data)?;
            InboundEvent::UserLeft { username: p.username }
        }
        "typing_users" => {
            InboundEvent::TypingUsers(payload(InboundEventKind::TypingUsers, envelope.data)?)
        }
        "private_message" => {
            let p: MessagePayload = payload(InboundEventKind::PrivateMessage, envelope.data)?;
            InboundEvent::PrivateMessage(p.into())
        }
        _ => return Err(PayloadError::UnknownEvent(envelope.event)),
    };

    Ok(event)
}
