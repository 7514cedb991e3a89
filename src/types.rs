//! Basic type definitions for the chat client
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: server-assigned, connection-scoped identifier
//! - `MessageId`: message identifier (string or number on the wire)
//! - `Username`: validated display name (1-20 characters)
//! - `MessageText`: validated message body (1-500 characters)

use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Maximum display name length in characters
pub const MAX_USERNAME_LEN: usize = 20;

/// Maximum message body length in characters
pub const MAX_MESSAGE_LEN: usize = 500;

/// Connection identifier assigned by the server on connect
///
/// Opaque to the client. A new connection yields a new identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier
///
/// Servers assign either string or numeric ids; both are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Text(String),
    Number(u64),
}

impl MessageId {
    /// Generate a unique id for a locally synthesized message
    pub fn local() -> Self {
        Self::Text(format!("local-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Text(s) => write!(f, "{}", s),
            MessageId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// User-chosen display name, trimmed and length-checked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Trim and validate a raw display name
    pub fn parse(raw: &str) -> Result<Self, ActionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ActionError::EmptyUsername);
        }
        let len = trimmed.chars().count();
        if len > MAX_USERNAME_LEN {
            return Err(ActionError::UsernameTooLong(len));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound message body, trimmed and length-checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageText(String);

impl MessageText {
    /// Trim and validate a raw message body
    pub fn parse(raw: &str) -> Result<Self, ActionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ActionError::EmptyMessage);
        }
        let len = trimmed.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(ActionError::MessageTooLong(len));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
