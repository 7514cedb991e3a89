//! Error types for the chat client
//!
//! Defines transport-level errors, boundary payload errors and
//! local validation errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::{MAX_MESSAGE_LEN, MAX_USERNAME_LEN};

/// Application-level errors
///
/// These never cross into the presentation layer; the session only
/// reflects them through the coarse connection status.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Inbound frame rejected at the transport boundary
///
/// Rejected frames are logged and dropped; they never reach the reconciler.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Frame is not a `{event, data}` JSON envelope
    #[error("invalid frame: {0}")]
    InvalidFrame(#[source] serde_json::Error),

    /// Event name outside the inbound contract
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    /// Payload does not match the schema of its event
    #[error("malformed '{event}' payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// User intent refused before anything is emitted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// Display name is empty after trimming
    #[error("username is empty")]
    EmptyUsername,

    /// Display name is longer than allowed
    #[error("username has {} characters, limit is {}", .0, MAX_USERNAME_LEN)]
    UsernameTooLong(usize),

    /// Message is empty after trimming
    #[error("message is empty")]
    EmptyMessage,

    /// Message is longer than allowed
    #[error("message has {} characters, limit is {}", .0, MAX_MESSAGE_LEN)]
    MessageTooLong(usize),

    /// Intent requires a live connection
    #[error("not connected")]
    NotConnected,
}

/// Message send errors
///
/// Occurs when emitting through a transport whose channel has been closed.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
