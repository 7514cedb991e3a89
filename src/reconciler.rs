//! Event Reconciler
//!
//! Merges inbound events into the session store. Content events go through
//! six subscribed handlers that are attached for the lifetime of a session;
//! connection lifecycle events (`connect`, `disconnect`, `connect_error`) are
//! always applied so the status line stays accurate even outside a session.
//!
//! Merge rules:
//! - messages are appended in arrival order, never reordered or deduplicated
//! - roster and typing set are replaced by each snapshot, never patched
//! - `private_message` is always marked private, whatever the payload says

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::message::{InboundEvent, InboundEventKind};
use crate::model::{ChatMessage, ConnectionStatus};
use crate::store::SessionStore;

/// Content events handled while attached
pub const CONTENT_EVENTS: [InboundEventKind; 6] = [
    InboundEventKind::ReceiveMessage,
    InboundEventKind::UserList,
    InboundEventKind::UserJoined,
    InboundEventKind::UserLeft,
    InboundEventKind::TypingUsers,
    InboundEventKind::PrivateMessage,
];

/// Wall clock used to stamp system notices
pub type WallClock = fn() -> DateTime<Utc>;

#[derive(Debug)]
pub struct EventReconciler {
    handlers: HashSet<InboundEventKind>,
    clock: WallClock,
}

impl Default for EventReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReconciler {
    /// Create a detached reconciler using the system clock
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: WallClock) -> Self {
        Self {
            handlers: HashSet::new(),
            clock,
        }
    }

    /// Register the content handlers
    ///
    /// Attaching twice keeps exactly one handler per event.
    pub fn attach(&mut self) {
        self.handlers.extend(CONTENT_EVENTS);
        debug!("Reconciler attached ({} handlers)", self.handlers.len());
    }

    /// Remove all content handlers
    pub fn detach(&mut self) {
        self.handlers.clear();
        debug!("Reconciler detached");
    }

    pub fn is_attached(&self, kind: InboundEventKind) -> bool {
        self.handlers.contains(&kind)
    }

    /// Apply one inbound event to the store
    ///
    /// Returns false if no handler is registered for the event.
    pub fn apply(&self, store: &SessionStore, event: InboundEvent) -> bool {
        let kind = event.kind();
        if !kind.is_lifecycle() && !self.is_attached(kind) {
            debug!("No handler for '{}', dropping", kind);
            return false;
        }

        match event {
            InboundEvent::Connect { id } => {
                match &id {
                    Some(id) => info!("Connected to server as {}", id),
                    None => info!("Connected to server"),
                }
                store.set_connected(id);
            }
            InboundEvent::Disconnect => {
                info!("Disconnected from server");
                store.set_status(ConnectionStatus::Disconnected);
            }
            InboundEvent::ConnectError { detail } => {
                warn!("Connection error: {}", detail);
                store.set_status(ConnectionStatus::ConnectionError);
            }
            InboundEvent::ReceiveMessage(message) => {
                debug!("Received message {} from {}", message.id, message.sender);
                store.append_message(message);
            }
            InboundEvent::UserList(entries) => {
                debug!("User list updated: {} online", entries.len());
                store.replace_roster(entries);
            }
            InboundEvent::UserJoined { username } => {
                debug!("User joined: {}", username);
                let notice = format!("{} joined the chat", username);
                store.append_message(ChatMessage::system(notice, (self.clock)()));
            }
            InboundEvent::UserLeft { username } => {
                debug!("User left: {}", username);
                let notice = format!("{} left the chat", username);
                store.append_message(ChatMessage::system(notice, (self.clock)()));
            }
            InboundEvent::TypingUsers(names) => {
                store.replace_typing_set(names);
            }
            InboundEvent::PrivateMessage(mut message) => {
                debug!("Private message {} from {}", message.id, message.sender);
                message.is_private = true;
                store.append_message(message);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::roster::RosterEntry;
    use crate::types::{ConnectionId, MessageId};

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn attached() -> EventReconciler {
        let mut reconciler = EventReconciler::with_clock(fixed_clock);
        reconciler.attach();
        reconciler
    }

    fn chat(id: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::Text(id.to_string()),
            sender: "Alice".to_string(),
            sender_id: Some(ConnectionId::new("s1")),
            message: text.to_string(),
            timestamp: "2024-05-01T09:00:00.000Z".to_string(),
            is_system: false,
            is_private: false,
        }
    }

    #[test]
    fn test_lifecycle_events_set_status() {
        let store = SessionStore::new();
        let reconciler = EventReconciler::new();

        reconciler.apply(&store, InboundEvent::Connect { id: None });
        assert_eq!(store.status(), ConnectionStatus::Connected);
        assert!(store.snapshot().identity.connection_id.is_none());

        reconciler.apply(
            &store,
            InboundEvent::Connect {
                id: Some(ConnectionId::new("abc")),
            },
        );
        assert_eq!(store.status(), ConnectionStatus::Connected);
        assert_eq!(
            store.snapshot().identity.connection_id,
            Some(ConnectionId::new("abc"))
        );

        reconciler.apply(&store, InboundEvent::Disconnect);
        assert_eq!(store.status(), ConnectionStatus::Disconnected);
        assert!(store.snapshot().identity.connection_id.is_none());

        reconciler.apply(
            &store,
            InboundEvent::ConnectError { detail: "refused".to_string() },
        );
        assert_eq!(store.status(), ConnectionStatus::ConnectionError);
    }

    #[test]
    fn test_messages_kept_in_arrival_order_without_dedup() {
        let store = SessionStore::new();
        let reconciler = attached();
        let sequence = vec![chat("2", "second"), chat("1", "first"), chat("2", "second")];

        for msg in sequence.clone() {
            reconciler.apply(&store, InboundEvent::ReceiveMessage(msg));
        }

        assert_eq!(store.snapshot().messages, sequence);
    }

    #[test]
    fn test_snapshot_replacement_is_idempotent() {
        let store = SessionStore::new();
        let reconciler = attached();
        let roster = vec![RosterEntry::new("1", "Bob"), RosterEntry::new("2", "Eve")];
        let typing = vec!["Eve".to_string()];

        for _ in 0..2 {
            reconciler.apply(&store, InboundEvent::UserList(roster.clone()));
            reconciler.apply(&store, InboundEvent::TypingUsers(typing.clone()));
        }

        let snap = store.snapshot();
        assert_eq!(snap.roster.entries(), roster.as_slice());
        assert_eq!(snap.typing, typing);
    }

    #[test]
    fn test_join_then_user_list_scenario() {
        let store = SessionStore::new();
        let reconciler = attached();
        reconciler.apply(
            &store,
            InboundEvent::UserList(vec![RosterEntry::new("9", "Old")]),
        );

        reconciler.apply(&store, InboundEvent::UserJoined { username: "Bob".to_string() });
        reconciler.apply(&store, InboundEvent::UserList(vec![RosterEntry::new("1", "Bob")]));

        let snap = store.snapshot();
        assert_eq!(snap.messages.len(), 1);
        let notice = &snap.messages[0];
        assert!(notice.is_system);
        assert_eq!(notice.message, "Bob joined the chat");
        assert_eq!(notice.timestamp, "2024-05-01T09:00:00.000Z");
        assert_eq!(snap.roster.entries(), [RosterEntry::new("1", "Bob")]);
    }

    #[test]
    fn test_user_left_notice() {
        let store = SessionStore::new();
        let reconciler = attached();

        reconciler.apply(&store, InboundEvent::UserLeft { username: "Eve".to_string() });

        let snap = store.snapshot();
        assert_eq!(snap.messages[0].message, "Eve left the chat");
        assert_eq!(snap.messages[0].sender, "System");
    }

    #[test]
    fn test_private_message_forced_private() {
        let store = SessionStore::new();
        let reconciler = attached();
        let msg = chat("p1", "psst");
        assert!(!msg.is_private);

        reconciler.apply(&store, InboundEvent::PrivateMessage(msg));

        let snap = store.snapshot();
        assert!(snap.messages[0].is_private);
        assert_eq!(snap.messages[0].message, "psst");
    }

    #[test]
    fn test_detached_drops_content_but_tracks_status() {
        let store = SessionStore::new();
        let mut reconciler = attached();
        reconciler.detach();
        assert!(CONTENT_EVENTS.iter().all(|kind| !reconciler.is_attached(*kind)));

        assert!(!reconciler.apply(&store, InboundEvent::ReceiveMessage(chat("1", "x"))));
        assert!(reconciler.apply(&store, InboundEvent::Disconnect));

        let snap = store.snapshot();
        assert!(snap.messages.is_empty());
        assert_eq!(snap.status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_attach_twice_registers_once() {
        let store = SessionStore::new();
        let mut reconciler = attached();
        reconciler.attach();
        assert!(CONTENT_EVENTS.iter().all(|kind| reconciler.is_attached(*kind)));

        reconciler.apply(&store, InboundEvent::ReceiveMessage(chat("1", "x")));
        assert_eq!(store.snapshot().messages.len(), 1);
    }
}
