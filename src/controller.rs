//! Outbound Action Controller
//!
//! Turns user intents into outbound events. Every operation validates first
//! and returns an [`ActionError`] without emitting anything when a
//! precondition fails. Sent messages are never appended locally; the
//! server's echo is the only copy that reaches the feed.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ActionError;
use crate::message::OutboundEvent;
use crate::store::SessionStore;
use crate::timer::DebounceTimer;
use crate::transport::Emitter;
use crate::types::{ConnectionId, MessageText, Username};

/// Inactivity period after which we stop reporting as typing
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct ActionController<E> {
    emitter: E,
    typing_timer: DebounceTimer,
}

impl<E: Emitter> ActionController<E> {
    pub fn new(emitter: E, typing_timeout: Duration) -> Self {
        Self {
            emitter,
            typing_timer: DebounceTimer::new(typing_timeout),
        }
    }

    /// Request to join the room
    ///
    /// Optimistically records the username; membership is confirmed later
    /// by the server's `user_list` / `user_joined` broadcasts.
    pub fn join(&mut self, store: &SessionStore, raw: &str) -> Result<(), ActionError> {
        let username = Username::parse(raw)?;
        ensure_connected(store)?;

        debug!("Joining chat as {}", username);
        self.emit(OutboundEvent::UserJoin(username.clone()));
        store.set_identity(username);
        Ok(())
    }

    /// Broadcast a message, then stop reporting as typing
    pub fn send_message(&mut self, store: &SessionStore, raw: &str) -> Result<(), ActionError> {
        let message = MessageText::parse(raw)?;
        ensure_connected(store)?;

        self.emit(OutboundEvent::SendMessage { message });
        self.stop_typing(store);
        Ok(())
    }

    /// Update our typing status
    ///
    /// Emits only on a change of value. While typing, every call pushes the
    /// inactivity deadline out by one timeout period.
    pub fn set_typing(
        &mut self,
        store: &SessionStore,
        typing: bool,
        now: Instant,
    ) -> Result<(), ActionError> {
        if typing {
            ensure_connected(store)?;
            if !store.local_typing() {
                store.set_local_typing_flag(true);
                self.emit(OutboundEvent::Typing(true));
            }
            self.typing_timer.arm(now);
        } else {
            self.stop_typing(store);
        }
        Ok(())
    }

    /// The draft input changed
    pub fn draft_changed(
        &mut self,
        store: &SessionStore,
        draft: &str,
        now: Instant,
    ) -> Result<(), ActionError> {
        self.set_typing(store, !draft.trim().is_empty(), now)
    }

    /// Send a direct message to one connection
    pub fn send_private_message(
        &mut self,
        store: &SessionStore,
        to: ConnectionId,
        raw: &str,
    ) -> Result<(), ActionError> {
        let message = MessageText::parse(raw)?;
        ensure_connected(store)?;

        self.emit(OutboundEvent::PrivateMessage { to, message });
        Ok(())
    }

    /// When the typing timer next expires, if armed
    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing_timer.deadline()
    }

    /// Drive the typing timer; reports stop-typing once it expires
    pub fn on_timer(&mut self, store: &SessionStore, now: Instant) {
        if self.typing_timer.fire(now) {
            debug!("Typing timer expired");
            self.stop_typing(store);
        }
    }

    /// Cancel pending timers at session teardown
    pub fn reset(&mut self) {
        self.typing_timer.cancel();
    }

    /// Clear the typing flag and timer; never refused
    fn stop_typing(&mut self, store: &SessionStore) {
        self.typing_timer.cancel();
        if store.local_typing() {
            store.set_local_typing_flag(false);
            // No connection means nobody to tell
            if store.status().is_connected() {
                self.emit(OutboundEvent::Typing(false));
            }
        }
    }

    fn emit(&self, event: OutboundEvent) {
        debug!("Emitting '{}'", event.name());
        if let Err(e) = self.emitter.emit(event) {
            warn!("Failed to emit event: {}", e);
        }
    }
}

fn ensure_connected(store: &SessionStore) -> Result<(), ActionError> {
    if store.status().is_connected() {
        Ok(())
    } else {
        debug!("Refusing intent while {}", store.status());
        Err(ActionError::NotConnected)
    }
}
