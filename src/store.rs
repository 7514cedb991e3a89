//! Session State Store
//!
//! Holds the canonical client-side view of one session. All mutation goes
//! through the named reducer operations below; each one publishes a single
//! new snapshot through a `watch` channel, so observers never see a partial
//! update.

use tokio::sync::watch;
use tracing::trace;

use crate::model::{ChatMessage, ConnectionStatus, Identity};
use crate::roster::{Roster, RosterEntry};
use crate::types::{ConnectionId, Username};

/// Everything the presentation layer can observe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    pub identity: Identity,
    /// Arrival order, append-only
    pub messages: Vec<ChatMessage>,
    pub roster: Roster,
    /// Display names currently composing, as last broadcast
    pub typing: Vec<String>,
    /// Our own outbound typing status
    pub local_typing: bool,
}

impl SessionSnapshot {
    /// The user has asked to join under a display name
    pub fn is_joined(&self) -> bool {
        self.identity.username.is_some()
    }

    /// Typing users other than ourselves
    pub fn others_typing(&self) -> Vec<&str> {
        let own = self.identity.username.as_ref().map(Username::as_str);
        self.typing
            .iter()
            .map(String::as_str)
            .filter(|name| Some(*name) != own)
            .collect()
    }
}

/// Single-writer store for one session
#[derive(Debug)]
pub struct SessionStore {
    state: watch::Sender<SessionSnapshot>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { state }
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Borrow the current snapshot
    ///
    /// Do not hold the guard across reducer calls.
    pub fn snapshot(&self) -> watch::Ref<'_, SessionSnapshot> {
        self.state.borrow()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.borrow().status
    }

    pub fn local_typing(&self) -> bool {
        self.state.borrow().local_typing
    }

    /// Set connection status
    ///
    /// Leaving `Connected` drops the connection id, which is only valid
    /// for the connection that issued it.
    pub fn set_status(&self, status: ConnectionStatus) {
        trace!("set_status {:?}", status);
        self.state.send_modify(|s| {
            s.status = status;
            if !status.is_connected() {
                s.identity.connection_id = None;
            }
        });
    }

    /// Mark the connection live, recording the server-assigned id if given
    ///
    /// Status and id are published together. Without an id, any id already
    /// recorded for this connection is kept.
    pub fn set_connected(&self, id: Option<ConnectionId>) {
        trace!("set_connected {:?}", id);
        self.state.send_modify(|s| {
            s.status = ConnectionStatus::Connected;
            if id.is_some() {
                s.identity.connection_id = id;
            }
        });
    }

    /// Record the display name we joined with
    pub fn set_identity(&self, username: Username) {
        trace!("set_identity {}", username);
        self.state.send_modify(|s| s.identity.username = Some(username));
    }

    pub fn append_message(&self, message: ChatMessage) {
        trace!("append_message {}", message.id);
        self.state.send_modify(|s| s.messages.push(message));
    }

    /// Replace the roster with a full snapshot
    pub fn replace_roster(&self, entries: Vec<RosterEntry>) {
        trace!("replace_roster ({} users)", entries.len());
        self.state.send_modify(|s| s.roster = Roster::from_snapshot(entries));
    }

    /// Replace the typing set with a full snapshot
    pub fn replace_typing_set(&self, names: Vec<String>) {
        trace!("replace_typing_set ({} typing)", names.len());
        self.state.send_modify(|s| s.typing = names);
    }

    pub fn set_local_typing_flag(&self, typing: bool) {
        trace!("set_local_typing_flag {}", typing);
        self.state.send_modify(|s| s.local_typing = typing);
    }

    /// Discard all session state
    pub fn clear(&self) {
        self.state.send_replace(SessionSnapshot::default());
    }
}
