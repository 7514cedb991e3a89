//! Presence roster
//!
//! The roster is a snapshot of who is online, replaced wholesale on every
//! `user_list` broadcast. It is never patched incrementally.

use serde::{Deserialize, Serialize};

use crate::types::ConnectionId;

/// One online user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: ConnectionId,
    pub username: String,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: ConnectionId::new(id),
            username: username.into(),
        }
    }
}

/// Online users, in server broadcast order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Build a roster from a server snapshot
    pub fn from_snapshot(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Users that can receive a private message from `own`
    ///
    /// Everyone except the local connection.
    pub fn peers<'a>(
        &'a self,
        own: Option<&'a ConnectionId>,
    ) -> impl Iterator<Item = &'a RosterEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| own.map_or(true, |own| &e.id != own))
    }

    /// Resolve a private message recipient among the peers of `own`
    pub fn pm_target<'a>(
        &'a self,
        to: &ConnectionId,
        own: Option<&'a ConnectionId>,
    ) -> Option<&'a RosterEntry> {
        self.peers(own).find(|e| &e.id == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Roster {
        Roster::from_snapshot(vec![
            RosterEntry::new("1", "Alice"),
            RosterEntry::new("2", "Bob"),
        ])
    }

    #[test]
    fn test_pm_target() {
        let roster = sample();
        let own = ConnectionId::new("1");

        assert_eq!(roster.len(), 2);
        let bob = roster.pm_target(&ConnectionId::new("2"), Some(&own)).unwrap();
        assert_eq!(bob.username, "Bob");
        // Not ourselves, and not someone offline
        assert!(roster.pm_target(&own, Some(&own)).is_none());
        assert!(roster.pm_target(&ConnectionId::new("3"), Some(&own)).is_none());
        // Before the server assigns our id every entry is a peer
        assert!(roster.pm_target(&own, None).is_some());
    }

    #[test]
    fn test_roster_preserves_order() {
        let roster = sample();
        let names: Vec<_> = roster.entries().iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[test]
    fn test_peers_excludes_self() {
        let roster = sample();
        let own = ConnectionId::new("1");

        let peers: Vec<_> = roster.peers(Some(&own)).map(|e| e.username.as_str()).collect();
        assert_eq!(peers, ["Bob"]);

        assert_eq!(roster.peers(None).count(), 2);
    }

    #[test]
    fn test_empty_roster() {
        let roster = Roster::default();
        assert!(roster.is_empty());
        assert_eq!(roster.peers(None).count(), 0);
    }
}
