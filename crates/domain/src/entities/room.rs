//! Room entity - an ephemeral chat room keyed by a client-chosen id.

use std::collections::HashSet;

/// An ephemeral chat room.
///
/// Rooms are created lazily on first join and persist (empty) after the
/// last member leaves. Membership is a set of display names; the snapshot
/// sent to clients carries no ordering guarantee.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    members: HashSet<String>,
}

impl Room {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: HashSet::new(),
        }
    }

    /// Add a display name to the member set. Idempotent; returns false if
    /// the name was already a member.
    pub fn add_member(&mut self, name: impl Into<String>) -> bool {
        self.members.insert(name.into())
    }

    /// Remove a display name from the member set. Returns false if the
    /// name was not a member.
    pub fn remove_member(&mut self, name: &str) -> bool {
        self.members.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Snapshot of the member set for a RoomMembers broadcast.
    /// Iteration order of the underlying set; not stable.
    pub fn member_list(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_idempotent() {
        let mut room = Room::new("study");
        assert!(room.add_member("Alice"));
        assert!(!room.add_member("Alice"));
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn leave_removes_exactly_once() {
        let mut room = Room::new("study");
        room.add_member("Alice");
        room.add_member("Bob");
        assert!(room.remove_member("Alice"));
        assert!(!room.remove_member("Alice"));
        assert!(!room.contains("Alice"));
        assert_eq!(room.member_list(), vec!["Bob".to_string()]);
    }

    #[test]
    fn room_persists_when_empty() {
        let mut room = Room::new("study");
        room.add_member("Alice");
        room.remove_member("Alice");
        assert!(room.is_empty());
        assert_eq!(room.id, "study");
    }
}
