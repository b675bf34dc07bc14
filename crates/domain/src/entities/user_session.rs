//! UserSession entity - per-display-name friend graph state.

/// Friend-graph state for one registered display name.
///
/// Lives only as long as the owning connection: created on register,
/// dropped on disconnect. Both lists are insertion-ordered and
/// deduplicate on insert, so re-sending a friend request before a
/// decision cannot accumulate duplicate entries.
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    /// Confirmed friends, in acceptance order.
    friends: Vec<String>,
    /// Incoming requests awaiting a decision, in arrival order.
    pending: Vec<String>,
}

impl UserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed friend. Returns false if already present.
    pub fn add_friend(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.friends.contains(&name) {
            return false;
        }
        self.friends.push(name);
        true
    }

    /// Enqueue an incoming request. Returns false if already pending.
    pub fn add_pending(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.pending.contains(&name) {
            return false;
        }
        self.pending.push(name);
        true
    }

    /// Drop a pending request (exact-match filter, accept or reject path).
    pub fn remove_pending(&mut self, name: &str) {
        self.pending.retain(|n| n != name);
    }

    pub fn friends(&self) -> &[String] {
        &self.friends
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_deduplicates_on_insert() {
        let mut session = UserSession::new();
        assert!(session.add_pending("Eve"));
        assert!(!session.add_pending("Eve"));
        assert_eq!(session.pending(), ["Eve".to_string()]);
    }

    #[test]
    fn friends_preserve_acceptance_order() {
        let mut session = UserSession::new();
        session.add_friend("Bob");
        session.add_friend("Alice");
        session.add_friend("Bob");
        assert_eq!(
            session.friends(),
            ["Bob".to_string(), "Alice".to_string()]
        );
    }

    #[test]
    fn remove_pending_is_exact_match() {
        let mut session = UserSession::new();
        session.add_pending("Eve");
        session.add_pending("Evelyn");
        session.remove_pending("Eve");
        assert_eq!(session.pending(), ["Evelyn".to_string()]);
    }
}
