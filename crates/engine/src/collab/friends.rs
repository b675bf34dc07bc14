//! Friend graph operations: request, accept, reject.
//!
//! Every operation is a single best-effort attempt. The caller must be
//! registered and name-addressed targets must be online; anything else is
//! a no-op the client never hears about. Clients re-issue an action if
//! they observe no state change.

use studyhall_domain::ConnectionId;
use studyhall_protocol::ServerMessage;

use super::{Hub, HubError};

impl Hub {
    /// Enqueue a friend request with the target and push the target's
    /// updated pending list to it. The requester gets no feedback.
    pub async fn send_friend_request(
        &self,
        id: ConnectionId,
        to_display_name: String,
    ) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        let from_name = state
            .connections
            .get(&id)
            .ok_or(HubError::ConnectionNotFound)?
            .display_name
            .clone()
            .ok_or(HubError::NotRegistered)?;
        let Some(&target_id) = state.presence.get(&to_display_name) else {
            return Err(HubError::TargetOffline);
        };

        let pending = {
            let session = state
                .users
                .get_mut(&to_display_name)
                .ok_or(HubError::TargetOffline)?;
            session.add_pending(from_name.clone());
            session.pending().to_vec()
        };
        state.send_to(target_id, ServerMessage::PendingRequests { pending });

        tracing::info!(from = %from_name, to = %to_display_name, "Friend request sent");
        Ok(())
    }

    /// Accept a request: mutual friend insert under one lock hold, drop
    /// the entry from the acceptor's pending list, notify both parties.
    ///
    /// Not validated against the pending list: accepting a name that never
    /// asked still succeeds, matching the relay's trust model.
    pub async fn accept_friend_request(
        &self,
        id: ConnectionId,
        from_display_name: String,
    ) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        let to_name = state
            .connections
            .get(&id)
            .ok_or(HubError::ConnectionNotFound)?
            .display_name
            .clone()
            .ok_or(HubError::NotRegistered)?;
        let Some(&from_id) = state.presence.get(&from_display_name) else {
            return Err(HubError::TargetOffline);
        };

        let (to_friends, to_pending) = {
            let session = state
                .users
                .get_mut(&to_name)
                .ok_or(HubError::NotRegistered)?;
            session.add_friend(from_display_name.clone());
            session.remove_pending(&from_display_name);
            (session.friends().to_vec(), session.pending().to_vec())
        };
        let from_friends = {
            let session = state
                .users
                .get_mut(&from_display_name)
                .ok_or(HubError::TargetOffline)?;
            session.add_friend(to_name.clone());
            session.friends().to_vec()
        };

        state.send_to(
            id,
            ServerMessage::FriendsList {
                friends: to_friends,
            },
        );
        state.send_to(
            from_id,
            ServerMessage::FriendsList {
                friends: from_friends,
            },
        );
        state.send_to(
            id,
            ServerMessage::PendingRequests {
                pending: to_pending,
            },
        );

        tracing::info!(acceptor = %to_name, requester = %from_display_name, "Friend request accepted");
        Ok(())
    }

    /// Drop a request from the caller's pending list and push the updated
    /// list back. The requester is not notified.
    pub async fn reject_friend_request(
        &self,
        id: ConnectionId,
        from_display_name: String,
    ) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        let to_name = state
            .connections
            .get(&id)
            .ok_or(HubError::ConnectionNotFound)?
            .display_name
            .clone()
            .ok_or(HubError::NotRegistered)?;

        let pending = {
            let session = state
                .users
                .get_mut(&to_name)
                .ok_or(HubError::NotRegistered)?;
            session.remove_pending(&from_display_name);
            session.pending().to_vec()
        };
        state.send_to(id, ServerMessage::PendingRequests { pending });

        tracing::info!(rejector = %to_name, requester = %from_display_name, "Friend request rejected");
        Ok(())
    }
}
