//! Room manager and chat relay operations.

use chrono::Utc;

use studyhall_domain::{ConnectionId, Room};
use studyhall_protocol::{messages::SYSTEM_SENDER, ServerMessage};

use super::{Hub, HubError, HubState, RoomMembership};

impl Hub {
    /// Join a room under `user`, implicitly leaving any current room.
    ///
    /// Joining is idempotent at the member-set level; the full member list
    /// goes to every member and the join notice to everyone but the joiner.
    pub async fn join_room(
        &self,
        id: ConnectionId,
        room_id: String,
        user: String,
    ) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(&id) {
            return Err(HubError::ConnectionNotFound);
        }

        // A connection belongs to at most one room; leaving here keeps the
        // old room from retaining a ghost member. Rejoining the current
        // room is idempotent and must not emit leave churn.
        if let Some(previous) = clear_membership(&mut state, id) {
            if previous.room_id != room_id {
                remove_member_and_notify(&mut state, &previous, "left the room.");
            }
        }

        state
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone()))
            .add_member(user.clone());
        if let Some(handle) = state.connections.get_mut(&id) {
            handle.room = Some(RoomMembership {
                room_id: room_id.clone(),
                member_name: user.clone(),
            });
        }

        let members = state
            .rooms
            .get(&room_id)
            .map(Room::member_list)
            .unwrap_or_default();
        state.broadcast_room(&room_id, &ServerMessage::RoomMembers { members }, None);
        state.broadcast_room(
            &room_id,
            &system_notice(format!("{user} joined the room.")),
            Some(id),
        );

        tracing::info!(connection_id = %id, room_id = %room_id, user = %user, "User joined room");
        Ok(())
    }

    /// Leave the current room. No-op when not in a room.
    pub async fn leave_room(&self, id: ConnectionId) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(&id) {
            return Err(HubError::ConnectionNotFound);
        }
        if let Some(membership) = clear_membership(&mut state, id) {
            remove_member_and_notify(&mut state, &membership, "left the room.");
            tracing::info!(
                connection_id = %id,
                room_id = %membership.room_id,
                "User left room"
            );
        }
        Ok(())
    }

    /// Relay a chat message to the sender's current room, sender included.
    ///
    /// Not in a room means drop silently. The text is relayed verbatim:
    /// no size limit, no filtering, no persistence.
    pub async fn send_chat(&self, id: ConnectionId, text: String) -> Result<(), HubError> {
        // Write lock even though nothing is mutated: relay order within a
        // room must match hub processing order.
        let state = self.state.write().await;
        let handle = state
            .connections
            .get(&id)
            .ok_or(HubError::ConnectionNotFound)?;
        let Some(membership) = handle.room.clone() else {
            return Ok(());
        };
        let message = ServerMessage::ChatMessage {
            sender: membership.member_name,
            text,
            time: Utc::now(),
        };
        state.broadcast_room(&membership.room_id, &message, None);
        Ok(())
    }
}

/// Detach the connection's membership record without touching the room.
fn clear_membership(state: &mut HubState, id: ConnectionId) -> Option<RoomMembership> {
    state.connections.get_mut(&id).and_then(|h| h.room.take())
}

/// Remove a member from a room and notify the remaining members: updated
/// member list first, then a system notice ending in `verb`.
///
/// The departing connection must already have its membership cleared (or
/// be removed from the registry entirely) so the broadcast skips it.
pub(super) fn remove_member_and_notify(
    state: &mut HubState,
    membership: &RoomMembership,
    verb: &str,
) {
    let members = {
        let Some(room) = state.rooms.get_mut(&membership.room_id) else {
            return;
        };
        if !room.remove_member(&membership.member_name) {
            return;
        }
        room.member_list()
    };
    state.broadcast_room(
        &membership.room_id,
        &ServerMessage::RoomMembers { members },
        None,
    );
    state.broadcast_room(
        &membership.room_id,
        &system_notice(format!("{} {verb}", membership.member_name)),
        None,
    );
}

fn system_notice(text: String) -> ServerMessage {
    ServerMessage::ChatMessage {
        sender: SYSTEM_SENDER.to_string(),
        text,
        time: Utc::now(),
    }
}
