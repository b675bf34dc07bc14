//! The collaboration hub.
//!
//! All shared collaboration state lives here behind a single coordinating
//! lock: the connection registry, the presence directory, the room map,
//! and the per-name friend graph. WebSocket handlers on arbitrary
//! connection tasks mutate state only through the async methods on
//! [`Hub`], so the write-lock acquisition is the serialization point for
//! every room and friend-graph operation.
//!
//! Outbound delivery is fire-and-forget: messages go through bounded
//! per-connection channels with `try_send`, so a slow or closed receiver
//! never blocks the sender.

mod errors;
mod friends;
mod rooms;

pub use errors::HubError;

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use studyhall_domain::{ConnectionId, Room, UserSession};
use studyhall_protocol::ServerMessage;

/// Per-connection session state plus the outbound channel.
#[derive(Debug)]
struct ConnectionHandle {
    /// Display name bound by `Register` (friend-system identity).
    display_name: Option<String>,
    /// Current room membership, if any.
    room: Option<RoomMembership>,
    /// Channel to the connection's socket-forwarding task.
    sender: mpsc::Sender<ServerMessage>,
}

/// The name a connection joined its current room under.
///
/// Kept separately from `display_name`: registration and room join are
/// independent protocol steps, and `JoinRoom` carries its own user name.
#[derive(Debug, Clone)]
struct RoomMembership {
    room_id: String,
    member_name: String,
}

#[derive(Default)]
struct HubState {
    /// Connection registry: all live transport sessions.
    connections: HashMap<ConnectionId, ConnectionHandle>,
    /// Presence directory: display name -> owning connection.
    presence: HashMap<String, ConnectionId>,
    /// Room state. Rooms are created lazily and never pruned when empty.
    rooms: HashMap<String, Room>,
    /// Friend graph: display name -> session state.
    users: HashMap<String, UserSession>,
}

impl HubState {
    /// Fire-and-forget delivery to one connection.
    fn send_to(&self, id: ConnectionId, message: ServerMessage) {
        if let Some(handle) = self.connections.get(&id) {
            if let Err(e) = handle.sender.try_send(message) {
                tracing::warn!(connection_id = %id, error = %e, "Failed to deliver message");
            }
        }
    }

    /// Broadcast to every connection currently joined to a room.
    fn broadcast_room(
        &self,
        room_id: &str,
        message: &ServerMessage,
        exclude: Option<ConnectionId>,
    ) {
        for (id, handle) in &self.connections {
            let in_room = handle.room.as_ref().is_some_and(|m| m.room_id == room_id);
            if !in_room || Some(*id) == exclude {
                continue;
            }
            if let Err(e) = handle.sender.try_send(message.clone()) {
                tracing::warn!(connection_id = %id, error = %e, "Failed to broadcast message");
            }
        }
    }
}

/// The collaboration hub: connection registry, presence directory, room
/// manager, chat relay, and friend graph in one owned service object.
pub struct Hub {
    state: RwLock<HubState>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HubState::default()),
        }
    }

    /// Insert a fresh anonymous connection (socket accept).
    pub async fn attach(&self, id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        let mut state = self.state.write().await;
        state.connections.insert(
            id,
            ConnectionHandle {
                display_name: None,
                room: None,
                sender,
            },
        );
        tracing::debug!(connection_id = %id, "Connection attached");
    }

    /// Bind a display name to a connection and emit the name's current
    /// friend and pending lists back to it.
    ///
    /// Last write wins: registering a name already owned by another live
    /// connection silently evicts the stale owner from the presence
    /// directory and replaces (never merges) its session state.
    pub async fn register(&self, id: ConnectionId, display_name: String) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        {
            let handle = state
                .connections
                .get_mut(&id)
                .ok_or(HubError::ConnectionNotFound)?;
            handle.display_name = Some(display_name.clone());
        }

        // Re-registering under a different name does not release the old
        // one; its presence and session entries stay until another
        // connection claims that name.
        let previous = state.presence.insert(display_name.clone(), id);
        if previous != Some(id) {
            state.users.insert(display_name.clone(), UserSession::new());
        }

        let (friends, pending) = {
            let session = state.users.entry(display_name.clone()).or_default();
            (session.friends().to_vec(), session.pending().to_vec())
        };
        state.send_to(id, ServerMessage::FriendsList { friends });
        state.send_to(id, ServerMessage::PendingRequests { pending });

        tracing::info!(connection_id = %id, display_name = %display_name, "User registered");
        Ok(())
    }

    /// Tear down a connection: room removal first, then registry release.
    /// Safe to call regardless of the connection's state; always invoked
    /// when the socket task ends.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut state = self.state.write().await;
        let Some(handle) = state.connections.remove(&id) else {
            return;
        };

        if let Some(membership) = handle.room {
            rooms::remove_member_and_notify(&mut state, &membership, "disconnected.");
        }

        if let Some(name) = handle.display_name {
            // Only release the name if it still points at this connection;
            // a re-registered name belongs to its new owner.
            if state.presence.get(&name) == Some(&id) {
                state.presence.remove(&name);
                state.users.remove(&name);
            }
        }

        tracing::info!(connection_id = %id, "Connection terminated");
    }

    /// The connection currently owning a display name, if any.
    pub async fn connection_for(&self, display_name: &str) -> Option<ConnectionId> {
        self.state.read().await.presence.get(display_name).copied()
    }

    /// Snapshot of a room's member set. None if the room was never created.
    pub async fn room_members(&self, room_id: &str) -> Option<Vec<String>> {
        self.state
            .read()
            .await
            .rooms
            .get(room_id)
            .map(Room::member_list)
    }

    /// Confirmed friends of a registered name.
    pub async fn friends_of(&self, display_name: &str) -> Option<Vec<String>> {
        self.state
            .read()
            .await
            .users
            .get(display_name)
            .map(|s| s.friends().to_vec())
    }

    /// Pending requests of a registered name.
    pub async fn pending_of(&self, display_name: &str) -> Option<Vec<String>> {
        self.state
            .read()
            .await
            .users
            .get(display_name)
            .map(|s| s.pending().to_vec())
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
