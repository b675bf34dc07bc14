//! WebSocket message types for Engine-client communication.
//!
//! These types are used by both sides of the socket: the Engine receives
//! `ClientMessage` and sends `ServerMessage`; clients do the opposite.
//! Frames are JSON text, internally tagged with a `type` field.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing variants requires major version bump
//! - Renaming variants is a breaking change

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender name used for join/leave/disconnect notices.
pub const SYSTEM_SENDER: &str = "System";

// =============================================================================
// Client Messages (client → Engine)
// =============================================================================

/// Messages from a client to the Engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Bind a display name to this connection.
    ///
    /// The Engine replies with the name's current `FriendsList` and
    /// `PendingRequests` (both empty for a fresh name).
    Register { display_name: String },
    /// Send a friend request to another display name.
    SendFriendRequest { to_display_name: String },
    /// Accept an incoming friend request.
    AcceptFriendRequest { from_display_name: String },
    /// Reject an incoming friend request.
    RejectFriendRequest { from_display_name: String },
    /// Join a chat room (implicitly leaving any current room).
    JoinRoom { room_id: String, user: String },
    /// Leave the current room.
    LeaveRoom,
    /// Relay a chat message to the current room.
    ChatMessage { text: String },
    /// Heartbeat ping.
    Heartbeat,
}

// =============================================================================
// Server Messages (Engine → client)
// =============================================================================

/// Messages from the Engine to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full replacement of the client's friend list view.
    FriendsList { friends: Vec<String> },
    /// Full replacement of the client's pending-request view.
    PendingRequests { pending: Vec<String> },
    /// Full replacement of the client's room member view.
    /// Ordering is not stable; treat as a set.
    RoomMembers { members: Vec<String> },
    /// A relayed chat message, or a system notice when `sender` is
    /// [`SYSTEM_SENDER`].
    ChatMessage {
        sender: String,
        text: String,
        time: DateTime<Utc>,
    },
    /// Heartbeat reply.
    Pong,
    /// Protocol-level error (e.g. an unparseable frame).
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_uses_type_tag() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"JoinRoom","room_id":"study","user":"Alice"}"#,
        )
        .expect("valid frame");
        assert!(matches!(
            msg,
            ClientMessage::JoinRoom { ref room_id, ref user }
                if room_id == "study" && user == "Alice"
        ));
    }

    #[test]
    fn chat_message_serializes_timestamp() {
        let msg = ServerMessage::ChatMessage {
            sender: "Alice".to_string(),
            text: "hello".to_string(),
            time: Utc::now(),
        };
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains(r#""type":"ChatMessage""#));
        assert!(json.contains(r#""sender":"Alice""#));
        assert!(json.contains(r#""time":""#));
    }
}
