//! WebSocket handling for client connections.
//!
//! One task per connection drives the inbound loop; a second forwards
//! hub broadcasts from the connection's channel out to the socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use studyhall_domain::ConnectionId;
use studyhall_protocol::{ClientMessage, ServerMessage};

use crate::collab::Hub;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<Arc<Hub>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();

    // Bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    hub.attach(connection_id, tx.clone()).await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &hub, connection_id).await {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send response, channel full or closed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let error = ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = tx.try_send(error);
                }
            },
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Clean up: room teardown plus registry release, safe from any state.
    hub.disconnect(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client message to the hub.
///
/// Hub-level misses (unregistered caller, offline target, unknown
/// connection) are protocol no-ops: logged at debug, nothing sent back.
async fn handle_message(
    msg: ClientMessage,
    hub: &Hub,
    connection_id: ConnectionId,
) -> Option<ServerMessage> {
    let outcome = match msg {
        ClientMessage::Heartbeat => return Some(ServerMessage::Pong),

        ClientMessage::Register { display_name } => {
            hub.register(connection_id, display_name).await
        }

        ClientMessage::SendFriendRequest { to_display_name } => {
            hub.send_friend_request(connection_id, to_display_name).await
        }
        ClientMessage::AcceptFriendRequest { from_display_name } => {
            hub.accept_friend_request(connection_id, from_display_name).await
        }
        ClientMessage::RejectFriendRequest { from_display_name } => {
            hub.reject_friend_request(connection_id, from_display_name).await
        }

        ClientMessage::JoinRoom { room_id, user } => {
            hub.join_room(connection_id, room_id, user).await
        }
        ClientMessage::LeaveRoom => hub.leave_room(connection_id).await,
        ClientMessage::ChatMessage { text } => hub.send_chat(connection_id, text).await,
    };

    if let Err(e) = outcome {
        tracing::debug!(connection_id = %connection_id, error = %e, "Ignoring event");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::time::Duration;

    use tokio::net::TcpListener;
    use tokio_tungstenite::{
        connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
    };

    type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

    async fn spawn_server() -> SocketAddr {
        let hub = Arc::new(Hub::new());
        let app = crate::api::router(hub);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        addr
    }

    async fn connect(addr: SocketAddr) -> WsClient {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("connect");
        ws
    }

    async fn send(ws: &mut WsClient, msg: &ClientMessage) {
        let json = serde_json::to_string(msg).expect("serialize");
        ws.send(WsMessage::Text(json)).await.expect("send");
    }

    async fn recv(ws: &mut WsClient) -> ServerMessage {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("ws error");
            if let WsMessage::Text(text) = frame {
                return serde_json::from_str(&text).expect("valid server message");
            }
        }
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[tokio::test]
    async fn register_round_trip() {
        let addr = spawn_server().await;
        let mut ws = connect(addr).await;

        send(
            &mut ws,
            &ClientMessage::Register {
                display_name: "Alice".to_string(),
            },
        )
        .await;

        assert!(matches!(
            recv(&mut ws).await,
            ServerMessage::FriendsList { friends } if friends.is_empty()
        ));
        assert!(matches!(
            recv(&mut ws).await,
            ServerMessage::PendingRequests { pending } if pending.is_empty()
        ));
    }

    #[tokio::test]
    async fn heartbeat_and_parse_error() {
        let addr = spawn_server().await;
        let mut ws = connect(addr).await;

        send(&mut ws, &ClientMessage::Heartbeat).await;
        assert!(matches!(recv(&mut ws).await, ServerMessage::Pong));

        ws.send(WsMessage::Text("not json".to_string()))
            .await
            .expect("send");
        assert!(matches!(
            recv(&mut ws).await,
            ServerMessage::Error { code, .. } if code == "PARSE_ERROR"
        ));
    }

    #[tokio::test]
    async fn room_chat_flow() {
        let addr = spawn_server().await;
        let mut alice = connect(addr).await;
        let mut bob = connect(addr).await;

        send(
            &mut alice,
            &ClientMessage::JoinRoom {
                room_id: "study".to_string(),
                user: "Alice".to_string(),
            },
        )
        .await;
        assert!(matches!(
            recv(&mut alice).await,
            ServerMessage::RoomMembers { members } if members == ["Alice".to_string()]
        ));

        send(
            &mut bob,
            &ClientMessage::JoinRoom {
                room_id: "study".to_string(),
                user: "Bob".to_string(),
            },
        )
        .await;
        // Both see the two-member list; Alice also gets the join notice.
        match recv(&mut bob).await {
            ServerMessage::RoomMembers { members } => {
                assert_eq!(sorted(members), vec!["Alice".to_string(), "Bob".to_string()]);
            }
            other => panic!("expected RoomMembers, got {other:?}"),
        }
        match recv(&mut alice).await {
            ServerMessage::RoomMembers { members } => {
                assert_eq!(sorted(members), vec!["Alice".to_string(), "Bob".to_string()]);
            }
            other => panic!("expected RoomMembers, got {other:?}"),
        }
        assert!(matches!(
            recv(&mut alice).await,
            ServerMessage::ChatMessage { sender, text, .. }
                if sender == "System" && text == "Bob joined the room."
        ));

        send(
            &mut alice,
            &ClientMessage::ChatMessage {
                text: "hello".to_string(),
            },
        )
        .await;
        for ws in [&mut alice, &mut bob] {
            assert!(matches!(
                recv(ws).await,
                ServerMessage::ChatMessage { sender, text, .. }
                    if sender == "Alice" && text == "hello"
            ));
        }
    }

    #[tokio::test]
    async fn disconnect_notifies_room() {
        let addr = spawn_server().await;
        let mut alice = connect(addr).await;
        let mut bob = connect(addr).await;

        send(
            &mut alice,
            &ClientMessage::JoinRoom {
                room_id: "study".to_string(),
                user: "Alice".to_string(),
            },
        )
        .await;
        let _ = recv(&mut alice).await; // own member list

        send(
            &mut bob,
            &ClientMessage::JoinRoom {
                room_id: "study".to_string(),
                user: "Bob".to_string(),
            },
        )
        .await;
        let _ = recv(&mut bob).await; // own member list
        let _ = recv(&mut alice).await; // updated member list
        let _ = recv(&mut alice).await; // join notice

        bob.close(None).await.expect("close");

        assert!(matches!(
            recv(&mut alice).await,
            ServerMessage::RoomMembers { members } if members == ["Alice".to_string()]
        ));
        assert!(matches!(
            recv(&mut alice).await,
            ServerMessage::ChatMessage { sender, text, .. }
                if sender == "System" && text == "Bob disconnected."
        ));
    }
}
