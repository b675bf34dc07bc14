//! API layer - HTTP and WebSocket entry points.

pub mod http;
pub mod websocket;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::collab::Hub;

/// Assemble the full router over a shared hub.
pub fn router(hub: Arc<Hub>) -> Router {
    Router::new()
        .merge(http::routes())
        .route("/ws", get(websocket::ws_handler))
        .with_state(hub)
}
