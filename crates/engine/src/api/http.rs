//! HTTP routes.

use std::sync::Arc;

use axum::{routing::get, Json, Router};

use crate::collab::Hub;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<Hub>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
}

/// Liveness probe polled by clients before opening a socket.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
