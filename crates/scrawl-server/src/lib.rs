//! Scrawl Room Server
//!
//! WebSocket server for the Scrawl collaborative whiteboard: room-scoped
//! fan-out of live stroke events plus an authoritative, totally ordered
//! operation history with room-global undo/redo.

pub mod protocol;
pub mod registry;
pub mod session;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, ws::WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use registry::RoomRegistry;

/// Build the axum application over a shared room registry.
pub fn app(registry: Arc<RoomRegistry>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Index page
async fn index() -> &'static str {
    "Scrawl room server - connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Room and history counters, for operational visibility
async fn stats(State(registry): State<Arc<RoomRegistry>>) -> impl IntoResponse {
    Json(registry.statistics())
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<RoomRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::handle_socket(socket, registry))
}
