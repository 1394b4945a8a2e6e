use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

/// `GET /api/v1/execute`: upgrades to a WebSocket and hands the connection
/// to the session bridge. The initial session id only labels logs until the
/// first accepted submission rotates it.
pub async fn handle_websocket(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let session_id = Uuid::new_v4().to_string();
    info!(%session_id, "WebSocket client connected");

    ws.on_upgrade(move |socket| async move {
        state.bridge.handle(socket, session_id).await;
    })
}
