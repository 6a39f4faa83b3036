use crate::api::state::AppState;
use crate::echo::EchoChannel;
use crate::session::SessionRegistry;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use std::sync::Arc;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let registry = state.registry().clone();
    ws.on_upgrade(move |socket| handle_websocket(socket, registry))
}

/// Serve one echo session until the client goes away.
///
/// Replies are sent from this task as soon as each frame is parsed; nothing
/// here waits on the transfer engines.
async fn handle_websocket(mut socket: WebSocket, registry: SessionRegistry) {
    let channel = EchoChannel::open(&registry);
    tracing::info!(session_id = %channel.session_id(), "Client connected");

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => match channel.handle_text(&text) {
                Ok(Some(reply)) => {
                    let json = match serde_json::to_string(&reply) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::warn!("Failed to encode echo reply: {}", e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(session_id = %channel.session_id(), "Ignoring frame: {}", e);
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %channel.session_id(), "Channel error: {}", e);
                break;
            }
        }
    }

    let session_id = channel.session_id().to_string();
    let last = channel.close();
    tracing::info!(
        session_id = %session_id,
        testing = last.as_ref().is_some_and(|s| s.is_testing()),
        has_results = last.as_ref().is_some_and(|s| s.last_results.is_some()),
        "Client disconnected"
    );
}
