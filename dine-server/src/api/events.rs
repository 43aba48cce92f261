//! WebSocket event stream
//!
//! `GET /api/events/ws` upgrades to a WebSocket; every broadcast
//! [`shared::message::EventMessage`] is forwarded as a JSON text frame.
//! There is no replay: a client that lags or reconnects is expected to
//! reconcile by re-fetching current state.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events/ws", get(subscribe))
}

/// GET /api/events/ws — upgrade to WebSocket
pub async fn subscribe(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: ServerState) {
    let mut rx = state.broadcaster.subscribe();
    let (mut ws_sink, mut ws_stream) = socket.split();

    tracing::info!("Event subscriber connected");

    loop {
        tokio::select! {
            // Broadcast message to forward
            msg = rx.recv() => {
                match msg {
                    Ok(event) => {
                        let Ok(json) = event.to_json() else { continue };
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Dropped messages are not replayed; the client
                        // reconciles by re-fetching
                        tracing::warn!(skipped, "Event subscriber lagging, messages dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Incoming frames from the client
            incoming = ws_stream.next() => {
                match incoming {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {e}");
                        break;
                    }
                    _ => {} // Text, Binary, Pong — ignore
                }
            }
        }
    }

    // Send Close frame (best-effort)
    let _ = ws_sink.close().await;
    tracing::info!("Event subscriber disconnected");
}
