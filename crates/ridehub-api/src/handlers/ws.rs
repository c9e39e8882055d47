//! WebSocket upgrade handler for the availability push channel.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use ridehub_realtime::message::types::OutboundMessage;

use crate::state::AppState;

/// GET /ws — WebSocket upgrade.
///
/// Watching seat availability needs no identity; clients subscribe per
/// trip id after the upgrade.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.broadcaster.register();
    let conn_id = handle.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Forward queued outbound frames, interleaving keepalive pings.
    let ping_interval =
        Duration::from_secs(state.config.realtime.ping_interval_seconds.max(1));
    let outbound_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_interval);
        ping.tick().await; // first tick completes immediately
        loop {
            tokio::select! {
                msg = outbound_rx.recv() => {
                    match msg {
                        Some(msg) => {
                            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping.tick() => {
                    let ping_msg = OutboundMessage::Ping {
                        timestamp: Utc::now().timestamp(),
                    };
                    let Ok(payload) = serde_json::to_string(&ping_msg) else {
                        continue;
                    };
                    if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Process inbound frames.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.broadcaster.handle_inbound(&conn_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.broadcaster.unregister(&conn_id);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
