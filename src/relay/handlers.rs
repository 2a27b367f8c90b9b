use super::state::AppState;
use super::translate::TranslationRelay;
use crate::protocol::{ClientMessage, ServerMessage};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// GET /ws
/// Upgrade to the translation channel
pub async fn channel_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    // Browsers always send Origin; non-browser clients may omit it
    if let Some(origin) = headers.get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|origin| state.is_origin_allowed(origin))
            .unwrap_or(false);

        if !allowed {
            warn!("Rejecting channel from origin {:?}", origin);
            return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
        }
    }

    let relay = Arc::clone(&state.relay);
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

/// Run one client connection until it closes.
///
/// Each request is handled on its own task so a slow completion never holds
/// up later requests on the same connection; replies go out in completion
/// order through a single writer task.
async fn handle_socket(socket: WebSocket, relay: Arc<TranslationRelay>) {
    let connection_id = Uuid::new_v4();
    info!("Client connected: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            let frame = match reply.encode() {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Failed to encode reply: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Channel error on {}: {}", connection_id, e);
                break;
            }
        };

        match frame {
            Message::Text(text) => match ClientMessage::decode(&text) {
                Ok(ClientMessage::Translate(request)) => {
                    let relay = Arc::clone(&relay);
                    let reply_tx = reply_tx.clone();

                    tokio::spawn(async move {
                        if let Some(reply) = relay.handle(request).await {
                            // Receiver is gone only if the client already left
                            let _ = reply_tx.send(reply);
                        }
                    });
                }
                Err(e) => warn!("Ignoring frame from {}: {:#}", connection_id, e),
            },
            Message::Close(_) => break,
            other => debug!("Ignoring non-text frame from {}: {:?}", connection_id, other),
        }
    }

    // The writer outlives this loop until in-flight requests drop their senders
    drop(reply_tx);
    drop(writer);

    info!("Client disconnected: {}", connection_id);
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
