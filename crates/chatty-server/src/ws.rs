//! WebSocket transport.
//!
//! One task pair per connection: the writer drains the dispatcher's
//! outbound queue into the socket, the read loop feeds parsed client
//! events back into the dispatcher. The dispatcher sees only
//! [`ConnectionId`]s and queues; everything socket-shaped lives here.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chatty_shared::{ClientEvent, ConnectionId};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::api::AppState;

/// `GET /ws` -- upgrade to the real-time event protocol.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn = ConnectionId::new();
    let dispatcher = state.dispatcher.clone();

    let mut rx = dispatcher.on_connect(conn).await;
    let (mut sender, mut receiver) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(conn = %conn, error = %e, "Failed to serialize event");
                    continue;
                }
            };
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::Join(request)) => dispatcher.on_join(conn, request).await,
                Ok(ClientEvent::Leave(request)) => dispatcher.on_leave(conn, request).await,
                Err(e) => {
                    // Unknown or malformed events are never dispatched.
                    debug!(conn = %conn, error = %e, "Ignoring unparseable frame");
                }
            },
            Message::Close(_) => break,
            // Ping/pong are handled by axum; binary frames are not part of
            // the protocol.
            _ => {}
        }
    }

    dispatcher.on_disconnect(conn).await;
    writer.abort();
}
