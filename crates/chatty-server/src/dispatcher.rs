//! Real-time event dispatcher.
//!
//! Orchestrates the live side of the backend: connection lifecycle, room
//! membership, and message fan-out. The dispatcher owns the [`RoomRegistry`]
//! and a map of per-connection outbound queues; the WebSocket transport
//! registers its queue at connect time and drains the returned receiver, so
//! the dispatcher never touches a socket directly.
//!
//! Join and leave requests are validated here but deliberately never checked
//! against the store: live broadcast membership is decoupled from durable
//! chatroom participation.

use std::collections::HashMap;

use chatty_shared::{ConnectionId, MessageEvent, RoomRequest, ServerEvent};
use chatty_store::Message;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::registry::RoomRegistry;

/// Outbound queue capacity per connection. A slow consumer that falls this
/// far behind starts losing events rather than stalling broadcasts.
const OUTBOUND_QUEUE_SIZE: usize = 256;

/// Error message sent when a join/leave payload is missing a field.
const FIELDS_REQUIRED: &str = "user_id and chatroom_id are required";

pub struct EventDispatcher {
    registry: RoomRegistry,
    senders: RwLock<HashMap<ConnectionId, mpsc::Sender<ServerEvent>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            registry: RoomRegistry::new(),
            senders: RwLock::new(HashMap::new()),
        }
    }

    /// The live membership index, exposed for introspection.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Register a connection and hand back the receiver its transport task
    /// drains. The connection is a member of no rooms until it joins one.
    pub async fn on_connect(&self, conn: ConnectionId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        self.senders.write().await.insert(conn, tx);

        info!(conn = %conn, "Client connected");
        rx
    }

    /// Unregister a connection and remove it from every room it joined.
    /// Safe to call repeatedly and for connections that never joined a
    /// room: the second call is a no-op.
    pub async fn on_disconnect(&self, conn: ConnectionId) {
        let known = self.senders.write().await.remove(&conn).is_some();
        let rooms_left = self.registry.drop_connection(conn).await;

        if known {
            info!(conn = %conn, rooms_left, "Client disconnected");
        }
    }

    /// Handle a `join` request: validate, mutate the registry, acknowledge
    /// to the issuing connection only.
    pub async fn on_join(&self, conn: ConnectionId, request: RoomRequest) {
        if !request.is_valid() {
            self.send_error(conn, FIELDS_REQUIRED).await;
            return;
        }

        self.registry.join(conn, &request.chatroom_id).await;
        info!(
            conn = %conn,
            user = %request.user_id,
            room = %request.chatroom_id,
            "Client joined chatroom"
        );

        self.send_to(
            conn,
            ServerEvent::Joined {
                chatroom_id: request.chatroom_id,
            },
        )
        .await;
    }

    /// Handle a `leave` request: validate, mutate the registry, acknowledge
    /// to the issuing connection only.
    pub async fn on_leave(&self, conn: ConnectionId, request: RoomRequest) {
        if !request.is_valid() {
            self.send_error(conn, FIELDS_REQUIRED).await;
            return;
        }

        self.registry.leave(conn, &request.chatroom_id).await;
        info!(
            conn = %conn,
            user = %request.user_id,
            room = %request.chatroom_id,
            "Client left chatroom"
        );

        self.send_to(
            conn,
            ServerEvent::Left {
                chatroom_id: request.chatroom_id,
            },
        )
        .await;
    }

    /// Broadcast a persisted message to every current member of its room.
    ///
    /// By contract the message is already durably committed; this is not a
    /// validation point. Delivery iterates a snapshot of the membership, so
    /// connections joining mid-broadcast do not receive the message and
    /// connections that already left are not retried. A failed send to one
    /// member never affects the others.
    pub async fn on_message_created(&self, message: &Message) {
        let room = message.chatroom_id.to_string();
        let members = self.registry.members(&room).await;
        if members.is_empty() {
            debug!(room = %room, "No live members to deliver to");
            return;
        }

        let event = ServerEvent::NewMessage(MessageEvent::from(message));
        let senders = self.senders.read().await;

        let mut delivered = 0usize;
        for member in &members {
            let Some(tx) = senders.get(member) else {
                debug!(room = %room, conn = %member, "Member vanished before delivery");
                continue;
            };
            if tx.try_send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                warn!(
                    room = %room,
                    conn = %member,
                    "Dropping message for slow or closed connection"
                );
            }
        }

        info!(
            room = %room,
            message = %message.id,
            delivered,
            members = members.len(),
            "Broadcast new message"
        );
    }

    /// Send an `error` event to a single connection.
    async fn send_error(&self, conn: ConnectionId, message: &str) {
        self.send_to(
            conn,
            ServerEvent::Error {
                message: message.to_owned(),
            },
        )
        .await;
    }

    /// Queue an event for a single connection. Failures are logged and
    /// swallowed: the connection is gone or hopelessly behind, and either
    /// way its read loop will tear it down.
    async fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        let senders = self.senders.read().await;
        match senders.get(&conn) {
            Some(tx) => {
                if tx.try_send(event).is_err() {
                    warn!(conn = %conn, "Failed to queue event for connection");
                }
            }
            None => debug!(conn = %conn, "Event for unknown connection discarded"),
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
