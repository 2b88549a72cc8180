//! Message endpoints.
//!
//! `create_message` is the ingress side of the broadcast core: the durable
//! write happens first, and only a committed row is handed to the
//! dispatcher for fan-out. Both steps run under the store mutex so that
//! concurrent posts to the same chatroom are delivered in commit order;
//! the dispatch itself only queues into per-connection channels and never
//! performs I/O while the lock is held.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use chatty_store::Message;

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Deserialize)]
pub struct CreateMessageRequest {
    pub message_text: String,
    pub user_id: Uuid,
    pub chatroom_id: Uuid,
    #[serde(default)]
    pub is_reply: bool,
    #[serde(default)]
    pub parent_message_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub total: usize,
}

/// `POST /messages`
pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let store = state.store.lock().await;
    let message = store.create_message(
        &req.message_text,
        req.user_id,
        req.chatroom_id,
        req.is_reply,
        req.parent_message_id,
    )?;

    // The write is committed; broadcast to the room's live members.
    state.dispatcher.on_message_created(&message).await;

    info!(
        message = %message.id,
        chatroom = %message.chatroom_id,
        "Message created"
    );
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /messages/{id}`
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    let store = state.store.lock().await;
    Ok(Json(store.get_message(id)?))
}

/// `GET /messages/chatroom/{chatroom_id}`
pub async fn list_messages_by_chatroom(
    State(state): State<AppState>,
    Path(chatroom_id): Path<Uuid>,
) -> Result<Json<MessageListResponse>, ServerError> {
    let store = state.store.lock().await;
    let messages = store.list_messages_for_chatroom(chatroom_id)?;
    let total = messages.len();
    Ok(Json(MessageListResponse { messages, total }))
}

/// `DELETE /messages/{id}`
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let store = state.store.lock().await;
    if !store.delete_message(id)? {
        return Err(ServerError::NotFound("Message not found".into()));
    }

    info!(message = %id, "Message deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
