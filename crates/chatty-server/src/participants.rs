//! Durable chatroom membership endpoints.
//!
//! These manage `ChatroomParticipant` rows only. Live broadcast
//! membership is a separate concern handled over the WebSocket
//! transport, and the two are intentionally not kept in sync.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use chatty_store::ChatroomParticipant;

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Deserialize)]
pub struct CreateParticipantRequest {
    pub user_id: Uuid,
    pub chatroom_id: Uuid,
}

/// `POST /chatroom-participants`
pub async fn create_participant(
    State(state): State<AppState>,
    Json(req): Json<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<ChatroomParticipant>), ServerError> {
    let store = state.store.lock().await;
    let participant = store.add_participant(req.user_id, req.chatroom_id)?;

    info!(
        participant = %participant.id,
        user = %participant.user_id,
        chatroom = %participant.chatroom_id,
        "Participant added"
    );
    Ok((StatusCode::CREATED, Json(participant)))
}

/// `DELETE /chatroom-participants/{id}`
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let store = state.store.lock().await;
    if !store.remove_participant(id)? {
        return Err(ServerError::NotFound("Participant not found".into()));
    }

    info!(participant = %id, "Participant removed");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// `DELETE /chatroom-participants/user/{user_id}/chatroom/{chatroom_id}`
pub async fn remove_user_from_chatroom(
    State(state): State<AppState>,
    Path((user_id, chatroom_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let store = state.store.lock().await;
    if !store.remove_participant_by_pair(user_id, chatroom_id)? {
        return Err(ServerError::NotFound("Participant not found".into()));
    }

    info!(user = %user_id, chatroom = %chatroom_id, "Participant removed");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
