//! Chatroom management endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use chatty_store::Chatroom;

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Deserialize)]
pub struct CreateChatroomRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateChatroomRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct ChatroomListResponse {
    pub chatrooms: Vec<Chatroom>,
    pub total: usize,
}

/// A user participating in a chatroom, with the date they joined.
#[derive(Serialize)]
pub struct ChatroomUserResponse {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub joined_date: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ChatroomUserListResponse {
    pub users: Vec<ChatroomUserResponse>,
    pub total: usize,
}

/// `POST /chatrooms`
pub async fn create_chatroom(
    State(state): State<AppState>,
    Json(req): Json<CreateChatroomRequest>,
) -> Result<(StatusCode, Json<Chatroom>), ServerError> {
    let store = state.store.lock().await;
    let chatroom = store.create_chatroom(&req.name)?;

    info!(chatroom = %chatroom.id, name = %chatroom.name, "Chatroom created");
    Ok((StatusCode::CREATED, Json(chatroom)))
}

/// `GET /chatrooms/{id}`
pub async fn get_chatroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Chatroom>, ServerError> {
    let store = state.store.lock().await;
    Ok(Json(store.get_chatroom(id)?))
}

/// `GET /chatrooms`
pub async fn list_chatrooms(
    State(state): State<AppState>,
) -> Result<Json<ChatroomListResponse>, ServerError> {
    let store = state.store.lock().await;
    let chatrooms = store.list_chatrooms()?;
    let total = chatrooms.len();
    Ok(Json(ChatroomListResponse { chatrooms, total }))
}

/// `PUT /chatrooms/{id}`
pub async fn update_chatroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateChatroomRequest>,
) -> Result<Json<Chatroom>, ServerError> {
    let store = state.store.lock().await;
    let chatroom = store.update_chatroom(id, &req.name)?;

    info!(chatroom = %chatroom.id, name = %chatroom.name, "Chatroom renamed");
    Ok(Json(chatroom))
}

/// `DELETE /chatrooms/{id}`
pub async fn delete_chatroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let store = state.store.lock().await;
    if !store.delete_chatroom(id)? {
        return Err(ServerError::NotFound("Chatroom not found".into()));
    }

    info!(chatroom = %id, "Chatroom deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// `GET /chatrooms/{id}/users` -- the durable participants of a chatroom.
pub async fn get_chatroom_users(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatroomUserListResponse>, ServerError> {
    let store = state.store.lock().await;
    let users: Vec<ChatroomUserResponse> = store
        .list_users_for_chatroom(id)?
        .into_iter()
        .map(|(user, joined_date)| ChatroomUserResponse {
            id: user.id,
            name: user.name,
            handle: user.handle,
            joined_date,
        })
        .collect();
    let total = users.len();

    Ok(Json(ChatroomUserListResponse { users, total }))
}
