//! User management endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use chatty_store::User;

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub handle: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub handle: Option<String>,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: usize,
}

/// A chatroom a user participates in, with the date they joined.
#[derive(Serialize)]
pub struct UserChatroomResponse {
    pub id: Uuid,
    pub name: String,
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
    pub joined_date: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct UserChatroomListResponse {
    pub chatrooms: Vec<UserChatroomResponse>,
    pub total: usize,
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let store = state.store.lock().await;
    let user = store.create_user(&req.name, &req.handle)?;

    info!(user = %user.id, handle = %user.handle, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ServerError> {
    let store = state.store.lock().await;
    Ok(Json(store.get_user(id)?))
}

/// `GET /users`
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ServerError> {
    let store = state.store.lock().await;
    let users = store.list_users()?;
    let total = users.len();
    Ok(Json(UserListResponse { users, total }))
}

/// `PUT /users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ServerError> {
    let store = state.store.lock().await;
    let user = store.update_user(id, req.name.as_deref(), req.handle.as_deref())?;

    info!(user = %user.id, "User updated");
    Ok(Json(user))
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let store = state.store.lock().await;
    if !store.delete_user(id)? {
        return Err(ServerError::NotFound("User not found".into()));
    }

    info!(user = %id, "User deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// `GET /users/{id}/chatrooms` -- the chatrooms a user durably
/// participates in.
pub async fn get_user_chatrooms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserChatroomListResponse>, ServerError> {
    let store = state.store.lock().await;
    let chatrooms: Vec<UserChatroomResponse> = store
        .list_chatrooms_for_user(id)?
        .into_iter()
        .map(|(chatroom, joined_date)| UserChatroomResponse {
            id: chatroom.id,
            name: chatroom.name,
            created_date: chatroom.created_date,
            last_updated_date: chatroom.last_updated_date,
            joined_date,
        })
        .collect();
    let total = chatrooms.len();

    Ok(Json(UserChatroomListResponse { chatrooms, total }))
}
