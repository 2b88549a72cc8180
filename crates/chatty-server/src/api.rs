//! HTTP API assembly.
//!
//! Builds the axum router over the shared application state: the store
//! handle, the event dispatcher, and the configuration. Entity handlers
//! live in their own modules; this one owns the router, the CORS/trace
//! layers, and the small root/health endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use chatty_store::Database;

use crate::config::ServerConfig;
use crate::dispatcher::EventDispatcher;
use crate::{chatrooms, messages, participants, users, ws};

#[derive(Clone)]
pub struct AppState {
    /// The persistence store. The mutex both adapts the synchronous
    /// connection to async handlers and serializes message writes, which
    /// is what keeps per-room delivery in commit order.
    pub store: Arc<Mutex<Database>>,
    pub dispatcher: Arc<EventDispatcher>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ws", get(ws::ws_handler))
        // Users
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/chatrooms", get(users::get_user_chatrooms))
        // Chatrooms
        .route(
            "/chatrooms",
            post(chatrooms::create_chatroom).get(chatrooms::list_chatrooms),
        )
        .route(
            "/chatrooms/{id}",
            get(chatrooms::get_chatroom)
                .put(chatrooms::update_chatroom)
                .delete(chatrooms::delete_chatroom),
        )
        .route(
            "/chatrooms/{id}/users",
            get(chatrooms::get_chatroom_users),
        )
        // Durable membership
        .route(
            "/chatroom-participants",
            post(participants::create_participant),
        )
        .route(
            "/chatroom-participants/{id}",
            delete(participants::delete_participant),
        )
        .route(
            "/chatroom-participants/user/{user_id}/chatroom/{chatroom_id}",
            delete(participants::remove_user_from_chatroom),
        )
        // Messages
        .route("/messages", post(messages::create_message))
        .route(
            "/messages/{id}",
            get(messages::get_message).delete(messages::delete_message),
        )
        .route(
            "/messages/chatroom/{chatroom_id}",
            get(messages::list_messages_by_chatroom),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until it fails or the process is shut down.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "HTTP API listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.allow_any_origin() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct WelcomeResponse {
    message: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}!", state.config.instance_name),
    })
}
