//! # chatty-server
//!
//! Backend for the Chatty chat application.
//!
//! This binary provides:
//! - **REST API** (axum) for user, chatroom, participant, and message CRUD
//! - **WebSocket transport** for real-time room join/leave and message
//!   fan-out to every live member of a chatroom
//! - **SQLite persistence** via `chatty-store`; a message is only broadcast
//!   after its row is durably committed

mod api;
mod chatrooms;
mod config;
mod dispatcher;
mod error;
mod messages;
mod participants;
mod registry;
mod users;
mod ws;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatty_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::dispatcher::EventDispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chatty_server=debug")),
        )
        .init();

    info!("Starting Chatty backend v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Persistence store (runs migrations before anything else)
    let store = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::open_default()?,
    };

    // Event dispatcher: room registry + per-connection outbound queues
    let dispatcher = Arc::new(EventDispatcher::new());

    // Application state for the HTTP API and WebSocket transport
    let app_state = AppState {
        store: Arc::new(Mutex::new(store)),
        dispatcher,
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
