//! # chatty-store
//!
//! Durable storage for the Chatty backend, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model: users, chatrooms, chatroom participants, and messages. Schema
//! migrations run before any other operation, and foreign keys are enforced
//! so user/chatroom deletion cascades to dependent rows.

pub mod chatrooms;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod participants;
pub mod users;

mod error;
mod rows;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
