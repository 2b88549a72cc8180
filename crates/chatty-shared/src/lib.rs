//! # chatty-shared
//!
//! Wire protocol types shared between the Chatty server and Rust clients:
//! the real-time event enums exchanged over the WebSocket transport and the
//! identifier newtypes they carry.

pub mod protocol;
pub mod types;

pub use protocol::{ClientEvent, MessageEvent, RoomRequest, ServerEvent};
pub use types::ConnectionId;
