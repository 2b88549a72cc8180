//! Real-time events exchanged over the WebSocket transport.
//!
//! Frames are JSON, externally tagged as `{"event": ..., "data": ...}` with
//! snake_case event names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events a client may send to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join a chatroom's live broadcast set.
    Join(RoomRequest),
    /// Leave a chatroom's live broadcast set.
    Leave(RoomRequest),
}

/// Payload of a `join` / `leave` event.
///
/// Both fields default to the empty string so that a missing key and a blank
/// value are rejected identically by the dispatcher, rather than failing
/// frame deserialization outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub chatroom_id: String,
}

impl RoomRequest {
    /// Whether both required fields are present and non-blank.
    pub fn is_valid(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.chatroom_id.trim().is_empty()
    }
}

/// Events the server sends to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Join acknowledged; sent to the issuing connection only.
    Joined { chatroom_id: String },
    /// Leave acknowledged; sent to the issuing connection only.
    Left { chatroom_id: String },
    /// A request was rejected; sent to the issuing connection only.
    Error { message: String },
    /// A persisted message, broadcast to every member of its room.
    NewMessage(MessageEvent),
}

/// Wire representation of a persisted message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEvent {
    pub id: Uuid,
    pub message_text: String,
    pub user_id: Uuid,
    pub chatroom_id: Uuid,
    pub is_reply: bool,
    pub parent_message_id: Option<Uuid>,
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_event_parses() {
        let frame = r#"{"event":"join","data":{"user_id":"u-1","chatroom_id":"r-1"}}"#;
        let event: ClientEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::Join(RoomRequest {
                user_id: "u-1".into(),
                chatroom_id: "r-1".into(),
            })
        );
    }

    #[test]
    fn missing_fields_default_to_blank() {
        let frame = r#"{"event":"leave","data":{"user_id":"u-1"}}"#;
        let ClientEvent::Leave(req) = serde_json::from_str(frame).unwrap() else {
            panic!("expected leave event");
        };
        assert_eq!(req.chatroom_id, "");
        assert!(!req.is_valid());
    }

    #[test]
    fn blank_fields_are_invalid() {
        assert!(!RoomRequest::default().is_valid());
        assert!(!RoomRequest {
            user_id: "   ".into(),
            chatroom_id: "r-1".into(),
        }
        .is_valid());
        assert!(RoomRequest {
            user_id: "u-1".into(),
            chatroom_id: "r-1".into(),
        }
        .is_valid());
    }

    #[test]
    fn server_event_tagging() {
        let event = ServerEvent::Joined {
            chatroom_id: "r-1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "joined");
        assert_eq!(json["data"]["chatroom_id"], "r-1");
    }
}
