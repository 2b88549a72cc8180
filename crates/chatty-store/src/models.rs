//! Domain model structs persisted in the SQLite database, plus the
//! normalization and validation rules applied before any row is written.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the HTTP layer as a response body.

use chatty_shared::MessageEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Maximum length of a user's display name.
pub const MAX_NAME_LEN: usize = 255;
/// Maximum length of a user handle.
pub const MAX_HANDLE_LEN: usize = 50;
/// Maximum length of a chatroom name.
pub const MAX_CHATROOM_NAME_LEN: usize = 100;
/// Maximum length of a message body.
pub const MAX_MESSAGE_LEN: usize = 1024;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique handle, normalized to lowercase `[a-z0-9_]`.
    pub handle: String,
    /// When the user was created.
    pub created_date: DateTime<Utc>,
    /// When the user was last updated.
    pub last_updated_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Chatroom
// ---------------------------------------------------------------------------

/// A named chatroom. The chatroom id doubles as the live room identifier
/// used by the broadcast registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chatroom {
    /// Unique chatroom identifier.
    pub id: Uuid,
    /// Unique name, normalized to lowercase `[a-z0-9_]`.
    pub name: String,
    /// When the chatroom was created.
    pub created_date: DateTime<Utc>,
    /// When the chatroom was last updated.
    pub last_updated_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ChatroomParticipant
// ---------------------------------------------------------------------------

/// Durable membership of a user in a chatroom. Unique per (user, chatroom)
/// pair, and deliberately independent of live broadcast membership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatroomParticipant {
    /// Unique participant row identifier.
    pub id: Uuid,
    pub user_id: Uuid,
    pub chatroom_id: Uuid,
    /// When the user joined the chatroom.
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message. `is_reply` is true exactly when
/// `parent_message_id` was set at creation; deleting the parent later
/// nulls the reference and the orphaned reply is tolerated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Message body, trimmed, at most 1024 characters.
    pub message_text: String,
    /// The user who sent the message.
    pub user_id: Uuid,
    /// The chatroom the message belongs to.
    pub chatroom_id: Uuid,
    /// Whether this message was created as a reply.
    pub is_reply: bool,
    /// The replied-to message, if any.
    pub parent_message_id: Option<Uuid>,
    /// When the message was created.
    pub created_date: DateTime<Utc>,
    /// When the message text was last edited.
    pub last_updated_date: DateTime<Utc>,
}

impl From<&Message> for MessageEvent {
    fn from(message: &Message) -> Self {
        MessageEvent {
            id: message.id,
            message_text: message.message_text.clone(),
            user_id: message.user_id,
            chatroom_id: message.chatroom_id,
            is_reply: message.is_reply,
            parent_message_id: message.parent_message_id,
            created_date: message.created_date,
            last_updated_date: message.last_updated_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation / normalization
// ---------------------------------------------------------------------------

/// Validate a display name: non-blank after trimming, at most 255 chars.
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(StoreError::Invalid("Name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::Invalid(format!(
            "Name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_owned())
}

/// Normalize a user handle: trimmed, lowercased, `[a-z0-9_]`, 1..=50 chars.
pub fn normalize_handle(raw: &str) -> Result<String> {
    normalize_slug(raw, MAX_HANDLE_LEN, "Handle")
}

/// Normalize a chatroom name: trimmed, lowercased, `[a-z0-9_]`, 1..=100 chars.
pub fn normalize_chatroom_name(raw: &str) -> Result<String> {
    normalize_slug(raw, MAX_CHATROOM_NAME_LEN, "Name")
}

fn normalize_slug(raw: &str, max_len: usize, what: &str) -> Result<String> {
    let normalized = raw.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(StoreError::Invalid(format!("{what} cannot be empty")));
    }
    if normalized.len() > max_len {
        return Err(StoreError::Invalid(format!(
            "{what} cannot exceed {max_len} characters"
        )));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(StoreError::Invalid(format!(
            "{what} can only contain lowercase letters, numbers, and underscores"
        )));
    }

    Ok(normalized)
}

/// Validate and trim a message body: non-blank, at most 1024 chars.
pub fn validate_message_text(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(StoreError::Invalid(
            "Message text cannot be empty or only whitespace".into(),
        ));
    }
    if text.len() > MAX_MESSAGE_LEN {
        return Err(StoreError::Invalid(format!(
            "Message text cannot exceed {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_lowercased_and_trimmed() {
        assert_eq!(normalize_handle("  Ada_99 ").unwrap(), "ada_99");
    }

    #[test]
    fn handle_rejects_bad_characters() {
        assert!(normalize_handle("ada lovelace").is_err());
        assert!(normalize_handle("ada-lovelace").is_err());
        assert!(normalize_handle("").is_err());
        assert!(normalize_handle(&"x".repeat(51)).is_err());
    }

    #[test]
    fn chatroom_name_allows_longer_slugs() {
        assert!(normalize_chatroom_name(&"r".repeat(100)).is_ok());
        assert!(normalize_chatroom_name(&"r".repeat(101)).is_err());
    }

    #[test]
    fn message_text_is_trimmed_and_bounded() {
        assert_eq!(validate_message_text("  hello  ").unwrap(), "hello");
        assert!(validate_message_text("   ").is_err());
        assert!(validate_message_text(&"x".repeat(1025)).is_err());
    }

    #[test]
    fn message_event_conversion_keeps_fields() {
        let message = Message {
            id: Uuid::new_v4(),
            message_text: "hello".into(),
            user_id: Uuid::new_v4(),
            chatroom_id: Uuid::new_v4(),
            is_reply: false,
            parent_message_id: None,
            created_date: Utc::now(),
            last_updated_date: Utc::now(),
        };

        let event = MessageEvent::from(&message);
        assert_eq!(event.id, message.id);
        assert_eq!(event.message_text, "hello");
        assert_eq!(event.chatroom_id, message.chatroom_id);
    }
}
