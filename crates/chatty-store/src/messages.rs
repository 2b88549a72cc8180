//! CRUD operations for [`Message`] records.
//!
//! `create_message` is the write the broadcast core waits on: the dispatcher
//! is only handed a message after this insert has returned successfully.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{self, Message};
use crate::rows::{date_col, uuid_col};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new message after validating the text, the reply flag
    /// invariant, and the existence of the user, chatroom, and (for
    /// replies) the parent message.
    pub fn create_message(
        &self,
        message_text: &str,
        user_id: Uuid,
        chatroom_id: Uuid,
        is_reply: bool,
        parent_message_id: Option<Uuid>,
    ) -> Result<Message> {
        let message_text = models::validate_message_text(message_text)?;

        if is_reply && parent_message_id.is_none() {
            return Err(StoreError::Invalid(
                "parent_message_id is required when is_reply is true".into(),
            ));
        }
        if !is_reply && parent_message_id.is_some() {
            return Err(StoreError::Invalid(
                "parent_message_id should only be set when is_reply is true".into(),
            ));
        }

        self.get_user(user_id)?;
        self.get_chatroom(chatroom_id)?;
        if let Some(parent_id) = parent_message_id {
            self.get_message(parent_id).map_err(|e| match e {
                StoreError::MessageNotFound => StoreError::ParentMessageNotFound,
                other => other,
            })?;
        }

        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4(),
            message_text,
            user_id,
            chatroom_id,
            is_reply,
            parent_message_id,
            created_date: now,
            last_updated_date: now,
        };

        self.conn().execute(
            "INSERT INTO messages
                 (id, message_text, user_id, chatroom_id, is_reply,
                  parent_message_id, created_date, last_updated_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                message.id.to_string(),
                message.message_text,
                message.user_id.to_string(),
                message.chatroom_id.to_string(),
                message.is_reply,
                message.parent_message_id.map(|id| id.to_string()),
                message.created_date.to_rfc3339(),
                message.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(message)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single message by UUID.
    pub fn get_message(&self, id: Uuid) -> Result<Message> {
        self.conn()
            .query_row(
                "SELECT id, message_text, user_id, chatroom_id, is_reply,
                        parent_message_id, created_date, last_updated_date
                 FROM messages
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::MessageNotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all messages in a chatroom in creation order.
    pub fn list_messages_for_chatroom(&self, chatroom_id: Uuid) -> Result<Vec<Message>> {
        self.get_chatroom(chatroom_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT id, message_text, user_id, chatroom_id, is_reply,
                    parent_message_id, created_date, last_updated_date
             FROM messages
             WHERE chatroom_id = ?1
             ORDER BY created_date ASC",
        )?;

        let rows = stmt.query_map(params![chatroom_id.to_string()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Edit a message's text. Everything else is immutable after creation.
    /// Returns the updated row.
    pub fn update_message_text(&self, id: Uuid, message_text: &str) -> Result<Message> {
        let mut message = self.get_message(id)?;

        message.message_text = models::validate_message_text(message_text)?;
        message.last_updated_date = Utc::now();

        self.conn().execute(
            "UPDATE messages SET message_text = ?2, last_updated_date = ?3
             WHERE id = ?1",
            params![
                message.id.to_string(),
                message.message_text,
                message.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(message)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a message by UUID. Replies to it are kept and their parent
    /// reference is nulled. Returns `true` if a row was deleted.
    pub fn delete_message(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM messages WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Message`].
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let parent: Option<String> = row.get(5)?;

    Ok(Message {
        id: uuid_col(0, row.get(0)?)?,
        message_text: row.get(1)?,
        user_id: uuid_col(2, row.get(2)?)?,
        chatroom_id: uuid_col(3, row.get(3)?)?,
        is_reply: row.get(4)?,
        parent_message_id: parent.map(|s| uuid_col(5, s)).transpose()?,
        created_date: date_col(6, row.get(6)?)?,
        last_updated_date: date_col(7, row.get(7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chatroom, User};

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn seed(db: &Database) -> (User, Chatroom) {
        let user = db.create_user("Ada", "ada").unwrap();
        let room = db.create_chatroom("general").unwrap();
        (user, room)
    }

    #[test]
    fn create_and_get_round_trip() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let message = db
            .create_message("  hello world  ", user.id, room.id, false, None)
            .unwrap();
        assert_eq!(message.message_text, "hello world");

        let fetched = db.get_message(message.id).unwrap();
        assert_eq!(fetched, message);
    }

    #[test]
    fn create_checks_user_and_chatroom() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        assert!(matches!(
            db.create_message("hi", Uuid::new_v4(), room.id, false, None),
            Err(StoreError::UserNotFound)
        ));
        assert!(matches!(
            db.create_message("hi", user.id, Uuid::new_v4(), false, None),
            Err(StoreError::ChatroomNotFound)
        ));
    }

    #[test]
    fn reply_flag_must_match_parent() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        assert!(matches!(
            db.create_message("hi", user.id, room.id, true, None),
            Err(StoreError::Invalid(_))
        ));

        let parent = db
            .create_message("hi", user.id, room.id, false, None)
            .unwrap();
        assert!(matches!(
            db.create_message("re: hi", user.id, room.id, false, Some(parent.id)),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            db.create_message("re: hi", user.id, room.id, true, Some(Uuid::new_v4())),
            Err(StoreError::ParentMessageNotFound)
        ));

        let reply = db
            .create_message("re: hi", user.id, room.id, true, Some(parent.id))
            .unwrap();
        assert_eq!(reply.parent_message_id, Some(parent.id));
    }

    #[test]
    fn deleting_parent_orphans_reply() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let parent = db
            .create_message("hi", user.id, room.id, false, None)
            .unwrap();
        let reply = db
            .create_message("re: hi", user.id, room.id, true, Some(parent.id))
            .unwrap();

        assert!(db.delete_message(parent.id).unwrap());

        let orphan = db.get_message(reply.id).unwrap();
        assert!(orphan.is_reply);
        assert_eq!(orphan.parent_message_id, None);
    }

    #[test]
    fn list_is_in_creation_order() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let first = db
            .create_message("first", user.id, room.id, false, None)
            .unwrap();
        let second = db
            .create_message("second", user.id, room.id, false, None)
            .unwrap();

        let listed = db.list_messages_for_chatroom(room.id).unwrap();
        assert_eq!(
            listed.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[test]
    fn edit_revalidates_and_bumps_timestamp() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let message = db
            .create_message("hello", user.id, room.id, false, None)
            .unwrap();

        assert!(matches!(
            db.update_message_text(message.id, "   "),
            Err(StoreError::Invalid(_))
        ));

        let edited = db.update_message_text(message.id, "hello again").unwrap();
        assert_eq!(edited.message_text, "hello again");
        assert!(edited.last_updated_date >= message.last_updated_date);
    }

    #[test]
    fn deleting_user_cascades_messages() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let message = db
            .create_message("hello", user.id, room.id, false, None)
            .unwrap();
        db.delete_user(user.id).unwrap();

        assert!(matches!(
            db.get_message(message.id),
            Err(StoreError::MessageNotFound)
        ));
    }
}
