//! CRUD operations for [`ChatroomParticipant`] records -- the durable
//! membership of users in chatrooms, independent of live broadcast
//! membership.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::ChatroomParticipant;
use crate::rows::{date_col, uuid_col};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Add a user to a chatroom. Both sides must exist, and the pair must
    /// not already be a participant.
    pub fn add_participant(&self, user_id: Uuid, chatroom_id: Uuid) -> Result<ChatroomParticipant> {
        self.get_user(user_id)?;
        self.get_chatroom(chatroom_id)?;

        if self.participant_pair_exists(user_id, chatroom_id)? {
            return Err(StoreError::AlreadyParticipant);
        }

        let now = Utc::now();
        let participant = ChatroomParticipant {
            id: Uuid::new_v4(),
            user_id,
            chatroom_id,
            created_date: now,
            last_updated_date: now,
        };

        self.conn().execute(
            "INSERT INTO chatroom_participants
                 (id, user_id, chatroom_id, created_date, last_updated_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                participant.id.to_string(),
                participant.user_id.to_string(),
                participant.chatroom_id.to_string(),
                participant.created_date.to_rfc3339(),
                participant.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(participant)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single participant row by UUID.
    pub fn get_participant(&self, id: Uuid) -> Result<ChatroomParticipant> {
        self.conn()
            .query_row(
                "SELECT id, user_id, chatroom_id, created_date, last_updated_date
                 FROM chatroom_participants
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_participant,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::ParticipantNotFound,
                other => StoreError::Sqlite(other),
            })
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Remove a participant row by its UUID. Returns `true` if a row was
    /// deleted.
    pub fn remove_participant(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM chatroom_participants WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Remove a participant by its (user, chatroom) pair. Returns `true`
    /// if a row was deleted.
    pub fn remove_participant_by_pair(&self, user_id: Uuid, chatroom_id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM chatroom_participants
             WHERE user_id = ?1 AND chatroom_id = ?2",
            params![user_id.to_string(), chatroom_id.to_string()],
        )?;
        Ok(affected > 0)
    }

    fn participant_pair_exists(&self, user_id: Uuid, chatroom_id: Uuid) -> Result<bool> {
        let count: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM chatroom_participants
             WHERE user_id = ?1 AND chatroom_id = ?2",
            params![user_id.to_string(), chatroom_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`ChatroomParticipant`].
fn row_to_participant(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatroomParticipant> {
    Ok(ChatroomParticipant {
        id: uuid_col(0, row.get(0)?)?,
        user_id: uuid_col(1, row.get(1)?)?,
        chatroom_id: uuid_col(2, row.get(2)?)?,
        created_date: date_col(3, row.get(3)?)?,
        last_updated_date: date_col(4, row.get(4)?)?,
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
    fn add_and_list_round_trip() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let participant = db.add_participant(user.id, room.id).unwrap();
        assert_eq!(db.get_participant(participant.id).unwrap(), participant);

        let rooms = db.list_chatrooms_for_user(user.id).unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].0.id, room.id);
        assert_eq!(rooms[0].1, participant.created_date);

        let users = db.list_users_for_chatroom(room.id).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].0.id, user.id);
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        db.add_participant(user.id, room.id).unwrap();
        assert!(matches!(
            db.add_participant(user.id, room.id),
            Err(StoreError::AlreadyParticipant)
        ));
    }

    #[test]
    fn missing_user_or_chatroom_is_not_found() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        assert!(matches!(
            db.add_participant(Uuid::new_v4(), room.id),
            Err(StoreError::UserNotFound)
        ));
        assert!(matches!(
            db.add_participant(user.id, Uuid::new_v4()),
            Err(StoreError::ChatroomNotFound)
        ));
    }

    #[test]
    fn remove_by_pair() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        db.add_participant(user.id, room.id).unwrap();
        assert!(db.remove_participant_by_pair(user.id, room.id).unwrap());
        assert!(!db.remove_participant_by_pair(user.id, room.id).unwrap());
        assert!(db.list_users_for_chatroom(room.id).unwrap().is_empty());
    }

    #[test]
    fn deleting_user_cascades_membership() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let participant = db.add_participant(user.id, room.id).unwrap();
        db.delete_user(user.id).unwrap();

        assert!(matches!(
            db.get_participant(participant.id),
            Err(StoreError::ParticipantNotFound)
        ));
        assert!(db.list_users_for_chatroom(room.id).unwrap().is_empty());
    }

    #[test]
    fn deleting_chatroom_cascades_membership() {
        let (_dir, db) = test_db();
        let (user, room) = seed(&db);

        let participant = db.add_participant(user.id, room.id).unwrap();
        db.delete_chatroom(room.id).unwrap();

        assert!(matches!(
            db.get_participant(participant.id),
            Err(StoreError::ParticipantNotFound)
        ));
        assert!(db.list_chatrooms_for_user(user.id).unwrap().is_empty());
    }
}
