//! CRUD operations for [`Chatroom`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{self, Chatroom, User};
use crate::rows::{date_col, uuid_col};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new chatroom. The name is normalized before the uniqueness
    /// check.
    pub fn create_chatroom(&self, name: &str) -> Result<Chatroom> {
        let name = models::normalize_chatroom_name(name)?;

        if self.chatroom_name_exists(&name, None)? {
            return Err(StoreError::ChatroomNameTaken(name));
        }

        let now = Utc::now();
        let chatroom = Chatroom {
            id: Uuid::new_v4(),
            name,
            created_date: now,
            last_updated_date: now,
        };

        self.conn().execute(
            "INSERT INTO chatrooms (id, name, created_date, last_updated_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                chatroom.id.to_string(),
                chatroom.name,
                chatroom.created_date.to_rfc3339(),
                chatroom.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(chatroom)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single chatroom by UUID.
    pub fn get_chatroom(&self, id: Uuid) -> Result<Chatroom> {
        self.conn()
            .query_row(
                "SELECT id, name, created_date, last_updated_date
                 FROM chatrooms
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_chatroom,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::ChatroomNotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all chatrooms, ordered by creation date descending.
    pub fn list_chatrooms(&self) -> Result<Vec<Chatroom>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, created_date, last_updated_date
             FROM chatrooms
             ORDER BY created_date DESC",
        )?;

        let rows = stmt.query_map([], row_to_chatroom)?;

        let mut chatrooms = Vec::new();
        for row in rows {
            chatrooms.push(row?);
        }
        Ok(chatrooms)
    }

    /// List the users durably participating in a chatroom, together with the
    /// date each joined.
    pub fn list_users_for_chatroom(
        &self,
        chatroom_id: Uuid,
    ) -> Result<Vec<(User, DateTime<Utc>)>> {
        self.get_chatroom(chatroom_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT u.id, u.name, u.handle, u.created_date, u.last_updated_date,
                    p.created_date
             FROM users u
             JOIN chatroom_participants p ON p.user_id = u.id
             WHERE p.chatroom_id = ?1
             ORDER BY p.created_date ASC",
        )?;

        let rows = stmt.query_map(params![chatroom_id.to_string()], |row| {
            let user = User {
                id: uuid_col(0, row.get(0)?)?,
                name: row.get(1)?,
                handle: row.get(2)?,
                created_date: date_col(3, row.get(3)?)?,
                last_updated_date: date_col(4, row.get(4)?)?,
            };
            let joined_date = date_col(5, row.get(5)?)?;
            Ok((user, joined_date))
        })?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Rename a chatroom. Returns the updated row.
    pub fn update_chatroom(&self, id: Uuid, name: &str) -> Result<Chatroom> {
        let mut chatroom = self.get_chatroom(id)?;

        let name = models::normalize_chatroom_name(name)?;
        if self.chatroom_name_exists(&name, Some(id))? {
            return Err(StoreError::ChatroomNameTaken(name));
        }
        chatroom.name = name;
        chatroom.last_updated_date = Utc::now();

        self.conn().execute(
            "UPDATE chatrooms SET name = ?2, last_updated_date = ?3
             WHERE id = ?1",
            params![
                chatroom.id.to_string(),
                chatroom.name,
                chatroom.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(chatroom)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a chatroom by UUID. Participant and message rows cascade.
    /// Returns `true` if a row was deleted.
    pub fn delete_chatroom(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM chatrooms WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }

    fn chatroom_name_exists(&self, name: &str, exclude: Option<Uuid>) -> Result<bool> {
        let count: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM chatrooms WHERE name = ?1 AND id != ?2",
            params![
                name,
                exclude.map(|id| id.to_string()).unwrap_or_default()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Chatroom`].
fn row_to_chatroom(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chatroom> {
    Ok(Chatroom {
        id: uuid_col(0, row.get(0)?)?,
        name: row.get(1)?,
        created_date: date_col(2, row.get(2)?)?,
        last_updated_date: date_col(3, row.get(3)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn create_normalizes_name() {
        let (_dir, db) = test_db();

        let room = db.create_chatroom("  General_1 ").unwrap();
        assert_eq!(room.name, "general_1");
        assert_eq!(db.get_chatroom(room.id).unwrap(), room);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (_dir, db) = test_db();

        db.create_chatroom("general").unwrap();
        let err = db.create_chatroom("General").unwrap_err();
        assert!(matches!(err, StoreError::ChatroomNameTaken(n) if n == "general"));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let (_dir, db) = test_db();
        assert!(matches!(
            db.create_chatroom("no spaces allowed"),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn rename_round_trip() {
        let (_dir, db) = test_db();

        let room = db.create_chatroom("general").unwrap();
        let renamed = db.update_chatroom(room.id, "off_topic").unwrap();

        assert_eq!(renamed.name, "off_topic");
        assert_eq!(db.get_chatroom(room.id).unwrap().name, "off_topic");
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (_dir, db) = test_db();

        let room = db.create_chatroom("general").unwrap();
        assert!(db.delete_chatroom(room.id).unwrap());
        assert!(matches!(
            db.get_chatroom(room.id),
            Err(StoreError::ChatroomNotFound)
        ));
    }

    #[test]
    fn users_for_unknown_chatroom_is_not_found() {
        let (_dir, db) = test_db();
        assert!(matches!(
            db.list_users_for_chatroom(Uuid::new_v4()),
            Err(StoreError::ChatroomNotFound)
        ));
    }
}
