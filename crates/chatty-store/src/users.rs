//! CRUD operations for [`User`] records.

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

    /// Insert a new user. The handle is normalized before the uniqueness
    /// check, so `Ada` and `ada` collide.
    pub fn create_user(&self, name: &str, handle: &str) -> Result<User> {
        let name = models::validate_name(name)?;
        let handle = models::normalize_handle(handle)?;

        if self.handle_exists(&handle, None)? {
            return Err(StoreError::HandleTaken(handle));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            handle,
            created_date: now,
            last_updated_date: now,
        };

        self.conn().execute(
            "INSERT INTO users (id, name, handle, created_date, last_updated_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.name,
                user.handle,
                user.created_date.to_rfc3339(),
                user.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(user)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single user by UUID.
    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name, handle, created_date, last_updated_date
                 FROM users
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::UserNotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all users, ordered by creation date descending.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, handle, created_date, last_updated_date
             FROM users
             ORDER BY created_date DESC",
        )?;

        let rows = stmt.query_map([], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// List the chatrooms a user durably participates in, together with the
    /// date the user joined each one.
    pub fn list_chatrooms_for_user(&self, user_id: Uuid) -> Result<Vec<(Chatroom, DateTime<Utc>)>> {
        // Surface a typed not-found instead of an empty list for unknown ids.
        self.get_user(user_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT c.id, c.name, c.created_date, c.last_updated_date, p.created_date
             FROM chatrooms c
             JOIN chatroom_participants p ON p.chatroom_id = c.id
             WHERE p.user_id = ?1
             ORDER BY p.created_date ASC",
        )?;

        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            let chatroom = Chatroom {
                id: uuid_col(0, row.get(0)?)?,
                name: row.get(1)?,
                created_date: date_col(2, row.get(2)?)?,
                last_updated_date: date_col(3, row.get(3)?)?,
            };
            let joined_date = date_col(4, row.get(4)?)?;
            Ok((chatroom, joined_date))
        })?;

        let mut chatrooms = Vec::new();
        for row in rows {
            chatrooms.push(row?);
        }
        Ok(chatrooms)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update a user's display name and/or handle. Fields left as `None`
    /// are unchanged. Returns the updated row.
    pub fn update_user(
        &self,
        id: Uuid,
        name: Option<&str>,
        handle: Option<&str>,
    ) -> Result<User> {
        let mut user = self.get_user(id)?;

        if let Some(name) = name {
            user.name = models::validate_name(name)?;
        }
        if let Some(handle) = handle {
            let handle = models::normalize_handle(handle)?;
            if self.handle_exists(&handle, Some(id))? {
                return Err(StoreError::HandleTaken(handle));
            }
            user.handle = handle;
        }
        user.last_updated_date = Utc::now();

        self.conn().execute(
            "UPDATE users SET name = ?2, handle = ?3, last_updated_date = ?4
             WHERE id = ?1",
            params![
                user.id.to_string(),
                user.name,
                user.handle,
                user.last_updated_date.to_rfc3339(),
            ],
        )?;

        Ok(user)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a user by UUID. Participant and message rows cascade.
    /// Returns `true` if a row was deleted.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    fn handle_exists(&self, handle: &str, exclude: Option<Uuid>) -> Result<bool> {
        let count: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE handle = ?1 AND id != ?2",
            params![
                handle,
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

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_col(0, row.get(0)?)?,
        name: row.get(1)?,
        handle: row.get(2)?,
        created_date: date_col(3, row.get(3)?)?,
        last_updated_date: date_col(4, row.get(4)?)?,
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
    fn create_and_get_round_trip() {
        let (_dir, db) = test_db();

        let created = db.create_user("Ada Lovelace", "Ada_1815").unwrap();
        assert_eq!(created.handle, "ada_1815");

        let fetched = db.get_user(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn duplicate_handle_is_rejected() {
        let (_dir, db) = test_db();

        db.create_user("Ada", "ada").unwrap();
        let err = db.create_user("Other Ada", "ADA").unwrap_err();
        assert!(matches!(err, StoreError::HandleTaken(h) if h == "ada"));
    }

    #[test]
    fn update_renames_and_bumps_timestamp() {
        let (_dir, db) = test_db();

        let user = db.create_user("Ada", "ada").unwrap();
        let updated = db.update_user(user.id, Some("Countess"), None).unwrap();

        assert_eq!(updated.name, "Countess");
        assert_eq!(updated.handle, "ada");
        assert!(updated.last_updated_date >= user.last_updated_date);
        assert_eq!(db.get_user(user.id).unwrap().name, "Countess");
    }

    #[test]
    fn update_rejects_taken_handle() {
        let (_dir, db) = test_db();

        db.create_user("Ada", "ada").unwrap();
        let grace = db.create_user("Grace", "grace").unwrap();

        let err = db.update_user(grace.id, None, Some("ada")).unwrap_err();
        assert!(matches!(err, StoreError::HandleTaken(_)));

        // Keeping your own handle is not a conflict.
        db.update_user(grace.id, None, Some("grace")).unwrap();
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (_dir, db) = test_db();

        let user = db.create_user("Ada", "ada").unwrap();
        assert!(db.delete_user(user.id).unwrap());
        assert!(!db.delete_user(user.id).unwrap());
        assert!(matches!(
            db.get_user(user.id),
            Err(StoreError::UserNotFound)
        ));
    }

    #[test]
    fn chatrooms_for_unknown_user_is_not_found() {
        let (_dir, db) = test_db();
        assert!(matches!(
            db.list_chatrooms_for_user(Uuid::new_v4()),
            Err(StoreError::UserNotFound)
        ));
    }
}
