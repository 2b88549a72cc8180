//! v001 -- Initial schema creation.
//!
//! Creates the four core tables: `users`, `chatrooms`,
//! `chatroom_participants`, and `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    name              TEXT NOT NULL,              -- display name
    handle            TEXT NOT NULL UNIQUE,       -- normalized, lowercase
    created_date      TEXT NOT NULL,              -- ISO-8601 / RFC-3339
    last_updated_date TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Chatrooms
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chatrooms (
    id                TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    name              TEXT NOT NULL UNIQUE,       -- normalized, lowercase
    created_date      TEXT NOT NULL,
    last_updated_date TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Chatroom participants (durable membership)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chatroom_participants (
    id                TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    user_id           TEXT NOT NULL,              -- FK -> users(id)
    chatroom_id       TEXT NOT NULL,              -- FK -> chatrooms(id)
    created_date      TEXT NOT NULL,
    last_updated_date TEXT NOT NULL,

    UNIQUE (user_id, chatroom_id),
    FOREIGN KEY (user_id)     REFERENCES users(id)     ON DELETE CASCADE,
    FOREIGN KEY (chatroom_id) REFERENCES chatrooms(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_participants_user_id
    ON chatroom_participants(user_id);
CREATE INDEX IF NOT EXISTS idx_participants_chatroom_id
    ON chatroom_participants(chatroom_id);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id                TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    message_text      TEXT NOT NULL,
    user_id           TEXT NOT NULL,              -- FK -> users(id)
    chatroom_id       TEXT NOT NULL,              -- FK -> chatrooms(id)
    is_reply          INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    parent_message_id TEXT,                       -- nullable FK -> messages(id)
    created_date      TEXT NOT NULL,
    last_updated_date TEXT NOT NULL,

    FOREIGN KEY (user_id)     REFERENCES users(id)     ON DELETE CASCADE,
    FOREIGN KEY (chatroom_id) REFERENCES chatrooms(id) ON DELETE CASCADE,
    FOREIGN KEY (parent_message_id) REFERENCES messages(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_user_id ON messages(user_id);
CREATE INDEX IF NOT EXISTS idx_messages_chatroom_id ON messages(chatroom_id);
CREATE INDEX IF NOT EXISTS idx_messages_parent_message_id
    ON messages(parent_message_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
