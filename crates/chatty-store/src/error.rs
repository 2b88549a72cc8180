use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Referenced chatroom does not exist.
    #[error("Chatroom not found")]
    ChatroomNotFound,

    /// Referenced message does not exist.
    #[error("Message not found")]
    MessageNotFound,

    /// A reply referenced a parent message that does not exist.
    #[error("Parent message not found")]
    ParentMessageNotFound,

    /// Referenced participant row does not exist.
    #[error("Participant not found")]
    ParticipantNotFound,

    /// Another user already owns the requested handle.
    #[error("Handle '{0}' is already taken")]
    HandleTaken(String),

    /// Another chatroom already owns the requested name.
    #[error("Chatroom name '{0}' is already taken")]
    ChatroomNameTaken(String),

    /// The (user, chatroom) pair is already a participant.
    #[error("User is already a participant of this chatroom")]
    AlreadyParticipant,

    /// A field failed validation.
    #[error("{0}")]
    Invalid(String),

    /// UUID parsing error.
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// Chrono parsing error.
    #[error("Timestamp parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
