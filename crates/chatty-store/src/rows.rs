//! Column conversion helpers shared by the per-entity row mappers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Parse a TEXT column into a [`Uuid`].
pub(crate) fn uuid_col(idx: usize, value: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse an RFC-3339 TEXT column into a [`DateTime<Utc>`].
pub(crate) fn date_col(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
