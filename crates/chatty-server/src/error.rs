use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatty_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound
            | StoreError::ChatroomNotFound
            | StoreError::MessageNotFound
            | StoreError::ParentMessageNotFound
            | StoreError::ParticipantNotFound => ServerError::NotFound(err.to_string()),

            StoreError::HandleTaken(_)
            | StoreError::ChatroomNameTaken(_)
            | StoreError::AlreadyParticipant => ServerError::Conflict(err.to_string()),

            StoreError::Invalid(_) => ServerError::BadRequest(err.to_string()),

            other => ServerError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        assert!(matches!(
            ServerError::from(StoreError::UserNotFound),
            ServerError::NotFound(_)
        ));
        assert!(matches!(
            ServerError::from(StoreError::HandleTaken("ada".into())),
            ServerError::Conflict(_)
        ));
        assert!(matches!(
            ServerError::from(StoreError::Invalid("bad".into())),
            ServerError::BadRequest(_)
        ));
        assert!(matches!(
            ServerError::from(StoreError::NoDataDir),
            ServerError::Internal(_)
        ));
    }
}
