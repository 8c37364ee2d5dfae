use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised by the relational backend and its HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure taxonomy seen by the board state store.
///
/// `Validation` is raised before or at the adapter boundary, `NotFound` when an
/// id is unknown to the backend (or missing from the expected local collection
/// for archive/restore), and `Transport` for everything between: network
/// failures, backend faults and timeouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport(_))
    }
}

impl From<AppError> for StoreError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound => StoreError::NotFound("record".to_string()),
            AppError::Validation(msg) => StoreError::Validation(msg),
            AppError::Database(e) => StoreError::Transport(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
