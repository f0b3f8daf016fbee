use crate::api::error_response;
use crate::database::DbError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Detection record not found: {0}")]
    NotFound(i64),

    #[error("database error")]
    Database(#[from] DbError),
}

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Database(e) if e.is_unavailable() => {
                error!("Database unavailable: {e:?}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The database is currently unavailable.".to_string(),
                )
            }
            Self::Database(e) => {
                error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred.".to_string(),
                )
            }
        };

        error_response(status, message)
    }
}
