use crate::api::error_response;
use crate::database::DbError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use ml_analysis::{EngineUnavailable, InferenceError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("{0}")]
    BadInput(String),

    #[error(transparent)]
    ModelUnavailable(#[from] EngineUnavailable),

    #[error("inference failed")]
    Inference(#[from] InferenceError),

    #[error("database error")]
    Database(#[from] DbError),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

impl DetectError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadInput(message.into())
    }
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::ModelUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            Self::Inference(e) => {
                error!("Inference failed: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Object detection failed.".to_string(),
                )
            }
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
            Self::Internal(e) => {
                error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected internal error occurred.".to_string(),
                )
            }
        };

        error_response(status, message)
    }
}

impl From<tokio::task::JoinError> for DetectError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(eyre::Report::new(err))
    }
}
