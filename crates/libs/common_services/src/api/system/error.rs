use crate::api::error_response;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ml_analysis::EngineUnavailable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    ModelUnavailable(#[from] EngineUnavailable),
}

impl IntoResponse for SystemError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        error_response(status, self.to_string())
    }
}
