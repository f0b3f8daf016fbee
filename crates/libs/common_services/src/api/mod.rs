pub mod detect;
pub mod history;
pub mod system;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Every error leaves the service as `{"status": "error", "error": "<message>"}`.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(json!({ "status": "error", "error": message.into() }));
    (status, body).into_response()
}
