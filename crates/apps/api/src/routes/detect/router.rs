use crate::api_state::ApiContext;
use crate::detect::handlers::detect_handler;
use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::post};

/// `max_upload_bytes` is the validator's cap. The body limit sits above it so oversized files
/// still get a proper validation error.
pub fn detect_public_router(max_upload_bytes: usize) -> Router<ApiContext> {
    Router::new()
        .route("/detect", post(detect_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_mul(2)))
}
