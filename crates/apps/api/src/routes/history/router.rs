use crate::api_state::ApiContext;
use crate::history::handlers::{get_detection_handler, list_detections_handler, stats_handler};
use axum::{Router, routing::get};

pub fn history_public_router() -> Router<ApiContext> {
    Router::new()
        .route("/detections", get(list_detections_handler))
        .route("/detections/{id}", get(get_detection_handler))
        .route("/stats", get(stats_handler))
}
