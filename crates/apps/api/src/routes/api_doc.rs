use crate::routes::{detect, history, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        root::handlers::model_info,
        detect::handlers::detect_handler,
        history::handlers::list_detections_handler,
        history::handlers::get_detection_handler,
        history::handlers::stats_handler,
    ),
    tags(
        (name = "Detection", description = "Upload images and detect objects"),
        (name = "History", description = "Stored detection records and statistics"),
        (name = "System", description = "Service status and model information"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/health", "/model/info", "/detect", "/detections", "/detections/{id}", "/stats"] {
            assert!(doc.paths.paths.contains_key(path), "{path} is not documented");
        }
    }
}
