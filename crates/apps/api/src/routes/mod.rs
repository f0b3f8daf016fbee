mod api_doc;
pub mod detect;
pub mod history;
pub mod root;

use crate::api_state::ApiContext;
use crate::detect::router::detect_public_router;
use crate::history::router::history_public_router;
use crate::root::router::root_public_router;
use axum::Router;

pub use api_doc::ApiDoc;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    let max_upload_bytes = api_state.settings.upload.max_bytes;
    Router::new()
        .merge(root_public_router())
        .merge(detect_public_router(max_upload_bytes))
        .merge(history_public_router())
        .with_state(api_state)
}
