use app_state::AppSettings;
use axum::extract::FromRef;
use generate_thumbnails::ThumbnailGenerator;
use ml_analysis::ModelLifecycle;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: SqlitePool,
    pub settings: AppSettings,
    pub models: Arc<ModelLifecycle>,
    pub thumbnails: Arc<ThumbnailGenerator>,
}

impl ApiContext {
    #[must_use]
    pub fn new(pool: SqlitePool, settings: AppSettings, models: Arc<ModelLifecycle>) -> Self {
        Self {
            thumbnails: Arc::new(ThumbnailGenerator::new(settings.thumbnails.clone())),
            pool,
            settings,
            models,
        }
    }
}

// Lets handlers and extractors take only the part of the state they need.
impl FromRef<ApiContext> for SqlitePool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}

impl FromRef<ApiContext> for Arc<ModelLifecycle> {
    fn from_ref(state: &ApiContext) -> Self {
        Arc::clone(&state.models)
    }
}
