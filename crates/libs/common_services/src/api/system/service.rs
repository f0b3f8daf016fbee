use crate::api::system::interfaces::{DatabaseStatus, HealthResponse, ModelStatus};
use crate::database::ping;
use chrono::Utc;
use ml_analysis::ModelLifecycle;
use sqlx::SqlitePool;
use tracing::warn;

/// Probes the database and reads the engine state.
pub async fn health(pool: &SqlitePool, models: &ModelLifecycle) -> HealthResponse {
    let database = match ping(pool).await {
        Ok(()) => DatabaseStatus::Connected,
        Err(e) => {
            warn!("Health check could not reach the database: {e}");
            DatabaseStatus::Disconnected
        }
    };
    let model_state = models.state();
    let model = if model_state.is_ready() {
        ModelStatus::Loaded
    } else {
        ModelStatus::NotLoaded
    };

    let mut response = HealthResponse {
        status: String::new(),
        database,
        model,
        model_state,
        model_error: models.failure(),
        timestamp: Utc::now(),
    };
    response.status = if response.is_healthy() { "healthy" } else { "unhealthy" }.to_string();
    response
}
