use crate::routes::api_doc::ApiDoc;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common_services::api::system::error::SystemError;
use common_services::api::system::interfaces::{HealthResponse, ModelInfoResponse, RootResponse};
use common_services::api::system::service::health;
use ml_analysis::ModelLifecycle;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::instrument;
use utoipa::OpenApi;

/// Service name, version and whether detection is available.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    responses(
        (status = 200, description = "Service banner", body = RootResponse)
    )
)]
pub async fn root(State(models): State<Arc<ModelLifecycle>>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        service: "object-detection-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_ready: models.state().is_ready(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "Database reachable and model loaded", body = HealthResponse),
        (status = 503, description = "Database unreachable or model not loaded", body = HealthResponse)
    )
)]
#[instrument(skip(pool, models))]
pub async fn health_check(
    State(pool): State<SqlitePool>,
    State(models): State<Arc<ModelLifecycle>>,
) -> (StatusCode, Json<HealthResponse>) {
    let report = health(&pool, &models).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

#[utoipa::path(
    get,
    path = "/model/info",
    tag = "System",
    responses(
        (status = 200, description = "The loaded detection model", body = ModelInfoResponse),
        (status = 503, description = "The model is not loaded")
    )
)]
#[instrument(skip(models), err(Debug))]
pub async fn model_info(
    State(models): State<Arc<ModelLifecycle>>,
) -> Result<Json<ModelInfoResponse>, SystemError> {
    let engine = models.engine()?;
    Ok(Json(engine.info().clone().into()))
}

/// The OpenAPI document for this service.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
