use app_state::AppSettings;
use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use common_services::api::history::error::HistoryError;
use common_services::api::history::interfaces::{
    HistoryParams, HistoryResponse, RecordDetailResponse, StatsResponse,
};
use common_services::api::history::service::{detection_stats, get_detection, list_detections};
use ml_analysis::ModelLifecycle;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::instrument;

/// List stored detection records, newest first.
#[utoipa::path(
    get,
    path = "/detections",
    tag = "History",
    params(HistoryParams),
    responses(
        (status = 200, description = "One page of detection records", body = HistoryResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "A database error occurred"),
    )
)]
#[instrument(skip(pool, settings, params), err(Debug))]
pub async fn list_detections_handler(
    State(pool): State<SqlitePool>,
    State(settings): State<AppSettings>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, HistoryError> {
    let Query(params) = params.map_err(|e| HistoryError::BadRequest(e.body_text()))?;
    let page = list_detections(&pool, &settings.history, &settings.thumbnails, &params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/detections/{id}",
    tag = "History",
    params(("id" = i64, Path, description = "Detection record id")),
    responses(
        (status = 200, description = "The detection record", body = RecordDetailResponse),
        (status = 404, description = "No record with this id"),
        (status = 500, description = "A database error occurred"),
    )
)]
#[instrument(skip(pool, settings), err(Debug))]
pub async fn get_detection_handler(
    State(pool): State<SqlitePool>,
    State(settings): State<AppSettings>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RecordDetailResponse>, HistoryError> {
    let Path(id) = id.map_err(|e| HistoryError::BadRequest(e.body_text()))?;
    let record = get_detection(&pool, &settings.thumbnails, id).await?;
    Ok(Json(RecordDetailResponse {
        status: "success".to_string(),
        record,
    }))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "History",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 500, description = "A database error occurred"),
    )
)]
#[instrument(skip(pool, models), err(Debug))]
pub async fn stats_handler(
    State(pool): State<SqlitePool>,
    State(models): State<Arc<ModelLifecycle>>,
) -> Result<Json<StatsResponse>, HistoryError> {
    let class_count = models.model_info().map_or(0, |info| info.class_count());
    Ok(Json(detection_stats(&pool, class_count).await?))
}
