use crate::api::detect::interfaces::thumbnail_url;
use crate::api::history::error::HistoryError;
use crate::api::history::interfaces::{
    HistoryParams, HistoryResponse, RecordResponse, StatsResponse,
};
use crate::database::{DbError, DetectionRecordStore, StoredDetectionRecord};
use app_state::{HistorySettings, ThumbnailSettings};
use chrono::{NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

/// One page of history, newest first.
pub async fn list_detections(
    pool: &SqlitePool,
    history: &HistorySettings,
    thumbnails: &ThumbnailSettings,
    params: &HistoryParams,
) -> Result<HistoryResponse, HistoryError> {
    let skip = params.skip.unwrap_or(0);
    let limit = history.clamp_limit(params.limit);

    let (rows, total) =
        DetectionRecordStore::list_page(pool, i64::from(skip), i64::from(limit)).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(present(row, thumbnails).await);
    }

    Ok(HistoryResponse {
        status: "success".to_string(),
        records,
        total,
        skip,
        limit,
    })
}

pub async fn get_detection(
    pool: &SqlitePool,
    thumbnails: &ThumbnailSettings,
    id: i64,
) -> Result<RecordResponse, HistoryError> {
    let row = DetectionRecordStore::find_by_id(pool, id)
        .await?
        .ok_or(HistoryError::NotFound(id))?;
    Ok(present(row, thumbnails).await)
}

/// Aggregates over the whole store. `class_count` comes from the loaded model.
pub async fn detection_stats(
    pool: &SqlitePool,
    class_count: usize,
) -> Result<StatsResponse, HistoryError> {
    let today = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

    let mut tx = pool.begin().await.map_err(DbError::from)?;
    let total_detections = DetectionRecordStore::count(&mut *tx).await?;
    let total_objects = DetectionRecordStore::sum_detection_counts(&mut *tx).await?;
    let today_detections = DetectionRecordStore::count_since(&mut *tx, today).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(StatsResponse {
        status: "success".to_string(),
        total_detections,
        total_objects,
        today_detections,
        detection_categories: class_count,
    })
}

/// Turns a stored row into its API shape.
///
/// A detections blob that no longer parses becomes an empty list. A thumbnail is only linked
/// while its file still exists.
async fn present(row: StoredDetectionRecord, thumbnails: &ThumbnailSettings) -> RecordResponse {
    let detections = row.decode_detections().unwrap_or_else(|e| {
        warn!("Detections of record {} could not be decoded: {e}", row.id);
        Vec::new()
    });

    let mut url = None;
    if let Some(file_name) = row.thumbnail.as_deref()
        && let Some(path) = thumbnails.resolve(file_name)
        && tokio::fs::try_exists(&path).await.unwrap_or(false)
    {
        url = Some(thumbnail_url(file_name));
    }

    let record = row.into_record(detections);
    RecordResponse {
        id: record.id,
        filename: record.filename,
        upload_time: record.upload_time,
        image_width: record.image_width,
        image_height: record.image_height,
        detection_count: record.detection_count,
        inference_time_ms: record.inference_time_ms,
        detections: record.detections,
        thumbnail_url: url,
    }
}
