use chrono::{DateTime, Utc};
use common_types::Detection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct HistoryParams {
    /// Records to skip, newest first. Defaults to 0.
    pub skip: Option<u32>,
    /// Page size. Defaults to 20 and is clamped to `1..=100`.
    pub limit: Option<u32>,
}

/// A stored detection record as the API presents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    pub id: i64,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub image_width: u32,
    pub image_height: u32,
    pub detection_count: usize,
    pub inference_time_ms: f64,
    pub detections: Vec<Detection>,
    /// `null` when the thumbnail was never written or has since disappeared.
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub status: String,
    pub records: Vec<RecordResponse>,
    /// Number of records in the store.
    pub total: i64,
    pub skip: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordDetailResponse {
    pub status: String,
    pub record: RecordResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub status: String,
    pub total_detections: i64,
    /// Sum of objects found over all records.
    pub total_objects: i64,
    /// Records uploaded since 00:00 UTC today.
    pub today_detections: i64,
    /// Classes the loaded model can detect, 0 while it is not ready.
    pub detection_categories: usize,
}
