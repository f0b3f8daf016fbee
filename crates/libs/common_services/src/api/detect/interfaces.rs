use axum::body::Bytes;
use chrono::{DateTime, Utc};
use common_types::{Detection, DetectionRecord};
use serde::Serialize;
use utoipa::ToSchema;

/// The `file` part of a detect request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Multipart body of `POST /detect`, for the OpenAPI document only.
#[derive(ToSchema)]
pub struct DetectRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetectResponse {
    /// Always `success`.
    pub status: String,
    pub detections: Vec<Detection>,
    pub count: usize,
    /// `[width, height]` of the uploaded image.
    #[schema(value_type = Vec<u32>, example = json!([640, 480]))]
    pub image_size: [u32; 2],
    /// Milliseconds spent in the detection engine.
    pub inference_time: f64,
    pub record_id: i64,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
}

impl From<DetectionRecord> for DetectResponse {
    fn from(record: DetectionRecord) -> Self {
        Self {
            status: "success".to_string(),
            count: record.detections.len(),
            image_size: [record.image_width, record.image_height],
            inference_time: record.inference_time_ms,
            record_id: record.id,
            thumbnail_url: record.thumbnail.as_deref().map(thumbnail_url),
            filename: record.filename,
            upload_time: record.upload_time,
            detections: record.detections,
        }
    }
}

/// Public path of a thumbnail file.
#[must_use]
pub fn thumbnail_url(file_name: &str) -> String {
    format!("/thumbnails/{file_name}")
}
