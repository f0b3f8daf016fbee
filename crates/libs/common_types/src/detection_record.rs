use crate::Detection;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A detection record that has not been persisted yet.
///
/// The detection count is derived from the detection list, so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetectionRecord {
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub image_width: u32,
    pub image_height: u32,
    pub inference_time_ms: f64,
    pub detections: Vec<Detection>,
    pub thumbnail: Option<String>,
}

impl NewDetectionRecord {
    /// Assembles a record stamped with the current UTC time.
    ///
    /// The timestamp is truncated to microseconds, the precision the store keeps.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        (image_width, image_height): (u32, u32),
        detections: Vec<Detection>,
        inference_time_ms: f64,
        thumbnail: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            upload_time: Utc::now().trunc_subsecs(6),
            image_width,
            image_height,
            inference_time_ms,
            detections,
            thumbnail,
        }
    }

    #[must_use]
    pub fn detection_count(&self) -> usize {
        self.detections.len()
    }

    /// Attaches the identifier assigned by the store.
    #[must_use]
    pub fn into_record(self, id: i64) -> DetectionRecord {
        DetectionRecord {
            id,
            detection_count: self.detections.len(),
            filename: self.filename,
            upload_time: self.upload_time,
            image_width: self.image_width,
            image_height: self.image_height,
            inference_time_ms: self.inference_time_ms,
            detections: self.detections,
            thumbnail: self.thumbnail,
        }
    }
}

/// The persisted result of one detect call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectionRecord {
    pub id: i64,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub image_width: u32,
    pub image_height: u32,
    pub detection_count: usize,
    pub inference_time_ms: f64,
    pub detections: Vec<Detection>,
    /// File name of the thumbnail inside the thumbnail folder.
    pub thumbnail: Option<String>,
}
