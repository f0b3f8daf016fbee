use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One recognized object instance, as reported by the detection engine.
///
/// The bounding box is `[x1, y1, x2, y2]` in source image pixels. It is kept as the engine
/// reported it, so it may extend past the image edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Detection {
    #[schema(value_type = Vec<f32>, example = json!([12.5, 40.0, 180.25, 310.0]))]
    pub bbox: [f32; 4],
    pub class_name: String,
    pub class_id: u32,
    /// Always within `0.0..=1.0`.
    pub confidence: f32,
}

impl Detection {
    #[must_use]
    pub fn new(bbox: [f32; 4], class_name: impl Into<String>, class_id: u32, confidence: f32) -> Self {
        Self {
            bbox,
            class_name: class_name.into(),
            class_id,
            confidence: clamp_confidence(confidence),
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }
}

/// Clamps a raw engine score into `[0, 1]`. NaN maps to `0`.
#[must_use]
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
