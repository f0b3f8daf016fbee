use color_eyre::Result;
use common_types::{Detection, ModelInfo};
use image::DynamicImage;

/// The synchronous contract of a detection engine: one image in, detections out.
///
/// Implementations are not required to be `Sync`; callers serialize access.
pub trait ObjectDetector: Send + 'static {
    /// Detects objects in `image`. Box coordinates are in source image pixels and the
    /// returned order is preserved all the way to storage.
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>>;

    fn model_info(&self) -> ModelInfo;
}
