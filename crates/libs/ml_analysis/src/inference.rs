use crate::InferenceError;
use crate::detector::ObjectDetector;
use common_types::{Detection, ModelInfo, clamp_confidence};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task;
use tracing::debug;

/// Result of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOutput {
    pub detections: Vec<Detection>,
    /// Wall-clock time spent inside the engine call.
    pub elapsed_ms: f64,
}

/// Shared handle to the loaded detector.
///
/// Calls are single-flight: the detector sits behind a fair async mutex and each call runs on
/// the blocking pool while holding it.
pub struct InferenceEngine {
    detector: Arc<Mutex<Box<dyn ObjectDetector>>>,
    info: ModelInfo,
}

impl InferenceEngine {
    #[must_use]
    pub fn new(detector: Box<dyn ObjectDetector>) -> Self {
        let info = detector.model_info();
        Self {
            detector: Arc::new(Mutex::new(detector)),
            info,
        }
    }

    #[must_use]
    pub const fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Runs the detector once. Engine errors are returned as-is, never retried.
    ///
    /// A box with a NaN or infinite coordinate fails the whole call.
    pub async fn infer(&self, image: Arc<DynamicImage>) -> Result<InferenceOutput, InferenceError> {
        let mut detector = Arc::clone(&self.detector).lock_owned().await;

        let (detections, elapsed_ms) = task::spawn_blocking(move || {
            let started = Instant::now();
            let result = detector.detect(&image);
            (result, started.elapsed().as_secs_f64() * 1000.0)
        })
        .await?;

        let detections = detections?
            .into_iter()
            .map(|d| {
                if !d.bbox.iter().all(|v| v.is_finite()) {
                    return Err(InferenceError::NonFiniteBox {
                        class_name: d.class_name,
                    });
                }
                Ok(Detection {
                    confidence: clamp_confidence(d.confidence),
                    ..d
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Inference found {} objects in {elapsed_ms:.2} ms",
            detections.len()
        );

        Ok(InferenceOutput {
            detections,
            elapsed_ms,
        })
    }
}
