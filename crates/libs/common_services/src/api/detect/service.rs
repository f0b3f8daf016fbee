use crate::api::detect::error::DetectError;
use crate::api::detect::interfaces::UploadedFile;
use crate::api::detect::validator::validate_upload;
use crate::database::DetectionRecordStore;
use app_state::UploadSettings;
use common_types::{DetectionRecord, NewDetectionRecord};
use generate_thumbnails::{GeneratedThumbnail, ThumbnailGenerator};
use ml_analysis::InferenceEngine;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::task;
use tracing::{info, warn};

/// Validates an upload, thumbnails it, runs detection and stores the record.
///
/// Either a complete record is stored or nothing is. A thumbnail written before a later step
/// failed is removed again.
pub async fn run_detection(
    pool: &SqlitePool,
    engine: &InferenceEngine,
    thumbnails: &Arc<ThumbnailGenerator>,
    upload_settings: &UploadSettings,
    upload: UploadedFile,
) -> Result<DetectionRecord, DetectError> {
    let UploadedFile {
        filename,
        content_type,
        bytes,
    } = upload;

    let settings = upload_settings.clone();
    let validated = task::spawn_blocking(move || {
        validate_upload(&settings, content_type.as_deref(), &bytes)
    })
    .await??;
    let (width, height) = (validated.width, validated.height);
    let image = Arc::new(validated.image);

    let thumbnail = {
        let generator = Arc::clone(thumbnails);
        let image = Arc::clone(&image);
        let name = filename.clone();
        task::spawn_blocking(move || {
            let thumbnail = generator.generate(&image, &name);
            PendingThumbnail {
                generator,
                thumbnail,
            }
        })
        .await
        .unwrap_or_else(|e| {
            warn!("Thumbnail task for {filename:?} did not complete: {e}");
            PendingThumbnail {
                generator: Arc::clone(thumbnails),
                thumbnail: None,
            }
        })
    };

    let output = engine.infer(image).await?;

    let new_record = NewDetectionRecord::new(
        filename,
        (width, height),
        output.detections,
        output.elapsed_ms,
        thumbnail.file_name(),
    );
    let id = DetectionRecordStore::append(pool, &new_record).await?;
    thumbnail.keep();

    info!(
        "Stored detection record {id} for {:?}: {} objects in {:.1} ms",
        new_record.filename,
        new_record.detection_count(),
        new_record.inference_time_ms
    );
    Ok(new_record.into_record(id))
}

/// A written thumbnail that is deleted on drop unless its record was stored.
///
/// Also covers the request future being dropped mid-pipeline.
struct PendingThumbnail {
    generator: Arc<ThumbnailGenerator>,
    thumbnail: Option<GeneratedThumbnail>,
}

impl PendingThumbnail {
    fn file_name(&self) -> Option<String> {
        self.thumbnail.as_ref().map(|t| t.file_name.clone())
    }

    fn keep(mut self) {
        self.thumbnail = None;
    }
}

impl Drop for PendingThumbnail {
    fn drop(&mut self) {
        if let Some(thumbnail) = self.thumbnail.take() {
            self.generator.discard(&thumbnail);
        }
    }
}
