#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

mod coco;
mod detector;
mod error;
mod inference;
mod lifecycle;
mod yolo;

pub use coco::COCO_LABELS;
pub use detector::ObjectDetector;
pub use error::*;
pub use inference::{InferenceEngine, InferenceOutput};
pub use lifecycle::ModelLifecycle;
pub use yolo::YoloDetector;
