use crate::COCO_LABELS;
use crate::detector::ObjectDetector;
use app_state::ModelSettings;
use color_eyre::eyre::{Result, eyre};
use common_types::{Detection, ModelInfo};
use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::{ArrayView2, ArrayViewD, Axis, IxDyn};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use std::cmp::Ordering;
use tracing::{debug, info};

/// YOLOv8-style detector running an ONNX export through ONNX Runtime.
///
/// Expects a single `[1, 3, S, S]` input and a `[1, 4 + classes, candidates]` output where the
/// first four rows are `cx, cy, w, h` in input pixels.
pub struct YoloDetector {
    session: Session,
    settings: ModelSettings,
    labels: Vec<String>,
}

impl YoloDetector {
    /// Loads the model from `settings.onnx_path`, labelled with the COCO classes.
    pub fn load(settings: &ModelSettings) -> Result<Self> {
        let labels = COCO_LABELS.iter().map(ToString::to_string).collect();
        Self::load_with_labels(settings, labels)
    }

    pub fn load_with_labels(settings: &ModelSettings, labels: Vec<String>) -> Result<Self> {
        if !settings.onnx_path.exists() {
            return Err(eyre!(
                "model file not found: {}",
                settings.onnx_path.display()
            ));
        }
        info!("Model: {}", settings.onnx_path.display());

        let session = Session::builder()
            .map_err(|e| eyre!("Failed to create session builder: {e}"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| eyre!("Failed to set optimization level: {e}"))?
            .with_intra_threads(settings.intra_threads)
            .map_err(|e| eyre!("Failed to set intra threads: {e}"))?
            .commit_from_file(&settings.onnx_path)
            .map_err(|e| eyre!("Failed to load model: {e}"))?;

        Ok(Self {
            session,
            settings: settings.clone(),
            labels,
        })
    }

    /// Resizes to the square model input and lays the pixels out as normalized CHW floats.
    fn preprocess(&self, image: &DynamicImage) -> Vec<f32> {
        let size = self.settings.input_size;
        let resized = image::imageops::resize(&image.to_rgb8(), size, size, FilterType::Triangle);

        let plane = (size * size) as usize;
        let mut input = vec![0.0_f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = (y * size + x) as usize;
            input[offset] = f32::from(pixel[0]) / 255.0;
            input[plane + offset] = f32::from(pixel[1]) / 255.0;
            input[2 * plane + offset] = f32::from(pixel[2]) / 255.0;
        }
        input
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let size = i64::from(self.settings.input_size);
        let input = self.preprocess(image);
        let input_tensor = Tensor::from_array((vec![1_i64, 3, size, size], input))
            .map_err(|e| eyre!("Failed to build input tensor: {e}"))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| eyre!("Inference failed: {e}"))?;
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| eyre!("Failed to read model output: {e}"))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        let output = ArrayViewD::from_shape(IxDyn(&dims), data)?;
        if output.ndim() != 3 {
            return Err(eyre!("Unexpected model output shape {dims:?}"));
        }
        let predictions = output
            .index_axis(Axis(0), 0)
            .into_dimensionality::<ndarray::Ix2>()?;

        let scale = (
            image.width() as f32 / self.settings.input_size as f32,
            image.height() as f32 / self.settings.input_size as f32,
        );
        let candidates = decode_predictions(
            predictions,
            &self.labels,
            scale,
            self.settings.confidence_threshold,
        );
        let candidate_count = candidates.len();
        let detections = non_max_suppression(
            candidates,
            self.settings.iou_threshold,
            self.settings.max_detections,
        );
        debug!(
            "Kept {} of {candidate_count} candidates after NMS",
            detections.len()
        );

        Ok(detections)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.settings.name.clone(),
            classes: self.labels.clone(),
            input_size: self.settings.input_size,
        }
    }
}

/// Turns a `[4 + classes, candidates]` prediction matrix into scored boxes in source pixels.
///
/// Each candidate takes its best-scoring class. Candidates below `confidence_threshold` are
/// dropped.
pub(crate) fn decode_predictions(
    predictions: ArrayView2<'_, f32>,
    labels: &[String],
    (scale_x, scale_y): (f32, f32),
    confidence_threshold: f32,
) -> Vec<Detection> {
    let rows = predictions.nrows();
    if rows <= 4 {
        return Vec::new();
    }

    predictions
        .columns()
        .into_iter()
        .filter_map(|column| {
            let (class_id, score) = (4..rows)
                .map(|row| (row - 4, column[row]))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))?;
            if score.is_nan() || score < confidence_threshold {
                return None;
            }

            let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
            let label = labels
                .get(class_id)
                .cloned()
                .unwrap_or_else(|| format!("class_{class_id}"));
            Some(Detection::new(
                [
                    (cx - w / 2.0) * scale_x,
                    (cy - h / 2.0) * scale_y,
                    (cx + w / 2.0) * scale_x,
                    (cy + h / 2.0) * scale_y,
                ],
                label,
                class_id as u32,
                score,
            ))
        })
        .collect()
}

/// Class-wise non-maximum suppression. Output is ordered by descending confidence and
/// truncated to `max_detections`.
pub(crate) fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::new();
    for candidate in detections {
        if keep.len() >= max_detections {
            break;
        }
        let suppressed = keep.iter().any(|kept| {
            kept.class_id == candidate.class_id && iou(&kept.bbox, &candidate.bbox) > iou_threshold
        });
        if !suppressed {
            keep.push(candidate);
        }
    }
    keep
}

fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let inter_w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let inter_h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let intersection = inter_w * inter_h;
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - intersection;
    if union <= 0.0 { 0.0 } else { intersection / union }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn labels() -> Vec<String> {
        vec!["person".into(), "dog".into()]
    }

    /// Columns are candidates: `cx, cy, w, h, score(person), score(dog)`.
    fn predictions(candidates: &[[f32; 6]]) -> Array2<f32> {
        let mut array = Array2::<f32>::zeros((6, candidates.len()));
        for (i, candidate) in candidates.iter().enumerate() {
            for (row, value) in candidate.iter().enumerate() {
                array[[row, i]] = *value;
            }
        }
        array
    }

    #[test]
    fn decodes_best_class_and_scales_boxes() {
        let array = predictions(&[[100.0, 50.0, 20.0, 10.0, 0.1, 0.8]]);

        let decoded = decode_predictions(array.view(), &labels(), (2.0, 0.5), 0.25);

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].class_name, "dog");
        assert_eq!(decoded[0].class_id, 1);
        assert_eq!(decoded[0].bbox, [180.0, 22.5, 220.0, 27.5]);
        assert!((decoded[0].confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn drops_low_scores_and_names_unknown_classes() {
        let array = predictions(&[[10.0, 10.0, 4.0, 4.0, 0.2, 0.1], [10.0, 10.0, 4.0, 4.0, 0.9, 0.0]]);

        let decoded = decode_predictions(array.view(), &["person".to_string()], (1.0, 1.0), 0.25);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].class_name, "person");

        let unknown = predictions(&[[10.0, 10.0, 4.0, 4.0, 0.0, 0.9]]);
        let decoded = decode_predictions(unknown.view(), &["person".to_string()], (1.0, 1.0), 0.25);
        assert_eq!(decoded[0].class_name, "class_1");
    }

    #[test]
    fn nms_suppresses_overlaps_within_a_class_only() {
        let detections = vec![
            Detection::new([0.0, 0.0, 10.0, 10.0], "person", 0, 0.7),
            Detection::new([1.0, 1.0, 10.0, 10.0], "person", 0, 0.9),
            Detection::new([1.0, 1.0, 10.0, 10.0], "dog", 1, 0.5),
            Detection::new([50.0, 50.0, 60.0, 60.0], "person", 0, 0.6),
        ];

        let kept = non_max_suppression(detections, 0.45, 300);

        let summary: Vec<(&str, f32)> = kept
            .iter()
            .map(|d| (d.class_name.as_str(), d.confidence))
            .collect();
        assert_eq!(summary, vec![("person", 0.9), ("person", 0.6), ("dog", 0.5)]);
    }

    #[test]
    fn nms_respects_max_detections() {
        let detections = (0..10)
            .map(|i| {
                let x = i as f32 * 100.0;
                Detection::new([x, 0.0, x + 10.0, 10.0], "person", 0, 0.5)
            })
            .collect();
        assert_eq!(non_max_suppression(detections, 0.45, 3).len(), 3);
    }

    #[test]
    fn iou_of_disjoint_and_identical_boxes() {
        assert!(iou(&[0.0, 0.0, 1.0, 1.0], &[2.0, 2.0, 3.0, 3.0]).abs() < f32::EPSILON);
        assert!((iou(&[0.0, 0.0, 2.0, 2.0], &[0.0, 0.0, 2.0, 2.0]) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_model_file_fails_to_load() {
        let settings = ModelSettings {
            onnx_path: "does/not/exist.onnx".into(),
            ..ModelSettings::default()
        };
        let error = YoloDetector::load(&settings).err().map(|e| e.to_string());
        assert!(error.is_some_and(|e| e.contains("model file not found")));
    }
}
