use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_types::{Detection, ModelInfo};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ml_analysis::ObjectDetector;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Builds the engine for a test server.
pub type DetectorLoader = Box<dyn FnOnce() -> Result<Box<dyn ObjectDetector>> + Send + 'static>;

/// Counts what the scripted detector went through.
#[derive(Debug, Default)]
pub struct DetectorProbe {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

/// Images narrower than this contain nothing.
pub const EMPTY_BELOW_WIDTH: u32 = 64;

/// Finds a person and a dog in every image at least `EMPTY_BELOW_WIDTH` pixels wide.
pub struct ScriptedDetector {
    probe: Arc<DetectorProbe>,
}

impl ObjectDetector for ScriptedDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);

        if image.width() < EMPTY_BELOW_WIDTH {
            return Ok(vec![]);
        }
        Ok(vec![
            Detection::new([10.0, 20.0, 110.0, 220.0], "person", 0, 0.91),
            Detection::new([200.0, 150.0, 400.0, 380.0], "dog", 1, 0.67),
        ])
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_name: "scripted".into(),
            classes: vec!["person".into(), "dog".into()],
            input_size: 640,
        }
    }
}

pub fn scripted_loader() -> (DetectorLoader, Arc<DetectorProbe>) {
    let probe = Arc::new(DetectorProbe::default());
    let detector_probe = Arc::clone(&probe);
    let loader: DetectorLoader = Box::new(move || {
        Ok(Box::new(ScriptedDetector {
            probe: detector_probe,
        }) as Box<dyn ObjectDetector>)
    });
    (loader, probe)
}

/// A loader that fails like a missing model file does.
pub fn failing_loader() -> (DetectorLoader, Arc<DetectorProbe>) {
    let loader: DetectorLoader = Box::new(|| Err(eyre!("model file not found: models/missing.onnx")));
    (loader, Arc::new(DetectorProbe::default()))
}

pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Result<Vec<u8>> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), format)?;
    Ok(bytes)
}

pub fn jpeg(width: u32, height: u32) -> Result<Vec<u8>> {
    encode_image(width, height, ImageFormat::Jpeg)
}

/// A multipart form with a single `file` part.
pub fn file_form(bytes: Vec<u8>, file_name: &str, content_type: &str) -> Result<Form> {
    let part = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(content_type)?;
    Ok(Form::new().part("file", part))
}

/// Asserts the shared error body shape and returns the message.
pub fn error_message(body: &Value) -> Result<String> {
    assert_eq!(body["status"], "error", "unexpected error body: {body}");
    body["error"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| eyre!("error body without message: {body}"))
}
