use app_state::ModelSettings;
use ml_analysis::{InferenceEngine, YoloDetector};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut args = env::args().skip(1);
    let image_path = PathBuf::from(args.next().unwrap_or_else(|| "media_dir/street.jpg".into()));
    let settings = ModelSettings {
        onnx_path: args.next().map_or_else(|| ModelSettings::default().onnx_path, PathBuf::from),
        ..ModelSettings::default()
    };

    let engine = InferenceEngine::new(Box::new(YoloDetector::load(&settings)?));
    let image = Arc::new(image::open(&image_path)?);

    let output = engine.infer(Arc::clone(&image)).await?;
    println!(
        "{}: {}x{}, {} objects in {:.2} ms",
        image_path.display(),
        image.width(),
        image.height(),
        output.detections.len(),
        output.elapsed_ms
    );
    for detection in &output.detections {
        println!(
            "  {:<16} {:.3}  [{:.1}, {:.1}, {:.1}, {:.1}]",
            detection.class_name,
            detection.confidence,
            detection.bbox[0],
            detection.bbox[1],
            detection.bbox[2],
            detection.bbox[3]
        );
    }

    Ok(())
}
