use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings exactly as they are deserialized from `config/settings.yaml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub thumbnails: ThumbnailSettings,
    pub model: ModelSettings,
    #[serde(default)]
    pub history: HistorySettings,
    pub logging: LoggingSettings,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Serve over https when set.
    pub tls: Option<TlsSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Database connection and pool configuration. Timeouts are in seconds.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    /// How long a writer waits on a locked database before giving up.
    pub busy_timeout: u64,
}

/// Limits applied to uploaded images before they reach detection.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UploadSettings {
    pub max_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_content_types: ["image/jpeg", "image/png", "image/jpg"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Configuration for thumbnail generation.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub folder: PathBuf,
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality 1..=100.
    pub jpeg_quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("thumbnails"),
            max_width: 200,
            max_height: 200,
            jpeg_quality: 85,
        }
    }
}

/// Detection model configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelSettings {
    pub name: String,
    pub onnx_path: PathBuf,
    /// Square model input, in pixels.
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

const fn default_intra_threads() -> usize {
    4
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "yolov8n".to_string(),
            onnx_path: PathBuf::from("models/yolov8n.onnx"),
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
            intra_threads: default_intra_threads(),
        }
    }
}

/// Pagination bounds for the detection history.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HistorySettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}
