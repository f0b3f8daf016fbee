use chrono::{DateTime, Utc};
use common_types::{EngineState, ModelInfo};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded,
    NotLoaded,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when both the database and the model are usable, `unhealthy` otherwise.
    pub status: String,
    pub database: DatabaseStatus,
    pub model: ModelStatus,
    pub model_state: EngineState,
    /// Why the model failed to load, while it is in the `failed` state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.database == DatabaseStatus::Connected && self.model == ModelStatus::Loaded
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelInfoResponse {
    pub model_name: String,
    pub classes: Vec<String>,
    pub input_size: u32,
    pub class_count: usize,
}

impl From<ModelInfo> for ModelInfoResponse {
    fn from(info: ModelInfo) -> Self {
        Self {
            class_count: info.class_count(),
            model_name: info.model_name,
            classes: info.classes,
            input_size: info.input_size,
        }
    }
}
