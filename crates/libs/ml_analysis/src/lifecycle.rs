use crate::detector::ObjectDetector;
use crate::inference::InferenceEngine;
use crate::{EngineUnavailable, LifecycleError};
use color_eyre::Result;
use common_types::{EngineState, ModelInfo};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task;
use tracing::{error, info};

enum Slot {
    Unloaded,
    Loading,
    Ready(Arc<InferenceEngine>),
    Failed(String),
}

impl Slot {
    const fn state(&self) -> EngineState {
        match self {
            Self::Unloaded => EngineState::Unloaded,
            Self::Loading => EngineState::Loading,
            Self::Ready(_) => EngineState::Ready,
            Self::Failed(_) => EngineState::Failed,
        }
    }
}

/// Owns the inference engine and its `unloaded → loading → ready | failed` state.
///
/// Constructed once at startup and shared with every request through the API state.
pub struct ModelLifecycle {
    slot: RwLock<Slot>,
}

impl Default for ModelLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLifecycle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::Unloaded),
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).state()
    }

    /// Why loading failed, when it did.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        match &*self.slot.read().unwrap_or_else(PoisonError::into_inner) {
            Slot::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// The engine, if it is ready to take requests.
    pub fn engine(&self) -> Result<Arc<InferenceEngine>, EngineUnavailable> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Slot::Ready(engine) => Ok(Arc::clone(engine)),
            other => Err(EngineUnavailable {
                state: other.state(),
            }),
        }
    }

    #[must_use]
    pub fn model_info(&self) -> Option<ModelInfo> {
        self.engine().ok().map(|engine| engine.info().clone())
    }

    /// Runs `loader` on the blocking pool and records the outcome.
    ///
    /// Only valid from `unloaded`. A failed load is final: nothing retries it.
    pub async fn load<F>(&self, loader: F) -> Result<EngineState, LifecycleError>
    where
        F: FnOnce() -> Result<Box<dyn ObjectDetector>> + Send + 'static,
    {
        {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            if !matches!(*slot, Slot::Unloaded) {
                return Err(LifecycleError::AlreadyStarted(slot.state()));
            }
            *slot = Slot::Loading;
        }
        info!("Loading detection model");

        let outcome = match task::spawn_blocking(loader).await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                self.set(Slot::Failed(join_error.to_string()));
                return Err(join_error.into());
            }
        };

        let state = match outcome {
            Ok(detector) => {
                let engine = InferenceEngine::new(detector);
                info!(
                    "Detection model {} ready ({} classes)",
                    engine.info().model_name,
                    engine.info().class_count()
                );
                self.set(Slot::Ready(Arc::new(engine)));
                EngineState::Ready
            }
            Err(e) => {
                error!("Detection model failed to load: {e:?}");
                self.set(Slot::Failed(format!("{e:#}")));
                EngineState::Failed
            }
        };

        Ok(state)
    }

    /// Drops the engine at shutdown. In-flight calls keep their own handle until they finish.
    pub fn unload(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*slot, Slot::Ready(_)) {
            info!("Unloading detection model");
            *slot = Slot::Unloaded;
        }
    }

    fn set(&self, next: Slot) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}
