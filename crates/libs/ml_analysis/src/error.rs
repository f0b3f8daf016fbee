use color_eyre::eyre;
use common_types::EngineState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference engine failed")]
    Engine(#[from] eyre::Report),

    #[error("inference engine returned a non-finite box for {class_name}")]
    NonFiniteBox { class_name: String },

    #[error("inference task did not complete")]
    Task(#[from] tokio::task::JoinError),
}

/// The engine cannot take requests in its current state.
#[derive(Debug, Error)]
#[error("detection model is not ready (state: {state})")]
pub struct EngineUnavailable {
    pub state: EngineState,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("model can only be loaded once, current state is {0}")]
    AlreadyStarted(EngineState),

    #[error("model loader task did not complete")]
    Task(#[from] tokio::task::JoinError),
}
