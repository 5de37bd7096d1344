//! Error types for the deeprank-training crate.

use thiserror::Error;

/// Errors that can occur while configuring or running training.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Invalid trainer configuration or input data arity.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unrecognized loss name at configuration time.
    #[error("unknown loss: {0}")]
    UnknownLoss(String),

    /// Unrecognized metric name at configuration time.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// Cancellation was requested; the in-flight batch completed and the
    /// loop stopped before the next one.
    #[error("training interrupted between batches")]
    Interrupted,

    /// A hook failed.
    #[error("hook error: {0}")]
    Hook(#[from] crate::hooks::HookError),

    /// A pairwise loss evaluation failed.
    #[error("loss error: {0}")]
    Loss(#[from] deeprank_loss::LossError),

    /// A scorer operation failed.
    #[error("model error: {0}")]
    Model(#[from] deeprank_model::ModelError),

    /// A metric evaluation failed.
    #[error("evaluation error: {0}")]
    Eval(#[from] deeprank_metrics::EvalError),

    /// Negative sampling failed.
    #[error("sampling error: {0}")]
    Sample(#[from] deeprank_data::SampleError),

    /// An interaction-table operation failed.
    #[error("data error: {0}")]
    Data(#[from] deeprank_data::DataError),

    /// An I/O error occurred (checkpoint persistence).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A checkpoint could not be serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias for training operations.
pub type TrainResult<T> = Result<T, TrainError>;
