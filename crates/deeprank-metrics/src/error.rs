//! Error types for the deeprank-metrics crate.

use thiserror::Error;

/// Error type for metric evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A candidate-list block violates the label layout invariant: the
    /// relevant item must sit at position 0 and be the only positive in the
    /// block.
    #[error("label layout error in candidate list {block}: {message}")]
    LabelLayout {
        /// Zero-based block index.
        block: usize,
        /// What the block looked like.
        message: String,
    },

    /// Score/label arrays have incompatible or degenerate shapes.
    #[error("shape error: {message}")]
    Shape {
        /// What went wrong.
        message: String,
    },

    /// A metric needs both classes present in the labels.
    #[error("degenerate labels: {message}")]
    DegenerateLabels {
        /// What went wrong.
        message: String,
    },
}

/// Result type alias for metric evaluation.
pub type EvalResult<T> = Result<T, EvalError>;
