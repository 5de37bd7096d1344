//! Error types for the deeprank-model crate.

use thiserror::Error;

/// Error type for scorer operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input or snapshot shape does not match the model.
    #[error("shape error: {message}")]
    Shape {
        /// What went wrong.
        message: String,
    },

    /// Invalid model configuration.
    #[error("configuration error: {message}")]
    Config {
        /// What went wrong.
        message: String,
    },
}

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::Shape {
            message: "expected 3 columns, got 2".into(),
        };
        assert!(err.to_string().contains("shape error"));
    }
}
