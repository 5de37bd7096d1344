//! Error types for the deeprank-loss crate.

use thiserror::Error;

/// Error type for pairwise loss construction.
#[derive(Debug, Error)]
pub enum LossError {
    /// A score vector has an invalid shape for the pairwise loss.
    ///
    /// Positive scores must form a non-empty column and negative scores a
    /// non-empty row; an empty side makes the pairwise residual matrix
    /// undefined.
    #[error("shape error: expected {expected}, got length {actual}")]
    Shape {
        /// What the loss expected at this position.
        expected: &'static str,
        /// The offending vector length.
        actual: usize,
    },
}

/// Result type alias for loss operations.
pub type LossResult<T> = Result<T, LossError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LossError::Shape {
            expected: "non-empty positive score column",
            actual: 0,
        };
        assert!(err.to_string().contains("shape error"));
        assert!(err.to_string().contains("positive"));
    }
}
