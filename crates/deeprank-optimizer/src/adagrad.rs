//! Adagrad optimizer.
//!
//! Adagrad scales the learning rate of every parameter by the inverse root
//! of its accumulated squared gradients:
//!
//! ```text
//! accumulator = accumulator + g^2
//! w = w - learning_rate * g / sqrt(accumulator)
//! ```

use crate::{Optimizer, OptimizerConfig, OptimizerError};
use serde::{Deserialize, Serialize};

/// Adagrad optimizer with per-parameter adaptive learning rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adagrad {
    learning_rate: f32,
    initial_accumulator: f32,
    /// Accumulated squared gradients, lazily sized to the parameter tensor.
    accumulator: Vec<f32>,
    config: OptimizerConfig,
}

impl Adagrad {
    /// Returns the current accumulator state.
    pub fn accumulator(&self) -> &[f32] {
        &self.accumulator
    }

    /// Resets the accumulator state.
    pub fn reset_state(&mut self) {
        self.accumulator.clear();
    }
}

impl Optimizer for Adagrad {
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        match config {
            OptimizerConfig::Adagrad {
                learning_rate,
                initial_accumulator,
            } => Ok(Self {
                learning_rate,
                initial_accumulator,
                accumulator: Vec::new(),
                config,
            }),
            _ => Err(OptimizerError::ConfigMismatch {
                expected: "Adagrad".to_string(),
                got: config.name().to_string(),
            }),
        }
    }

    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        if self.accumulator.len() != parameters.len() {
            self.accumulator = vec![self.initial_accumulator; parameters.len()];
        }

        for (i, (w, g)) in parameters.iter_mut().zip(gradients.iter()).enumerate() {
            self.accumulator[i] += g * g;
            *w -= self.learning_rate * g / self.accumulator[i].sqrt();
        }
    }

    fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}
