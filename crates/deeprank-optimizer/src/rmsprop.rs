//! RMSprop optimizer.
//!
//! RMSprop normalizes each gradient by a decaying average of its recent
//! magnitudes:
//!
//! ```text
//! mean_square = decay * mean_square + (1 - decay) * g^2
//! w = w - learning_rate * g / (sqrt(mean_square) + epsilon)
//! ```

use crate::{Optimizer, OptimizerConfig, OptimizerError};
use serde::{Deserialize, Serialize};

/// RMSprop optimizer with adaptive learning rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rmsprop {
    learning_rate: f32,
    decay: f32,
    epsilon: f32,
    /// Moving average of squared gradients, lazily sized.
    mean_square: Vec<f32>,
    config: OptimizerConfig,
}

impl Rmsprop {
    /// Returns the current mean-square state.
    pub fn mean_square(&self) -> &[f32] {
        &self.mean_square
    }

    /// Resets the optimizer state.
    pub fn reset_state(&mut self) {
        self.mean_square.clear();
    }
}

impl Optimizer for Rmsprop {
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        match config {
            OptimizerConfig::Rmsprop {
                learning_rate,
                decay,
                epsilon,
            } => Ok(Self {
                learning_rate,
                decay,
                epsilon,
                mean_square: Vec::new(),
                config,
            }),
            _ => Err(OptimizerError::ConfigMismatch {
                expected: "Rmsprop".to_string(),
                got: config.name().to_string(),
            }),
        }
    }

    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        if self.mean_square.len() != parameters.len() {
            self.mean_square = vec![0.0; parameters.len()];
        }

        for (i, (w, g)) in parameters.iter_mut().zip(gradients.iter()).enumerate() {
            self.mean_square[i] = self.decay * self.mean_square[i] + (1.0 - self.decay) * g * g;
            *w -= self.learning_rate * g / (self.mean_square[i].sqrt() + self.epsilon);
        }
    }

    fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmsprop_moves_against_gradient() {
        let mut rmsprop = Rmsprop::new(OptimizerConfig::rmsprop(0.01)).unwrap();
        let mut parameters = vec![1.0, -1.0];
        rmsprop.apply_gradients(&mut parameters, &[1.0, -1.0]);
        assert!(parameters[0] < 1.0);
        assert!(parameters[1] > -1.0);
    }

    #[test]
    fn test_rmsprop_normalizes_gradient_scale() {
        // Large and small constant gradients produce similar step sizes
        // once the mean square has adapted.
        let mut big = Rmsprop::new(OptimizerConfig::rmsprop(0.01)).unwrap();
        let mut small = Rmsprop::new(OptimizerConfig::rmsprop(0.01)).unwrap();
        let mut w_big = vec![0.0];
        let mut w_small = vec![0.0];
        for _ in 0..50 {
            big.apply_gradients(&mut w_big, &[100.0]);
            small.apply_gradients(&mut w_small, &[0.01]);
        }
        let ratio = w_big[0] / w_small[0];
        assert!((0.5..2.0).contains(&ratio), "ratio was {}", ratio);
    }

    #[test]
    fn test_rmsprop_config_mismatch() {
        let result = Rmsprop::new(OptimizerConfig::adam(0.001));
        result.expect_err("RMSprop constructor should reject a non-RMSprop config");
    }
}
