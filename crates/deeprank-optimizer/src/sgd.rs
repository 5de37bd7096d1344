//! Stochastic Gradient Descent (SGD) optimizer.
//!
//! Updates parameters by subtracting the gradient scaled by the learning
//! rate: `w = w - learning_rate * g`.

use crate::{Optimizer, OptimizerConfig, OptimizerError};
use serde::{Deserialize, Serialize};

/// Stochastic gradient descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sgd {
    learning_rate: f32,
    config: OptimizerConfig,
}

impl Sgd {
    /// Creates an SGD optimizer with the given learning rate.
    pub fn with_learning_rate(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            config: OptimizerConfig::Sgd { learning_rate },
        }
    }
}

impl Optimizer for Sgd {
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        match config {
            OptimizerConfig::Sgd { learning_rate } => Ok(Self {
                learning_rate,
                config,
            }),
            _ => Err(OptimizerError::ConfigMismatch {
                expected: "Sgd".to_string(),
                got: config.name().to_string(),
            }),
        }
    }

    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        for (w, g) in parameters.iter_mut().zip(gradients.iter()) {
            *w -= self.learning_rate * g;
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
    fn test_sgd_basic_update() {
        let mut sgd = Sgd::new(OptimizerConfig::Sgd { learning_rate: 0.1 }).unwrap();
        let mut parameters = vec![1.0, 2.0, 3.0];
        sgd.apply_gradients(&mut parameters, &[1.0, 1.0, 1.0]);
        assert!((parameters[0] - 0.9).abs() < 1e-6);
        assert!((parameters[1] - 1.9).abs() < 1e-6);
        assert!((parameters[2] - 2.9).abs() < 1e-6);
    }

    #[test]
    fn test_sgd_zero_gradient_is_noop() {
        let mut sgd = Sgd::with_learning_rate(0.1);
        let mut parameters = vec![1.0, 2.0];
        sgd.apply_gradients(&mut parameters, &[0.0, 0.0]);
        assert_eq!(parameters, vec![1.0, 2.0]);
    }

    #[test]
    fn test_sgd_config_mismatch() {
        let result = Sgd::new(OptimizerConfig::adam(0.001));
        result.expect_err("SGD constructor should reject a non-SGD config");
    }
}
