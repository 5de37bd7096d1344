//! Adam optimizer.
//!
//! Adam keeps exponential moving averages of gradients (first moment) and
//! squared gradients (second moment) with bias correction:
//!
//! ```text
//! m = beta1 * m + (1 - beta1) * g
//! v = beta2 * v + (1 - beta2) * g^2
//! m_hat = m / (1 - beta1^t)
//! v_hat = v / (1 - beta2^t)
//! w = w - learning_rate * m_hat / (sqrt(v_hat) + epsilon)
//! ```

use crate::{Optimizer, OptimizerConfig, OptimizerError};
use serde::{Deserialize, Serialize};

/// Adam optimizer with adaptive learning rates and momentum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First-moment estimates, lazily sized to the parameter tensor.
    m: Vec<f32>,
    /// Second-moment estimates.
    v: Vec<f32>,
    /// Timestep for bias correction.
    t: u64,
    config: OptimizerConfig,
}

impl Adam {
    /// Returns the current timestep.
    pub fn timestep(&self) -> u64 {
        self.t
    }

    /// Resets the optimizer state.
    pub fn reset_state(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }
}

impl Optimizer for Adam {
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        match config {
            OptimizerConfig::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Ok(Self {
                learning_rate,
                beta1,
                beta2,
                epsilon,
                m: Vec::new(),
                v: Vec::new(),
                t: 0,
                config,
            }),
            _ => Err(OptimizerError::ConfigMismatch {
                expected: "Adam".to_string(),
                got: config.name().to_string(),
            }),
        }
    }

    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        if self.m.len() != parameters.len() {
            self.m = vec![0.0; parameters.len()];
            self.v = vec![0.0; parameters.len()];
        }

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for (i, (w, g)) in parameters.iter_mut().zip(gradients.iter()).enumerate() {
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = self.m[i] / bias_correction1;
            let v_hat = self.v[i] / bias_correction2;
            *w -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
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
    fn test_adam_moves_against_gradient() {
        let mut adam = Adam::new(OptimizerConfig::adam(0.1)).unwrap();
        let mut parameters = vec![1.0, -1.0];
        adam.apply_gradients(&mut parameters, &[1.0, -1.0]);
        assert!(parameters[0] < 1.0);
        assert!(parameters[1] > -1.0);
        assert_eq!(adam.timestep(), 1);
    }

    #[test]
    fn test_adam_first_step_is_learning_rate_sized() {
        // With bias correction, the first update is ~lr regardless of the
        // gradient magnitude.
        let mut adam = Adam::new(OptimizerConfig::adam(0.1)).unwrap();
        let mut parameters = vec![0.0];
        adam.apply_gradients(&mut parameters, &[42.0]);
        assert!((parameters[0] + 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_adam_state_resizes_for_new_tensor() {
        let mut adam = Adam::new(OptimizerConfig::adam(0.1)).unwrap();
        let mut small = vec![0.0; 2];
        adam.apply_gradients(&mut small, &[1.0, 1.0]);
        let mut large = vec![0.0; 4];
        adam.apply_gradients(&mut large, &[1.0, 1.0, 1.0, 1.0]);
        assert!(large.iter().all(|&w| w < 0.0));
    }

    #[test]
    fn test_adam_reset_state() {
        let mut adam = Adam::new(OptimizerConfig::adam(0.1)).unwrap();
        let mut parameters = vec![0.0];
        adam.apply_gradients(&mut parameters, &[1.0]);
        adam.reset_state();
        assert_eq!(adam.timestep(), 0);
    }

    #[test]
    fn test_adam_config_mismatch() {
        let result = Adam::new(OptimizerConfig::sgd(0.1));
        result.expect_err("Adam constructor should reject a non-Adam config");
    }
}
