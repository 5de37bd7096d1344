//! Parameter optimizers for deeprank.
//!
//! Each optimizer implements the [`Optimizer`] trait and updates one
//! parameter tensor in place from its accumulated gradient. The trainer
//! creates one optimizer instance per parameter tensor so per-parameter
//! state (moments, accumulators) never crosses tensors.
//!
//! # Available Optimizers
//!
//! - [`Sgd`] - Stochastic Gradient Descent
//! - [`Adam`] - Adaptive Moment Estimation
//! - [`Adagrad`] - Adaptive Gradient Algorithm
//! - [`Rmsprop`] - Root Mean Square Propagation
//!
//! # Example
//!
//! ```
//! use deeprank_optimizer::{Optimizer, OptimizerConfig, Sgd};
//!
//! let mut sgd = Sgd::new(OptimizerConfig::Sgd { learning_rate: 0.01 }).unwrap();
//! let mut weights = vec![1.0, 2.0, 3.0];
//! let gradients = vec![0.1, 0.2, 0.3];
//! sgd.apply_gradients(&mut weights, &gradients);
//! assert!(weights[0] < 1.0);
//! ```

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod adagrad;
mod adam;
mod rmsprop;
mod sgd;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use rmsprop::Rmsprop;
pub use sgd::Sgd;

/// Errors that can occur when constructing optimizers.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Configuration variant does not match the optimizer type.
    #[error("config mismatch: expected {expected}, got {got}")]
    ConfigMismatch {
        /// The optimizer being constructed.
        expected: String,
        /// The configuration variant that was provided.
        got: String,
    },

    /// Invalid configuration parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Configuration for the supported optimizer types.
///
/// This is the closed set of optimizers the training configuration accepts;
/// there is no string-based dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptimizerConfig {
    /// Stochastic gradient descent.
    Sgd {
        /// Learning rate for gradient updates.
        learning_rate: f32,
    },

    /// Adam.
    Adam {
        /// Learning rate for gradient updates.
        learning_rate: f32,
        /// Exponential decay rate for first-moment estimates.
        beta1: f32,
        /// Exponential decay rate for second-moment estimates.
        beta2: f32,
        /// Small constant for numerical stability.
        epsilon: f32,
    },

    /// Adagrad.
    Adagrad {
        /// Learning rate for gradient updates.
        learning_rate: f32,
        /// Initial value for the squared-gradient accumulator.
        initial_accumulator: f32,
    },

    /// RMSprop.
    Rmsprop {
        /// Learning rate for gradient updates.
        learning_rate: f32,
        /// Decay rate for the moving average of squared gradients.
        decay: f32,
        /// Small constant for numerical stability.
        epsilon: f32,
    },
}

impl OptimizerConfig {
    /// SGD at the given learning rate.
    pub fn sgd(learning_rate: f32) -> Self {
        OptimizerConfig::Sgd { learning_rate }
    }

    /// Adam at the given learning rate with the usual defaults.
    pub fn adam(learning_rate: f32) -> Self {
        OptimizerConfig::Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }

    /// Adagrad at the given learning rate.
    pub fn adagrad(learning_rate: f32) -> Self {
        OptimizerConfig::Adagrad {
            learning_rate,
            initial_accumulator: 0.1,
        }
    }

    /// RMSprop at the given learning rate.
    pub fn rmsprop(learning_rate: f32) -> Self {
        OptimizerConfig::Rmsprop {
            learning_rate,
            decay: 0.9,
            epsilon: 1e-8,
        }
    }

    /// Returns the name of the optimizer type.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerConfig::Sgd { .. } => "Sgd",
            OptimizerConfig::Adam { .. } => "Adam",
            OptimizerConfig::Adagrad { .. } => "Adagrad",
            OptimizerConfig::Rmsprop { .. } => "Rmsprop",
        }
    }

    /// Returns the learning rate for the optimizer.
    pub fn learning_rate(&self) -> f32 {
        match self {
            OptimizerConfig::Sgd { learning_rate } => *learning_rate,
            OptimizerConfig::Adam { learning_rate, .. } => *learning_rate,
            OptimizerConfig::Adagrad { learning_rate, .. } => *learning_rate,
            OptimizerConfig::Rmsprop { learning_rate, .. } => *learning_rate,
        }
    }
}

/// Trait for parameter optimizers.
pub trait Optimizer: Sized {
    /// Creates a new optimizer from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::ConfigMismatch`] if the configuration
    /// variant does not match the optimizer type.
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError>;

    /// Applies gradients to update the parameter slice in place.
    ///
    /// # Panics
    ///
    /// May panic if `parameters` and `gradients` have different lengths.
    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]);

    /// Returns a reference to the optimizer's configuration.
    fn config(&self) -> &OptimizerConfig;
}

/// Object-safe mirror of [`Optimizer`] for dynamic dispatch.
pub trait OptimizerDyn: Send {
    /// Applies gradients to update the parameter slice in place.
    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]);

    /// Returns a reference to the optimizer's configuration.
    fn config(&self) -> &OptimizerConfig;
}

impl<T: Optimizer + Send> OptimizerDyn for T {
    fn apply_gradients(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        Optimizer::apply_gradients(self, parameters, gradients)
    }

    fn config(&self) -> &OptimizerConfig {
        Optimizer::config(self)
    }
}

/// Creates a boxed optimizer matching the configuration variant.
///
/// # Example
///
/// ```
/// use deeprank_optimizer::{create_optimizer, OptimizerConfig};
///
/// let mut optimizer = create_optimizer(OptimizerConfig::adam(0.001));
/// assert_eq!(optimizer.config().name(), "Adam");
/// ```
pub fn create_optimizer(config: OptimizerConfig) -> Box<dyn OptimizerDyn> {
    match &config {
        OptimizerConfig::Sgd { .. } => {
            Box::new(Sgd::new(config).expect("variant checked above"))
        }
        OptimizerConfig::Adam { .. } => {
            Box::new(Adam::new(config).expect("variant checked above"))
        }
        OptimizerConfig::Adagrad { .. } => {
            Box::new(Adagrad::new(config).expect("variant checked above"))
        }
        OptimizerConfig::Rmsprop { .. } => {
            Box::new(Rmsprop::new(config).expect("variant checked above"))
        }
    }
}
