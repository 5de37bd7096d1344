//! Trainer configuration and validation data.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use deeprank_loss::DEFAULT_TAU;
use deeprank_metrics::RankingEvaluator;
use deeprank_model::Tensor;
use deeprank_optimizer::OptimizerConfig;

use crate::error::{TrainError, TrainResult};
use crate::kinds::{LossKind, MetricKind};

/// Default number of users per gradient step.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Default validation AUC floor below which training is treated as
/// diverged.
pub const DEFAULT_DIVERGENCE_FLOOR: f64 = 0.1;

/// Configuration for [`crate::trainer::RankingTrainer`].
///
/// # Examples
///
/// ```
/// use deeprank_training::config::TrainerConfig;
///
/// let config = TrainerConfig::new(16980)
///     .with_epochs(10)
///     .with_batch_size(128)
///     .with_learning_rate(0.01)
///     .with_tau(0.02)
///     .with_seed(1024);
/// assert_eq!(config.item_universe, 16980);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Size of the item universe negatives are drawn from.
    pub item_universe: usize,
    /// Users per gradient step.
    pub batch_size: usize,
    /// Number of training epochs.
    pub epochs: usize,
    /// Learning rate for the default optimizer.
    pub learning_rate: f32,
    /// Logistic temperature of the smooth-AUC loss.
    pub tau: f32,
    /// Whether to shuffle user batches every epoch.
    pub shuffle: bool,
    /// Seed for batch shuffling and negative sampling.
    pub seed: u64,
    /// Training loss; `fit_ranking` requires the smooth-AUC loss.
    pub loss: LossKind,
    /// Validation metrics to compute each epoch.
    pub metrics: Vec<MetricKind>,
    /// Optimizer override; defaults to Adam at `learning_rate`.
    pub optimizer: Option<OptimizerConfig>,
    /// Validation-AUC floor treated as divergence.
    pub divergence_floor: f64,
    /// Evaluator for the held-out candidate lists.
    pub evaluator: RankingEvaluator,
    /// Directory the best checkpoint is written into, if set.
    pub model_dir: Option<PathBuf>,
}

impl TrainerConfig {
    /// Creates a configuration for the given item universe with the usual
    /// training defaults.
    pub fn new(item_universe: usize) -> Self {
        Self {
            item_universe,
            batch_size: DEFAULT_BATCH_SIZE,
            epochs: 1,
            learning_rate: 0.01,
            tau: DEFAULT_TAU,
            shuffle: true,
            seed: 1024,
            loss: LossKind::SmoothAucLambda,
            metrics: vec![MetricKind::AucPersonal],
            optimizer: None,
            divergence_floor: DEFAULT_DIVERGENCE_FLOOR,
            evaluator: RankingEvaluator::default(),
            model_dir: None,
        }
    }

    /// Sets the number of epochs.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the logistic temperature.
    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    /// Sets the shuffle flag.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the training loss.
    pub fn with_loss(mut self, loss: LossKind) -> Self {
        self.loss = loss;
        self
    }

    /// Sets the validation metric list.
    pub fn with_metrics(mut self, metrics: Vec<MetricKind>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Sets an explicit optimizer configuration.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Sets the divergence floor.
    pub fn with_divergence_floor(mut self, divergence_floor: f64) -> Self {
        self.divergence_floor = divergence_floor;
        self
    }

    /// Sets the candidate-list evaluator.
    pub fn with_evaluator(mut self, evaluator: RankingEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Sets the checkpoint directory.
    pub fn with_model_dir(mut self, model_dir: PathBuf) -> Self {
        self.model_dir = Some(model_dir);
        self
    }

    /// Resolves the effective optimizer configuration.
    pub fn effective_optimizer(&self) -> OptimizerConfig {
        self.optimizer
            .clone()
            .unwrap_or_else(|| OptimizerConfig::adam(self.learning_rate))
    }

    /// Checks configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Config`] for a zero batch size, an empty item
    /// universe or a non-positive temperature.
    pub fn validate(&self) -> TrainResult<()> {
        if self.batch_size == 0 {
            return Err(TrainError::Config("batch size must be positive".into()));
        }
        if self.item_universe == 0 {
            return Err(TrainError::Config("item universe must be non-empty".into()));
        }
        if !(self.tau > 0.0) {
            return Err(TrainError::Config(format!(
                "tau must be positive, got {}",
                self.tau
            )));
        }
        Ok(())
    }
}

/// Held-out validation data: feature rows in candidate-list order plus the
/// flat label array.
///
/// The pair is typed, so the arity of validation inputs is fixed at compile
/// time; row/label count consistency is checked here.
#[derive(Debug, Clone)]
pub struct ValidationData {
    features: Tensor,
    labels: Vec<f32>,
}

impl ValidationData {
    /// Creates validation data from a `[rows, features]` tensor and one
    /// label per row.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Config`] when `features` is not 2-D or the row
    /// count does not match the label count.
    pub fn new(features: Tensor, labels: Vec<f32>) -> TrainResult<Self> {
        if features.ndim() != 2 {
            return Err(TrainError::Config(format!(
                "validation features must be 2-D, got shape {:?}",
                features.shape()
            )));
        }
        if features.shape()[0] != labels.len() {
            return Err(TrainError::Config(format!(
                "validation features have {} rows but {} labels",
                features.shape()[0],
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    /// The feature rows.
    pub fn features(&self) -> &Tensor {
        &self.features
    }

    /// The flat label array.
    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Number of validation rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if there are no validation rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TrainerConfig::new(1000);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.loss, LossKind::SmoothAucLambda);
        assert_eq!(config.metrics, vec![MetricKind::AucPersonal]);
        assert_eq!(config.divergence_floor, DEFAULT_DIVERGENCE_FLOOR);
        assert!(config.optimizer.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_effective_optimizer_defaults_to_adam() {
        let config = TrainerConfig::new(1000).with_learning_rate(0.05);
        let optimizer = config.effective_optimizer();
        assert_eq!(optimizer.name(), "Adam");
        assert!((optimizer.learning_rate() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let err = TrainerConfig::new(1000)
            .with_batch_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TrainError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_universe() {
        let err = TrainerConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, TrainError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_non_positive_tau() {
        let err = TrainerConfig::new(10).with_tau(0.0).validate().unwrap_err();
        assert!(matches!(err, TrainError::Config(_)));
    }

    #[test]
    fn test_config_serializes() {
        let config = TrainerConfig::new(500).with_epochs(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: TrainerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.item_universe, 500);
        assert_eq!(back.epochs, 3);
    }

    #[test]
    fn test_validation_data_checks_row_count() {
        let features = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let err = ValidationData::new(features, vec![1.0]).unwrap_err();
        assert!(matches!(err, TrainError::Config(_)));
    }

    #[test]
    fn test_validation_data_accessors() {
        let features = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let data = ValidationData::new(features, vec![1.0, 0.0]).unwrap();
        assert_eq!(data.len(), 2);
        assert!(!data.is_empty());
        assert_eq!(data.labels(), &[1.0, 0.0]);
        assert_eq!(data.features().shape(), &[2, 2]);
    }
}
