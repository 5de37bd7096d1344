//! Closed enumerations for loss and metric selection.
//!
//! Configuration strings are parsed into these tags when the trainer is
//! configured; unknown names are rejected there, never at first use inside
//! the loop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrainError;
use deeprank_metrics::binary;
use deeprank_metrics::EvalResult;

/// Supported training losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    /// Rank-weighted pairwise smooth-AUC loss.
    SmoothAucLambda,
    /// Pointwise binary cross-entropy.
    BinaryCrossentropy,
    /// Pointwise mean squared error.
    MeanSquaredError,
    /// Pointwise mean absolute error.
    MeanAbsoluteError,
}

impl LossKind {
    /// Canonical configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LossKind::SmoothAucLambda => "smooth_auc_loss_lambda",
            LossKind::BinaryCrossentropy => "binary_crossentropy",
            LossKind::MeanSquaredError => "mse",
            LossKind::MeanAbsoluteError => "mae",
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LossKind {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smooth_auc_loss_lambda" => Ok(LossKind::SmoothAucLambda),
            "binary_crossentropy" => Ok(LossKind::BinaryCrossentropy),
            "mse" => Ok(LossKind::MeanSquaredError),
            "mae" => Ok(LossKind::MeanAbsoluteError),
            other => Err(TrainError::UnknownLoss(other.to_string())),
        }
    }
}

/// Supported validation metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    /// Per-candidate-list AUC, computed by the ranking evaluator.
    AucPersonal,
    /// Global ROC AUC over the flat validation scores.
    Auc,
    /// Binary cross-entropy (log-loss).
    LogLoss,
    /// Accuracy at the 0.5 threshold.
    Accuracy,
    /// Mean squared error.
    MeanSquaredError,
}

impl MetricKind {
    /// Canonical metric-dictionary key.
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::AucPersonal => "auc_personal",
            MetricKind::Auc => "auc",
            MetricKind::LogLoss => "binary_crossentropy",
            MetricKind::Accuracy => "accuracy",
            MetricKind::MeanSquaredError => "mse",
        }
    }

    /// Evaluates the metric over flat label/score arrays.
    ///
    /// Returns `None` for [`MetricKind::AucPersonal`], which is owned by the
    /// ranking evaluator rather than computed globally.
    pub fn evaluate_binary(&self, labels: &[f32], scores: &[f32]) -> Option<EvalResult<f64>> {
        match self {
            MetricKind::AucPersonal => None,
            MetricKind::Auc => Some(binary::roc_auc_score(labels, scores)),
            MetricKind::LogLoss => Some(binary::log_loss(labels, scores)),
            MetricKind::Accuracy => Some(binary::accuracy_score(labels, scores)),
            MetricKind::MeanSquaredError => Some(binary::mean_squared_error(labels, scores)),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MetricKind {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auc_personal" => Ok(MetricKind::AucPersonal),
            "auc" => Ok(MetricKind::Auc),
            "binary_crossentropy" | "logloss" => Ok(MetricKind::LogLoss),
            "accuracy" | "acc" => Ok(MetricKind::Accuracy),
            "mse" => Ok(MetricKind::MeanSquaredError),
            other => Err(TrainError::UnknownMetric(other.to_string())),
        }
    }
}
