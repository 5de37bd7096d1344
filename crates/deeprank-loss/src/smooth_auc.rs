//! Rank-weighted smooth-AUC pairwise loss.
//!
//! For one user, the loss compares every positive score against every
//! negative score. Each residual `pos_i - neg_j` is squashed through a
//! logistic at temperature `tau` into a smooth indicator of "positive ranked
//! above negative", then weighted by the rank-distance matrix from
//! [`crate::rank::rank_weights`]. Three scalars come out of a single forward
//! pass:
//!
//! - `weighted_mean`: `1 - mean(S * W)`, the primary surrogate,
//! - `weighted_sum`: `-sum(S * W)`, the form used for the gradient step,
//! - `smooth_auc`: `1 - sum(S) / (P * Q)`, an unweighted diagnostic.
//!
//! Gradients flow through the logistic term only; the rank weights are
//! treated as fixed per-step importance values.

use serde::{Deserialize, Serialize};

use crate::error::LossResult;
use crate::rank::rank_weights;

/// Default logistic temperature.
pub const DEFAULT_TAU: f32 = 0.02;

/// The three scalar outputs of one pairwise loss evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseLossTerms {
    /// `1 - mean(S * W)`; bounded in `[0, 2]`.
    pub weighted_mean: f32,
    /// `-sum(S * W)`; the differentiable term the trainer steps on.
    pub weighted_sum: f32,
    /// `1 - sum(S) / (P * Q)`; unweighted smooth AUC, diagnostic only.
    pub smooth_auc: f32,
}

/// Gradients of the `weighted_sum` term with respect to the score vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseLossGrad {
    /// `d(weighted_sum) / d(positive scores)`, length P.
    pub wrt_positive: Vec<f32>,
    /// `d(weighted_sum) / d(negative scores)`, length Q.
    pub wrt_negative: Vec<f32>,
}

/// Rank-weighted smooth-AUC loss at a fixed temperature.
///
/// # Example
///
/// ```
/// use deeprank_loss::smooth_auc::SmoothAucLoss;
///
/// let loss = SmoothAucLoss::default();
/// let terms = loss.forward(&[0.9, 0.8], &[0.1, 0.2, 0.3]).unwrap();
/// // Positives clearly beat negatives, so the diagnostic is near zero.
/// assert!(terms.smooth_auc < 0.05);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothAucLoss {
    tau: f32,
}

impl Default for SmoothAucLoss {
    fn default() -> Self {
        Self { tau: DEFAULT_TAU }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl SmoothAucLoss {
    /// Creates a loss with the given logistic temperature.
    ///
    /// Smaller `tau` sharpens the logistic toward a hard indicator.
    pub fn new(tau: f32) -> Self {
        Self { tau }
    }

    /// Returns the configured temperature.
    pub fn tau(&self) -> f32 {
        self.tau
    }

    /// Evaluates the loss for one user's positive/negative score vectors.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LossError::Shape`] if either side is empty.
    pub fn forward(&self, positive: &[f32], negative: &[f32]) -> LossResult<PairwiseLossTerms> {
        let (terms, _) = self.forward_inner(positive, negative, false)?;
        Ok(terms)
    }

    /// Evaluates the loss and the analytic gradients of the `weighted_sum`
    /// term with respect to both score vectors.
    ///
    /// The rank-distance weights are held fixed during differentiation, so
    /// the gradients are exact wherever a small perturbation does not change
    /// the pool ranking.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LossError::Shape`] if either side is empty.
    pub fn forward_with_grad(
        &self,
        positive: &[f32],
        negative: &[f32],
    ) -> LossResult<(PairwiseLossTerms, PairwiseLossGrad)> {
        let (terms, grad) = self.forward_inner(positive, negative, true)?;
        Ok((terms, grad.expect("gradient requested")))
    }

    fn forward_inner(
        &self,
        positive: &[f32],
        negative: &[f32],
        with_grad: bool,
    ) -> LossResult<(PairwiseLossTerms, Option<PairwiseLossGrad>)> {
        let weights = rank_weights(positive, negative)?;
        let p = positive.len();
        let q = negative.len();
        let pairs = (p * q) as f32;

        let mut sum_s = 0.0f32;
        let mut sum_sw = 0.0f32;
        let mut grad_pos = vec![0.0f32; if with_grad { p } else { 0 }];
        let mut grad_neg = vec![0.0f32; if with_grad { q } else { 0 }];

        for (i, &pos) in positive.iter().enumerate() {
            for (j, &neg) in negative.iter().enumerate() {
                let s = sigmoid((pos - neg) / self.tau);
                let w = weights.get(i, j);
                sum_s += s;
                sum_sw += s * w;
                if with_grad {
                    // d(-sum(S*W))/d(pos_i) = -w * s * (1 - s) / tau
                    let d = w * s * (1.0 - s) / self.tau;
                    grad_pos[i] -= d;
                    grad_neg[j] += d;
                }
            }
        }

        let terms = PairwiseLossTerms {
            weighted_mean: 1.0 - sum_sw / pairs,
            weighted_sum: -sum_sw,
            smooth_auc: 1.0 - sum_s / pairs,
        };
        let grad = with_grad.then_some(PairwiseLossGrad {
            wrt_positive: grad_pos,
            wrt_negative: grad_neg,
        });
        Ok((terms, grad))
    }
}
