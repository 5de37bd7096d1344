//! The scorer seam between the training loop and the scoring model.
//!
//! A [`Scorer`] maps a batch of numeric feature rows to one scalar score per
//! row and can push a gradient with respect to those scores back into its
//! parameters. The trait deliberately exposes parameters through indexed
//! visitation rather than references, so trainers can pair each parameter
//! tensor with its own optimizer state and capture snapshots without knowing
//! the model's structure.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::tensor::Tensor;

/// A value-level copy of every parameter tensor of a scorer.
///
/// Snapshots back the best-checkpoint record: the trainer captures one
/// whenever a new validation best is reached and can restore or persist it
/// later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    tensors: Vec<Vec<f32>>,
}

impl ParameterSnapshot {
    /// Creates a snapshot from raw tensors.
    pub fn new(tensors: Vec<Vec<f32>>) -> Self {
        Self { tensors }
    }

    /// The captured tensors, in parameter-index order.
    pub fn tensors(&self) -> &[Vec<f32>] {
        &self.tensors
    }

    /// Number of captured tensors.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// True if the snapshot holds no tensors.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

/// A differentiable scoring function over numeric feature rows.
///
/// Implementations accumulate parameter gradients across [`Scorer::backward`]
/// calls until [`Scorer::zero_gradients`] resets them, which lets the trainer
/// sum gradient contributions from several forward passes (positives and
/// negatives of every user in a batch) before a single optimizer step.
pub trait Scorer: Send {
    /// Scores each row of a `[rows, features]` batch.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] if the batch width does not match the
    /// model.
    fn score(&self, rows: &Tensor) -> ModelResult<Vec<f32>>;

    /// Accumulates parameter gradients for a scored batch.
    ///
    /// `grad_wrt_scores` holds the loss gradient for each row of `rows`, in
    /// the same order [`Scorer::score`] produced the scores.
    fn backward(&mut self, rows: &Tensor, grad_wrt_scores: &[f32]) -> ModelResult<()>;

    /// Clears all accumulated gradients.
    fn zero_gradients(&mut self);

    /// Number of parameter tensors.
    fn parameter_count(&self) -> usize;

    /// Visits every parameter tensor as `(index, values)`.
    fn for_each_parameter(&self, visit: &mut dyn FnMut(usize, &[f32]));

    /// Visits every parameter tensor as `(index, values, gradients)` with
    /// mutable access to both.
    fn for_each_parameter_mut(&mut self, visit: &mut dyn FnMut(usize, &mut [f32], &mut [f32]));

    /// Captures a value-level copy of all parameters.
    fn snapshot(&self) -> ParameterSnapshot {
        let mut tensors = vec![Vec::new(); self.parameter_count()];
        self.for_each_parameter(&mut |index, values| {
            tensors[index] = values.to_vec();
        });
        ParameterSnapshot::new(tensors)
    }

    /// Restores parameters from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] if the snapshot's tensor count or any
    /// tensor length does not match the model.
    fn restore(&mut self, snapshot: &ParameterSnapshot) -> ModelResult<()> {
        if snapshot.len() != self.parameter_count() {
            return Err(ModelError::Shape {
                message: format!(
                    "snapshot holds {} tensors, model has {}",
                    snapshot.len(),
                    self.parameter_count()
                ),
            });
        }
        let mut mismatch: Option<(usize, usize, usize)> = None;
        self.for_each_parameter_mut(&mut |index, values, _| {
            let source = &snapshot.tensors()[index];
            if source.len() != values.len() {
                mismatch.get_or_insert((index, values.len(), source.len()));
            } else {
                values.copy_from_slice(source);
            }
        });
        if let Some((index, expected, actual)) = mismatch {
            return Err(ModelError::Shape {
                message: format!(
                    "snapshot tensor {} has length {}, model expects {}",
                    index, actual, expected
                ),
            });
        }
        Ok(())
    }
}
