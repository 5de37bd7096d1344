//! Append-only regularization registry.
//!
//! Regularization terms are registered while the model is being assembled:
//! each entry names a set of parameter-tensor indices and the L1/L2
//! coefficients that apply to them. Once training starts the registry is
//! frozen and consumed read-only on every step, both for the penalty scalar
//! added to the loss and for the gradient contribution added to the
//! accumulated parameter gradients.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::scorer::Scorer;

/// One registered regularization term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularizationEntry {
    /// Parameter-tensor indices the coefficients apply to.
    pub parameters: Vec<usize>,
    /// L1 coefficient.
    pub l1: f32,
    /// L2 coefficient.
    pub l2: f32,
}

/// Ordered, append-only collection of regularization terms.
///
/// # Example
///
/// ```
/// use deeprank_model::registry::RegularizationRegistry;
///
/// let mut registry = RegularizationRegistry::new();
/// registry.add(vec![0, 1], 0.0, 1e-5).unwrap();
/// registry.freeze();
/// assert!(registry.add(vec![2], 0.0, 1e-5).is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegularizationRegistry {
    entries: Vec<RegularizationEntry>,
    frozen: bool,
}

impl RegularizationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a regularization term.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] once the registry has been frozen.
    pub fn add(&mut self, parameters: Vec<usize>, l1: f32, l2: f32) -> ModelResult<()> {
        if self.frozen {
            return Err(ModelError::Config {
                message: "regularization registry is frozen; terms must be added before training"
                    .into(),
            });
        }
        self.entries.push(RegularizationEntry { parameters, l1, l2 });
        Ok(())
    }

    /// Marks the registry read-only. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the registry has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The registered terms, in insertion order.
    pub fn entries(&self) -> &[RegularizationEntry] {
        &self.entries
    }

    /// Computes the total regularization penalty over the scorer's
    /// parameters: `sum(l1 * |w|) + sum(l2 * w^2)` per entry.
    ///
    /// A registry with no entries (or entries referencing no parameters)
    /// contributes exactly 0.
    pub fn penalty(&self, scorer: &dyn Scorer) -> f32 {
        let mut total = 0.0f32;
        scorer.for_each_parameter(&mut |index, values| {
            for entry in &self.entries {
                if !entry.parameters.contains(&index) {
                    continue;
                }
                if entry.l1 > 0.0 {
                    total += entry.l1 * values.iter().map(|w| w.abs()).sum::<f32>();
                }
                if entry.l2 > 0.0 {
                    total += entry.l2 * values.iter().map(|w| w * w).sum::<f32>();
                }
            }
        });
        total
    }

    /// Adds the regularization gradient (`l1 * sign(w) + 2 * l2 * w`) to the
    /// scorer's accumulated gradients.
    pub fn accumulate_gradients(&self, scorer: &mut dyn Scorer) {
        scorer.for_each_parameter_mut(&mut |index, values, grads| {
            for entry in &self.entries {
                if !entry.parameters.contains(&index) {
                    continue;
                }
                for (w, g) in values.iter().zip(grads.iter_mut()) {
                    if entry.l1 > 0.0 {
                        *g += entry.l1 * w.signum();
                    }
                    if entry.l2 > 0.0 {
                        *g += 2.0 * entry.l2 * w;
                    }
                }
            }
        });
    }
}
