//! Linear scorer over sparse and dense feature columns.
//!
//! Each sparse column owns a vocabulary-sized table of 1-dimensional
//! embeddings (per-identifier weights); each dense column owns a single
//! weight. A row's score is the sum of its looked-up sparse weights, its
//! weighted dense values and a bias — the linear term of a CTR model, which
//! is enough to learn the ranking signal in tests and demos; deeper scorers
//! plug in through the same [`Scorer`] trait.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::registry::RegularizationRegistry;
use crate::scorer::Scorer;
use crate::tensor::Tensor;

/// Default standard deviation for weight initialization.
pub const DEFAULT_INIT_STD: f32 = 1e-4;

/// How a feature column is interpreted by the linear scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Categorical identifier in `[0, vocabulary)`; looked up in a
    /// per-column weight table.
    Sparse {
        /// Number of distinct identifiers.
        vocabulary: usize,
    },
    /// Real-valued feature multiplied by a single learned weight.
    Dense,
}

/// Builder-style configuration for [`LinearScorer`].
///
/// # Example
///
/// ```
/// use deeprank_model::linear::LinearScorerConfig;
/// use deeprank_model::scorer::Scorer;
///
/// let scorer = LinearScorerConfig::new()
///     .sparse_column("user_id", 100)
///     .sparse_column("item_id", 500)
///     .dense_column("hour")
///     .with_seed(1024)
///     .build()
///     .unwrap();
/// assert_eq!(scorer.parameter_count(), 4); // 3 columns + bias
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearScorerConfig {
    columns: Vec<(String, ColumnKind)>,
    init_std: f32,
    seed: u64,
}

impl Default for LinearScorerConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            init_std: DEFAULT_INIT_STD,
            seed: 1024,
        }
    }
}

impl LinearScorerConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sparse column with the given vocabulary size.
    pub fn sparse_column(mut self, name: impl Into<String>, vocabulary: usize) -> Self {
        self.columns
            .push((name.into(), ColumnKind::Sparse { vocabulary }));
        self
    }

    /// Appends a dense column.
    pub fn dense_column(mut self, name: impl Into<String>) -> Self {
        self.columns.push((name.into(), ColumnKind::Dense));
        self
    }

    /// Overrides the weight initialization standard deviation.
    pub fn with_init_std(mut self, init_std: f32) -> Self {
        self.init_std = init_std;
        self
    }

    /// Overrides the initialization seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the scorer.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] when no columns are configured or a
    /// sparse column has an empty vocabulary.
    pub fn build(self) -> ModelResult<LinearScorer> {
        if self.columns.is_empty() {
            return Err(ModelError::Config {
                message: "linear scorer needs at least one feature column".into(),
            });
        }
        let mut tables = Vec::with_capacity(self.columns.len());
        for (i, (name, kind)) in self.columns.iter().enumerate() {
            let len = match kind {
                ColumnKind::Sparse { vocabulary } => {
                    if *vocabulary == 0 {
                        return Err(ModelError::Config {
                            message: format!("sparse column '{}' has an empty vocabulary", name),
                        });
                    }
                    *vocabulary
                }
                ColumnKind::Dense => 1,
            };
            tables.push(Tensor::randn(
                &[len],
                0.0,
                self.init_std,
                self.seed.wrapping_add(i as u64),
            ));
        }
        let grads = tables.iter().map(|t| Tensor::zeros(t.shape())).collect();
        Ok(LinearScorer {
            columns: self.columns,
            tables,
            grads,
            bias: Tensor::zeros(&[1]),
            bias_grad: Tensor::zeros(&[1]),
        })
    }
}

/// Linear model over per-column weights plus a bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearScorer {
    columns: Vec<(String, ColumnKind)>,
    tables: Vec<Tensor>,
    grads: Vec<Tensor>,
    bias: Tensor,
    bias_grad: Tensor,
}

impl LinearScorer {
    /// Column names and kinds, in input order.
    pub fn columns(&self) -> &[(String, ColumnKind)] {
        &self.columns
    }

    /// Parameter indices of the sparse columns' weight tables.
    pub fn sparse_parameter_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, (_, kind))| matches!(kind, ColumnKind::Sparse { .. }))
            .map(|(i, _)| i)
            .collect()
    }

    /// Parameter indices of the dense columns' weights.
    pub fn dense_parameter_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, (_, kind))| matches!(kind, ColumnKind::Dense))
            .map(|(i, _)| i)
            .collect()
    }

    /// Parameter index of the bias.
    pub fn bias_parameter_index(&self) -> usize {
        self.columns.len()
    }

    /// Builds the standard regularization registry for this scorer: one L2
    /// entry over the sparse weight tables and one over the dense weights.
    /// The bias is not regularized.
    pub fn build_registry(&self, l2_embedding: f32, l2_linear: f32) -> RegularizationRegistry {
        let mut registry = RegularizationRegistry::new();
        registry
            .add(self.sparse_parameter_indices(), 0.0, l2_embedding)
            .expect("fresh registry is not frozen");
        registry
            .add(self.dense_parameter_indices(), 0.0, l2_linear)
            .expect("fresh registry is not frozen");
        registry
    }

    fn check_width(&self, rows: &Tensor) -> ModelResult<()> {
        if rows.ndim() != 2 || rows.shape()[1] != self.columns.len() {
            return Err(ModelError::Shape {
                message: format!(
                    "expected a [rows, {}] batch, got shape {:?}",
                    self.columns.len(),
                    rows.shape()
                ),
            });
        }
        Ok(())
    }

    fn sparse_index(&self, column: usize, value: f32, vocabulary: usize) -> ModelResult<usize> {
        let id = value as i64;
        if id < 0 || id as usize >= vocabulary {
            return Err(ModelError::Shape {
                message: format!(
                    "identifier {} out of vocabulary [0, {}) in column '{}'",
                    id, vocabulary, self.columns[column].0
                ),
            });
        }
        Ok(id as usize)
    }
}

impl Scorer for LinearScorer {
    fn score(&self, rows: &Tensor) -> ModelResult<Vec<f32>> {
        self.check_width(rows)?;
        let mut scores = Vec::with_capacity(rows.shape()[0]);
        for r in 0..rows.shape()[0] {
            let row = rows.row(r);
            let mut score = self.bias.data()[0];
            for (c, (_, kind)) in self.columns.iter().enumerate() {
                match kind {
                    ColumnKind::Sparse { vocabulary } => {
                        let id = self.sparse_index(c, row[c], *vocabulary)?;
                        score += self.tables[c].data()[id];
                    }
                    ColumnKind::Dense => {
                        score += self.tables[c].data()[0] * row[c];
                    }
                }
            }
            scores.push(score);
        }
        Ok(scores)
    }

    fn backward(&mut self, rows: &Tensor, grad_wrt_scores: &[f32]) -> ModelResult<()> {
        self.check_width(rows)?;
        if grad_wrt_scores.len() != rows.shape()[0] {
            return Err(ModelError::Shape {
                message: format!(
                    "gradient has {} entries for a batch of {} rows",
                    grad_wrt_scores.len(),
                    rows.shape()[0]
                ),
            });
        }
        for (r, &g) in grad_wrt_scores.iter().enumerate() {
            let row = rows.row(r);
            for c in 0..self.columns.len() {
                match self.columns[c].1 {
                    ColumnKind::Sparse { vocabulary } => {
                        let id = self.sparse_index(c, row[c], vocabulary)?;
                        self.grads[c].data_mut()[id] += g;
                    }
                    ColumnKind::Dense => {
                        self.grads[c].data_mut()[0] += g * row[c];
                    }
                }
            }
            self.bias_grad.data_mut()[0] += g;
        }
        Ok(())
    }

    fn zero_gradients(&mut self) {
        for grad in &mut self.grads {
            grad.fill_zero();
        }
        self.bias_grad.fill_zero();
    }

    fn parameter_count(&self) -> usize {
        self.columns.len() + 1
    }

    fn for_each_parameter(&self, visit: &mut dyn FnMut(usize, &[f32])) {
        for (i, table) in self.tables.iter().enumerate() {
            visit(i, table.data());
        }
        visit(self.columns.len(), self.bias.data());
    }

    fn for_each_parameter_mut(&mut self, visit: &mut dyn FnMut(usize, &mut [f32], &mut [f32])) {
        for (i, (table, grad)) in self.tables.iter_mut().zip(&mut self.grads).enumerate() {
            visit(i, table.data_mut(), grad.data_mut());
        }
        visit(
            self.columns.len(),
            self.bias.data_mut(),
            self.bias_grad.data_mut(),
        );
    }
}
