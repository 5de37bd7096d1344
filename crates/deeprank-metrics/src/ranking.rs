//! Ranking metrics over fixed-size candidate lists.
//!
//! Validation data arrives as a flat score array organized in contiguous
//! blocks of `1 + negatives_per_list` rows, one block per user context. The
//! relevant item is first in true-label order and each block contains exactly
//! one positive; both facts are checked before any metric is computed.
//!
//! Per block the evaluator computes personalized AUC, Recall@K and MAP@K at
//! a configurable cutoff set, MRR, and the full NDCG vector for cutoffs
//! `1..=K`; blocks are aggregated by arithmetic mean (elementwise for the
//! vector-valued metrics).

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Number of irrelevant candidates per evaluation list.
pub const DEFAULT_NEGATIVES_PER_LIST: usize = 100;

/// Cutoffs used for Recall@K and MAP@K.
pub const DEFAULT_CUTOFFS: [usize; 5] = [2, 4, 6, 8, 10];

/// Largest NDCG cutoff; the evaluator reports NDCG@1..=K.
pub const DEFAULT_NDCG_CUTOFF: usize = 10;

/// Arity of evaluation candidate lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateListLayout {
    negatives_per_list: usize,
}

impl Default for CandidateListLayout {
    fn default() -> Self {
        Self {
            negatives_per_list: DEFAULT_NEGATIVES_PER_LIST,
        }
    }
}

impl CandidateListLayout {
    /// Creates a layout with the given number of irrelevant candidates
    /// (at least one).
    pub fn new(negatives_per_list: usize) -> Self {
        Self {
            negatives_per_list: negatives_per_list.max(1),
        }
    }

    /// Irrelevant candidates per list.
    pub fn negatives_per_list(&self) -> usize {
        self.negatives_per_list
    }

    /// Total rows per list (one relevant plus the negatives).
    pub fn list_len(&self) -> usize {
        self.negatives_per_list + 1
    }
}

/// Aggregated ranking metrics over all candidate lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    /// Number of candidate lists evaluated.
    pub lists: usize,
    /// Mean personalized AUC.
    pub auc_personal: f64,
    /// Mean reciprocal rank of the relevant item.
    pub mrr: f64,
    /// Cutoffs the recall/MAP vectors are aligned with.
    pub cutoffs: Vec<usize>,
    /// Mean Recall@K per cutoff.
    pub recall_at: Vec<f64>,
    /// Mean MAP@K per cutoff.
    pub map_at: Vec<f64>,
    /// Mean NDCG@k for every k in `1..=ndcg_cutoff`.
    pub ndcg: Vec<f64>,
}

/// Evaluator for flat score arrays organized in candidate-list blocks.
///
/// # Example
///
/// ```
/// use deeprank_metrics::ranking::{CandidateListLayout, RankingEvaluator};
///
/// // Two-negative lists to keep the example small.
/// let evaluator = RankingEvaluator::new(CandidateListLayout::new(2));
/// let labels = vec![1.0, 0.0, 0.0];
/// let scores = vec![0.9, 0.2, 0.1];
/// let report = evaluator.evaluate(&scores, &labels).unwrap();
/// assert_eq!(report.auc_personal, 1.0);
/// assert_eq!(report.mrr, 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEvaluator {
    layout: CandidateListLayout,
    cutoffs: Vec<usize>,
    ndcg_cutoff: usize,
}

impl Default for RankingEvaluator {
    fn default() -> Self {
        Self {
            layout: CandidateListLayout::default(),
            cutoffs: DEFAULT_CUTOFFS.to_vec(),
            ndcg_cutoff: DEFAULT_NDCG_CUTOFF,
        }
    }
}

impl RankingEvaluator {
    /// Creates an evaluator with the default cutoffs for a custom layout.
    pub fn new(layout: CandidateListLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Overrides the Recall/MAP cutoff set.
    pub fn with_cutoffs(mut self, cutoffs: Vec<usize>) -> Self {
        self.cutoffs = cutoffs;
        self
    }

    /// Overrides the largest NDCG cutoff.
    pub fn with_ndcg_cutoff(mut self, ndcg_cutoff: usize) -> Self {
        self.ndcg_cutoff = ndcg_cutoff.max(1);
        self
    }

    /// The configured candidate-list layout.
    pub fn layout(&self) -> CandidateListLayout {
        self.layout
    }

    /// Checks the label layout invariant over every block.
    ///
    /// # Errors
    ///
    /// [`EvalError::Shape`] if `labels` is empty or not a multiple of the
    /// list length; [`EvalError::LabelLayout`] if any block lacks a leading
    /// relevant item or contains more than one positive.
    pub fn validate_labels(&self, labels: &[f32]) -> EvalResult<()> {
        let list_len = self.layout.list_len();
        if labels.is_empty() || labels.len() % list_len != 0 {
            return Err(EvalError::Shape {
                message: format!(
                    "label array of length {} is not a positive multiple of the list length {}",
                    labels.len(),
                    list_len
                ),
            });
        }
        for (block, chunk) in labels.chunks(list_len).enumerate() {
            if chunk[0] != 1.0 {
                return Err(EvalError::LabelLayout {
                    block,
                    message: format!("expected label 1 at position 0, got {}", chunk[0]),
                });
            }
            let positives: f32 = chunk.iter().sum();
            if positives != 1.0 {
                return Err(EvalError::LabelLayout {
                    block,
                    message: format!("expected exactly one positive, got {}", positives),
                });
            }
        }
        Ok(())
    }

    /// Evaluates all ranking metrics over the candidate lists.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::validate_labels`] failures and returns
    /// [`EvalError::Shape`] when scores and labels differ in length.
    pub fn evaluate(&self, scores: &[f32], labels: &[f32]) -> EvalResult<RankingReport> {
        if scores.len() != labels.len() {
            return Err(EvalError::Shape {
                message: format!(
                    "scores ({}) and labels ({}) differ in length",
                    scores.len(),
                    labels.len()
                ),
            });
        }
        self.validate_labels(labels)?;

        let list_len = self.layout.list_len();
        let blocks = labels.len() / list_len;
        let mut auc_sum = 0.0;
        let mut mrr_sum = 0.0;
        let mut recall_sum = vec![0.0; self.cutoffs.len()];
        let mut map_sum = vec![0.0; self.cutoffs.len()];
        let mut ndcg_sum = vec![0.0; self.ndcg_cutoff];

        for block in 0..blocks {
            let range = block * list_len..(block + 1) * list_len;
            let block_scores = &scores[range.clone()];
            let block_labels = &labels[range];

            auc_sum += personalized_auc(block_scores);
            let (recall, map, mrr) = recall_map_mrr(block_labels, block_scores, &self.cutoffs);
            mrr_sum += mrr;
            for (acc, v) in recall_sum.iter_mut().zip(recall) {
                *acc += v;
            }
            for (acc, v) in map_sum.iter_mut().zip(map) {
                *acc += v;
            }
            for (acc, v) in ndcg_sum
                .iter_mut()
                .zip(ndcg_vector(block_labels, block_scores, self.ndcg_cutoff))
            {
                *acc += v;
            }
        }

        let n = blocks as f64;
        Ok(RankingReport {
            lists: blocks,
            auc_personal: auc_sum / n,
            mrr: mrr_sum / n,
            cutoffs: self.cutoffs.clone(),
            recall_at: recall_sum.into_iter().map(|v| v / n).collect(),
            map_at: map_sum.into_iter().map(|v| v / n).collect(),
            ndcg: ndcg_sum.into_iter().map(|v| v / n).collect(),
        })
    }
}

/// Indices of `values` sorted by value descending (stable).
fn argsort_descending(values: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// Fraction of irrelevant items scored strictly below the relevant item.
///
/// The relevant item is the first entry of the block; ties do not count as
/// wins.
pub fn personalized_auc(block_scores: &[f32]) -> f64 {
    let relevant = block_scores[0];
    let negatives = &block_scores[1..];
    let below = negatives.iter().filter(|&&s| s < relevant).count();
    below as f64 / negatives.len() as f64
}

/// Computes Recall@K and AP@K for each cutoff, plus MRR, for one list.
///
/// Labels are reordered by predicted score descending; MRR is the maximum of
/// `label[r] / (r + 1)` over ranks, AP@K averages cumulative precision over
/// the positive positions inside the cutoff (0 when the cutoff truncates all
/// positives away), and each cutoff is clamped to the list length.
pub fn recall_map_mrr(
    labels: &[f32],
    scores: &[f32],
    cutoffs: &[usize],
) -> (Vec<f64>, Vec<f64>, f64) {
    let order = argsort_descending(scores);
    let true_rank: Vec<f64> = order.iter().map(|&i| labels[i] as f64).collect();

    let mrr = true_rank
        .iter()
        .enumerate()
        .map(|(r, &label)| label / (r + 1) as f64)
        .fold(0.0f64, f64::max);
    let total_positives: f64 = true_rank.iter().sum();

    let mut recall = Vec::with_capacity(cutoffs.len());
    let mut map = Vec::with_capacity(cutoffs.len());
    for &k in cutoffs {
        let cut = k.min(true_rank.len());
        let hits: f64 = true_rank[..cut].iter().sum();
        recall.push(if total_positives > 0.0 {
            hits / total_positives
        } else {
            0.0
        });

        let mut cumulative = 0.0;
        let mut precision_sum = 0.0;
        let mut positive_positions = 0usize;
        for (r, &label) in true_rank[..cut].iter().enumerate() {
            cumulative += label;
            if label > 0.0 {
                precision_sum += label * cumulative / (r + 1) as f64;
                positive_positions += 1;
            }
        }
        map.push(if positive_positions > 0 {
            precision_sum / positive_positions as f64
        } else {
            0.0
        });
    }
    (recall, map, mrr)
}

/// NDCG@k for every k in `1..=max_cutoff` for one list.
///
/// Gain is `2^label - 1`, discount `log2(rank + 2)`, and each entry is
/// normalized by the ideal DCG of the label-sorted ordering. Cutoffs beyond
/// the list length clamp to the list length.
pub fn ndcg_vector(labels: &[f32], scores: &[f32], max_cutoff: usize) -> Vec<f64> {
    let gains_in = |order: &[usize]| -> Vec<f64> {
        order
            .iter()
            .take(max_cutoff.min(labels.len()))
            .enumerate()
            .map(|(r, &i)| ((2.0f64).powf(labels[i] as f64) - 1.0) / ((r + 2) as f64).log2())
            .collect()
    };

    let dcg_terms = gains_in(&argsort_descending(scores));
    let idcg_terms = gains_in(&argsort_descending(labels));

    let prefix = |terms: &[f64], k: usize| -> f64 { terms.iter().take(k).sum() };
    (1..=max_cutoff)
        .map(|k| {
            let cut = k.min(labels.len());
            let idcg = prefix(&idcg_terms, cut);
            if idcg > 0.0 {
                prefix(&dcg_terms, cut) / idcg
            } else {
                0.0
            }
        })
        .collect()
}
