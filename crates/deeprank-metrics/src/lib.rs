//! Ranking and classification metrics for deeprank.
//!
//! The centerpiece is [`ranking::RankingEvaluator`], which consumes a flat
//! score array organized as contiguous fixed-size candidate lists (one
//! relevant item followed by a fixed number of sampled negatives per user
//! context) and reports personalized AUC, Recall@K, MAP@K, MRR and the NDCG
//! vector, averaged over lists. [`binary`] holds the global
//! binary-classification metrics behind the trainer's metric dictionary.
//!
//! # Example
//!
//! ```
//! use deeprank_metrics::RankingEvaluator;
//!
//! let evaluator = RankingEvaluator::default();
//! let mut scores = vec![0.9];
//! scores.extend(std::iter::repeat(0.1).take(100));
//! let mut labels = vec![1.0];
//! labels.extend(std::iter::repeat(0.0).take(100));
//!
//! let report = evaluator.evaluate(&scores, &labels).unwrap();
//! assert_eq!(report.auc_personal, 1.0);
//! ```

#![warn(missing_docs)]

pub mod binary;
pub mod error;
pub mod ranking;

pub use error::{EvalError, EvalResult};
pub use ranking::{
    CandidateListLayout, RankingEvaluator, RankingReport, DEFAULT_CUTOFFS,
    DEFAULT_NDCG_CUTOFF, DEFAULT_NEGATIVES_PER_LIST,
};
