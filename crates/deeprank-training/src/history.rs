//! Per-epoch training history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use deeprank_metrics::RankingReport;

/// Everything recorded about one training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Zero-based epoch index.
    pub epoch: usize,
    /// Mean per-step total loss (pairwise sum form + regularization +
    /// auxiliary scalar).
    pub total_loss: f64,
    /// Mean per-step weighted-mean pairwise loss.
    pub pairwise_loss: f64,
    /// Mean per-step unweighted smooth-AUC diagnostic.
    pub smooth_auc_loss: f64,
    /// Ranking metrics on the held-out candidate lists.
    pub validation: RankingReport,
    /// Selected scalar validation metrics, keyed by metric name
    /// (always contains `auc_personal`).
    pub val_metrics: BTreeMap<String, f64>,
    /// Wall-clock seconds spent in the epoch.
    pub seconds: f64,
}

/// Ordered record of completed epochs, returned from `fit_ranking`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    epochs: Vec<EpochRecord>,
}

impl TrainingHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an epoch record.
    pub fn push(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    /// All completed epochs, oldest first.
    pub fn epochs(&self) -> &[EpochRecord] {
        &self.epochs
    }

    /// Number of completed epochs.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// True if no epoch has completed.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// The most recent epoch record.
    pub fn last(&self) -> Option<&EpochRecord> {
        self.epochs.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: usize, auc: f64) -> EpochRecord {
        let mut val_metrics = BTreeMap::new();
        val_metrics.insert("auc_personal".to_string(), auc);
        EpochRecord {
            epoch,
            total_loss: 1.0,
            pairwise_loss: 0.5,
            smooth_auc_loss: 0.4,
            validation: RankingReport {
                lists: 1,
                auc_personal: auc,
                mrr: auc,
                cutoffs: vec![2],
                recall_at: vec![auc],
                map_at: vec![auc],
                ndcg: vec![auc],
            },
            val_metrics,
            seconds: 0.01,
        }
    }

    #[test]
    fn test_history_push_and_last() {
        let mut history = TrainingHistory::new();
        assert!(history.is_empty());
        history.push(record(0, 0.5));
        history.push(record(1, 0.7));
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().epoch, 1);
        assert_eq!(history.epochs()[0].epoch, 0);
    }

    #[test]
    fn test_history_serializes() {
        let mut history = TrainingHistory::new();
        history.push(record(0, 0.6));
        let json = serde_json::to_string(&history).unwrap();
        let back: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.last().unwrap().val_metrics["auc_personal"], 0.6);
    }
}
