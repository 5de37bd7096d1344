//! Epoch hooks for customizing the training loop.
//!
//! Hooks run around every epoch and can stop training early; the trainer
//! checks their verdict together with the divergence floor after the
//! best-checkpoint update.

use thiserror::Error;
use tracing::info;

use crate::history::{EpochRecord, TrainingHistory};

/// Errors that can occur during hook execution.
#[derive(Debug, Error)]
pub enum HookError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A custom hook error.
    #[error("hook error: {0}")]
    Custom(String),
}

/// Result type for hook operations.
pub type HookResult<T> = Result<T, HookError>;

/// Action to take after a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Continue training normally.
    Continue,
    /// Stop training early.
    Stop,
}

/// Trait for epoch hooks.
///
/// # Examples
///
/// ```
/// use deeprank_training::hooks::{Hook, HookAction, HookResult};
/// use deeprank_training::history::EpochRecord;
///
/// struct PrintHook;
///
/// impl Hook for PrintHook {
///     fn name(&self) -> &str {
///         "print_hook"
///     }
///
///     fn after_epoch(&mut self, epoch: usize, record: &EpochRecord) -> HookResult<HookAction> {
///         println!("epoch {}: val auc {}", epoch, record.validation.auc_personal);
///         Ok(HookAction::Continue)
///     }
/// }
/// ```
pub trait Hook: Send {
    /// Returns the name of this hook for logging purposes.
    fn name(&self) -> &str;

    /// Called before each epoch.
    fn before_epoch(&mut self, _epoch: usize) -> HookResult<()> {
        Ok(())
    }

    /// Called after each epoch with the epoch's record.
    ///
    /// Returning [`HookAction::Stop`] ends training after this epoch.
    fn after_epoch(&mut self, _epoch: usize, _record: &EpochRecord) -> HookResult<HookAction> {
        Ok(HookAction::Continue)
    }

    /// Called once when training ends.
    fn end(&mut self, _history: &TrainingHistory) -> HookResult<()> {
        Ok(())
    }
}

/// Logs epoch metrics at a fixed epoch interval.
#[derive(Debug)]
pub struct EpochLoggingHook {
    every_n_epochs: usize,
}

impl EpochLoggingHook {
    /// Creates a hook that logs every `every_n_epochs` epochs.
    pub fn new(every_n_epochs: usize) -> Self {
        Self {
            every_n_epochs: every_n_epochs.max(1),
        }
    }
}

impl Hook for EpochLoggingHook {
    fn name(&self) -> &str {
        "epoch_logging_hook"
    }

    fn after_epoch(&mut self, epoch: usize, record: &EpochRecord) -> HookResult<HookAction> {
        if epoch % self.every_n_epochs == 0 {
            let mut msg = format!(
                "Epoch {}: total_loss = {:.6}, loss = {:.6}, sauc_loss = {:.6}",
                epoch + 1,
                record.total_loss,
                record.pairwise_loss,
                record.smooth_auc_loss
            );
            for (name, value) in &record.val_metrics {
                msg.push_str(&format!(", val_{} = {:.4}", name, value));
            }
            info!("{}", msg);
        }
        Ok(HookAction::Continue)
    }

    fn end(&mut self, history: &TrainingHistory) -> HookResult<()> {
        if let Some(last) = history.last() {
            info!(
                "Training finished after {} epochs: val auc_personal = {:.4}",
                history.len(),
                last.validation.auc_personal
            );
        } else {
            info!("Training finished with no completed epochs");
        }
        Ok(())
    }
}

/// Stops training when validation personalized AUC stops improving.
#[derive(Debug)]
pub struct EarlyStoppingHook {
    patience: usize,
    min_delta: f64,
    best: f64,
    epochs_without_improvement: usize,
}

impl EarlyStoppingHook {
    /// Creates a hook that stops after `patience` epochs without an
    /// improvement of more than `min_delta`.
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience: patience.max(1),
            min_delta,
            best: f64::NEG_INFINITY,
            epochs_without_improvement: 0,
        }
    }
}

impl Hook for EarlyStoppingHook {
    fn name(&self) -> &str {
        "early_stopping_hook"
    }

    fn after_epoch(&mut self, epoch: usize, record: &EpochRecord) -> HookResult<HookAction> {
        let current = record.validation.auc_personal;
        if current > self.best + self.min_delta {
            self.best = current;
            self.epochs_without_improvement = 0;
            return Ok(HookAction::Continue);
        }
        self.epochs_without_improvement += 1;
        if self.epochs_without_improvement >= self.patience {
            info!(
                epoch,
                best = self.best,
                "early stopping: no val auc_personal improvement for {} epochs",
                self.patience
            );
            return Ok(HookAction::Stop);
        }
        Ok(HookAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deeprank_metrics::RankingReport;
    use std::collections::BTreeMap;

    fn record(epoch: usize, auc: f64) -> EpochRecord {
        EpochRecord {
            epoch,
            total_loss: 0.0,
            pairwise_loss: 0.0,
            smooth_auc_loss: 0.0,
            validation: RankingReport {
                lists: 1,
                auc_personal: auc,
                mrr: auc,
                cutoffs: vec![2],
                recall_at: vec![auc],
                map_at: vec![auc],
                ndcg: vec![auc],
            },
            val_metrics: BTreeMap::new(),
            seconds: 0.0,
        }
    }

    #[test]
    fn test_logging_hook_continues() {
        let mut hook = EpochLoggingHook::new(1);
        let action = hook.after_epoch(0, &record(0, 0.5)).unwrap();
        assert_eq!(action, HookAction::Continue);
    }

    #[test]
    fn test_early_stopping_stops_after_patience() {
        let mut hook = EarlyStoppingHook::new(2, 0.0);
        assert_eq!(
            hook.after_epoch(0, &record(0, 0.6)).unwrap(),
            HookAction::Continue
        );
        assert_eq!(
            hook.after_epoch(1, &record(1, 0.6)).unwrap(),
            HookAction::Continue
        );
        assert_eq!(
            hook.after_epoch(2, &record(2, 0.6)).unwrap(),
            HookAction::Stop
        );
    }

    #[test]
    fn test_early_stopping_resets_on_improvement() {
        let mut hook = EarlyStoppingHook::new(2, 0.0);
        hook.after_epoch(0, &record(0, 0.5)).unwrap();
        hook.after_epoch(1, &record(1, 0.5)).unwrap();
        // Improvement resets the patience counter.
        assert_eq!(
            hook.after_epoch(2, &record(2, 0.7)).unwrap(),
            HookAction::Continue
        );
        assert_eq!(
            hook.after_epoch(3, &record(3, 0.7)).unwrap(),
            HookAction::Continue
        );
        assert_eq!(
            hook.after_epoch(4, &record(4, 0.7)).unwrap(),
            HookAction::Stop
        );
    }
}
