//! The personalized ranking training loop.
//!
//! [`RankingTrainer::fit_ranking`] iterates epochs over shuffled batches of
//! per-user row ranges from a positive-interaction table. For every user in
//! a batch it builds a matched negative frame through the sampler, scores
//! both frames, evaluates the rank-weighted smooth-AUC loss and accumulates
//! scaled gradients; each batch ends in one optimizer step over the summed
//! pairwise loss plus the regularization penalty and the auxiliary scalar.
//! After every epoch the held-out candidate lists are evaluated and the
//! best-checkpoint record is refreshed whenever validation personalized AUC
//! reaches a new best; training stops early on a hook's verdict, on
//! cancellation between batches, or when validation AUC falls to the
//! divergence floor.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use deeprank_data::{build_batches, InteractionTable, UniformNegativeSampler, UserSlice, XorShift64};
use deeprank_loss::SmoothAucLoss;
use deeprank_metrics::RankingReport;
use deeprank_model::{ParameterSnapshot, RegularizationRegistry, Scorer, Tensor};
use deeprank_optimizer::{create_optimizer, OptimizerDyn};

use crate::config::{TrainerConfig, ValidationData};
use crate::error::{TrainError, TrainResult};
use crate::history::{EpochRecord, TrainingHistory};
use crate::hooks::{Hook, HookAction};
use crate::kinds::LossKind;
use crate::progress::{NullReporter, ProgressReporter};

/// Shared flag for requesting cancellation between batches.
///
/// The in-flight batch always completes; the loop observes the flag before
/// starting the next one and surfaces [`TrainError::Interrupted`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unsignalled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a completed `fit_ranking` run.
#[derive(Debug)]
pub struct FitOutcome {
    /// Per-epoch records.
    pub history: TrainingHistory,
    /// Best validation personalized AUC observed.
    pub best_score: f64,
    /// Parameter snapshot at the best epoch, if any epoch completed.
    pub best_snapshot: Option<ParameterSnapshot>,
    /// Whether a hook stopped training early.
    pub stopped_early: bool,
    /// Whether validation AUC hit the divergence floor.
    pub diverged: bool,
    /// Where the best checkpoint was written, when `model_dir` is set.
    pub best_checkpoint_path: Option<PathBuf>,
}

/// Orchestrates smooth-AUC ranking training for one scorer.
pub struct RankingTrainer<S: Scorer> {
    scorer: S,
    registry: RegularizationRegistry,
    config: TrainerConfig,
    loss: SmoothAucLoss,
    sampler: UniformNegativeSampler,
    rng: XorShift64,
    hooks: Vec<Box<dyn Hook>>,
    reporter: Box<dyn ProgressReporter>,
    cancel: CancelToken,
    aux_loss: f32,
}

impl<S: Scorer> RankingTrainer<S> {
    /// Creates a trainer from a scorer, its regularization registry and a
    /// validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Config`] when the configuration is invalid.
    pub fn new(
        scorer: S,
        registry: RegularizationRegistry,
        config: TrainerConfig,
    ) -> TrainResult<Self> {
        config.validate()?;
        let loss = SmoothAucLoss::new(config.tau);
        let sampler = UniformNegativeSampler::new(config.item_universe);
        let rng = XorShift64::new(config.seed);
        Ok(Self {
            scorer,
            registry,
            config,
            loss,
            sampler,
            rng,
            hooks: Vec::new(),
            reporter: Box::new(NullReporter),
            cancel: CancelToken::new(),
            aux_loss: 0.0,
        })
    }

    /// Adds an epoch hook.
    pub fn add_hook<H: Hook + 'static>(&mut self, hook: H) {
        self.hooks.push(Box::new(hook));
    }

    /// Replaces the progress reporter.
    pub fn set_reporter<R: ProgressReporter + 'static>(&mut self, reporter: R) {
        self.reporter = Box::new(reporter);
    }

    /// Returns a token that cancels this trainer between batches.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Sets the externally-owned auxiliary loss scalar, scaled by `alpha`.
    ///
    /// The scalar is added to every step's total loss; its gradients belong
    /// to whichever collaborator produced it.
    pub fn set_auxiliary_loss(&mut self, value: f32, alpha: f32) {
        self.aux_loss = value * alpha;
    }

    /// The trainer configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// The scorer being trained.
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Mutable access to the scorer (e.g. to restore a snapshot).
    pub fn scorer_mut(&mut self) -> &mut S {
        &mut self.scorer
    }

    /// The regularization registry.
    pub fn registry(&self) -> &RegularizationRegistry {
        &self.registry
    }

    /// Scores the validation rows and evaluates the ranking metrics.
    ///
    /// # Errors
    ///
    /// Propagates scorer and evaluator failures.
    pub fn evaluate_ranking(&self, validation: &ValidationData) -> TrainResult<RankingReport> {
        let scores = self.scorer.score(validation.features())?;
        Ok(self.config.evaluator.evaluate(&scores, validation.labels())?)
    }

    /// Runs the full training loop.
    ///
    /// # Errors
    ///
    /// Fails fast on configuration and label-layout violations, propagates
    /// loss/model/sampling errors from inside the loop, and returns
    /// [`TrainError::Interrupted`] when the cancel token fires.
    pub fn fit_ranking(
        &mut self,
        table: &InteractionTable,
        validation: &ValidationData,
    ) -> TrainResult<FitOutcome> {
        if self.config.loss != LossKind::SmoothAucLambda {
            return Err(TrainError::Config(format!(
                "fit_ranking requires the {} loss, configured {}",
                LossKind::SmoothAucLambda,
                self.config.loss
            )));
        }
        if table.is_empty() {
            return Err(TrainError::Config(
                "interaction table has no positive rows".into(),
            ));
        }
        self.config.evaluator.validate_labels(validation.labels())?;

        self.registry.freeze();
        let slices = table.user_slices();
        let optimizer_config = self.config.effective_optimizer();
        let mut optimizers: Vec<Box<dyn OptimizerDyn>> = (0..self.scorer.parameter_count())
            .map(|_| create_optimizer(optimizer_config.clone()))
            .collect();

        info!(
            users = slices.len(),
            rows = table.len(),
            epochs = self.config.epochs,
            batch_size = self.config.batch_size,
            optimizer = optimizer_config.name(),
            "starting ranking training"
        );

        let mut history = TrainingHistory::new();
        let mut best_score = 0.0f64;
        let mut best_snapshot: Option<ParameterSnapshot> = None;
        let mut stopped_early = false;
        let mut diverged = false;

        'epochs: for epoch in 0..self.config.epochs {
            let started = Instant::now();
            for hook in &mut self.hooks {
                hook.before_epoch(epoch)?;
            }

            let batches = build_batches(
                &slices,
                self.config.batch_size,
                self.config.shuffle,
                &mut self.rng,
            );

            let mut total_loss_sum = 0.0f64;
            let mut pairwise_loss_sum = 0.0f64;
            let mut sauc_loss_sum = 0.0f64;
            let mut steps = 0usize;
            for batch in &batches {
                if self.cancel.is_cancelled() {
                    warn!(epoch, "cancellation requested; stopping between batches");
                    return Err(TrainError::Interrupted);
                }
                let (total, pairwise, sauc) = self.train_step(table, batch, &mut optimizers)?;
                total_loss_sum += total;
                pairwise_loss_sum += pairwise;
                sauc_loss_sum += sauc;
                steps += 1;
            }
            let steps = steps.max(1) as f64;

            let scores = self.scorer.score(validation.features())?;
            let report = self.config.evaluator.evaluate(&scores, validation.labels())?;
            let mut val_metrics = std::collections::BTreeMap::new();
            val_metrics.insert("auc_personal".to_string(), report.auc_personal);
            for kind in &self.config.metrics {
                if let Some(result) = kind.evaluate_binary(validation.labels(), &scores) {
                    val_metrics.insert(kind.key().to_string(), result?);
                }
            }

            let record = EpochRecord {
                epoch,
                total_loss: total_loss_sum / steps,
                pairwise_loss: pairwise_loss_sum / steps,
                smooth_auc_loss: sauc_loss_sum / steps,
                validation: report.clone(),
                val_metrics,
                seconds: started.elapsed().as_secs_f64(),
            };
            info!(
                epoch,
                total_loss = record.total_loss,
                pairwise_loss = record.pairwise_loss,
                sauc_loss = record.smooth_auc_loss,
                val_auc_personal = report.auc_personal,
                seconds = record.seconds,
                "epoch complete"
            );
            self.reporter.report_intermediate(report.auc_personal);

            if report.auc_personal >= best_score {
                best_score = report.auc_personal;
                best_snapshot = Some(self.scorer.snapshot());
            }

            history.push(record);
            let last = history.last().expect("record just pushed");
            for hook in &mut self.hooks {
                if hook.after_epoch(epoch, last)? == HookAction::Stop {
                    info!(epoch, hook = hook.name(), "training stopped by hook");
                    stopped_early = true;
                    break 'epochs;
                }
            }
            if report.auc_personal <= self.config.divergence_floor {
                warn!(
                    epoch,
                    auc = report.auc_personal,
                    floor = self.config.divergence_floor,
                    "validation personalized AUC at divergence floor; stopping"
                );
                diverged = true;
                break;
            }
        }

        for hook in &mut self.hooks {
            hook.end(&history)?;
        }
        self.reporter.report_final(best_score);

        let best_checkpoint_path = match (&self.config.model_dir, &best_snapshot) {
            (Some(dir), Some(snapshot)) => Some(write_best_checkpoint(dir, snapshot, best_score)?),
            _ => None,
        };

        Ok(FitOutcome {
            history,
            best_score,
            best_snapshot,
            stopped_early,
            diverged,
            best_checkpoint_path,
        })
    }

    /// Runs one gradient step over a batch of user slices.
    ///
    /// Returns the step's (total, pairwise-mean, smooth-auc) losses, each
    /// normalized by the batch user count.
    fn train_step(
        &mut self,
        table: &InteractionTable,
        batch: &[UserSlice],
        optimizers: &mut [Box<dyn OptimizerDyn>],
    ) -> TrainResult<(f64, f64, f64)> {
        self.scorer.zero_gradients();
        let users = batch.len() as f32;
        let mut pairwise_mean = 0.0f32;
        let mut pairwise_sum = 0.0f32;
        let mut sauc = 0.0f32;

        for slice in batch {
            let rows = table.slice(slice)?;
            let seen = table.seen_items(slice)?;
            let pos_rows = Tensor::from_rows(rows)?;
            let neg_frame =
                self.sampler
                    .negative_frame(rows, &seen, table.item_column(), &mut self.rng)?;
            let neg_rows = Tensor::from_rows(&neg_frame)?;

            let pos_scores = self.scorer.score(&pos_rows)?;
            let neg_scores = self.scorer.score(&neg_rows)?;
            let (terms, grad) = self.loss.forward_with_grad(&pos_scores, &neg_scores)?;
            pairwise_mean += terms.weighted_mean;
            pairwise_sum += terms.weighted_sum;
            sauc += terms.smooth_auc;

            // The step loss is the per-user mean of the summed form, so each
            // user's gradient contribution is scaled by 1 / batch users.
            let pos_grad: Vec<f32> = grad.wrt_positive.iter().map(|g| g / users).collect();
            let neg_grad: Vec<f32> = grad.wrt_negative.iter().map(|g| g / users).collect();
            self.scorer.backward(&pos_rows, &pos_grad)?;
            self.scorer.backward(&neg_rows, &neg_grad)?;
        }

        pairwise_mean /= users;
        pairwise_sum /= users;
        sauc /= users;

        let reg_loss = self.registry.penalty(&self.scorer);
        self.registry.accumulate_gradients(&mut self.scorer);
        let total = pairwise_sum + reg_loss + self.aux_loss;

        self.scorer.for_each_parameter_mut(&mut |index, values, grads| {
            optimizers[index].apply_gradients(values, grads);
        });

        Ok((total as f64, pairwise_mean as f64, sauc as f64))
    }
}

/// Writes the best parameter snapshot as JSON into `dir`.
fn write_best_checkpoint(
    dir: &Path,
    snapshot: &ParameterSnapshot,
    score: f64,
) -> TrainResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("best_checkpoint.json");
    let payload = serde_json::json!({
        "val_auc_personal": score,
        "parameters": snapshot,
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&payload)?)?;
    info!(path = %path.display(), score, "best checkpoint written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookResult;
    use deeprank_model::ModelResult;
    use std::cell::{Cell, RefCell};

    const LIST_LEN: usize = 101;

    /// Scorer whose validation scores follow a scripted per-epoch AUC.
    ///
    /// Training batches score to zeros; a batch whose row count equals the
    /// validation length is treated as the per-epoch validation pass, and
    /// the single parameter records the index of that pass so tests can
    /// identify which epoch a snapshot came from.
    struct ScriptedScorer {
        validation_len: usize,
        auc_script: Vec<f64>,
        eval_calls: Cell<usize>,
        state: RefCell<(Vec<f32>, Vec<f32>)>,
    }

    impl ScriptedScorer {
        fn new(validation_len: usize, auc_script: Vec<f64>) -> Self {
            Self {
                validation_len,
                auc_script,
                eval_calls: Cell::new(0),
                state: RefCell::new((vec![-1.0], vec![0.0])),
            }
        }
    }

    impl Scorer for ScriptedScorer {
        fn score(&self, rows: &Tensor) -> ModelResult<Vec<f32>> {
            let n = rows.shape()[0];
            if n != self.validation_len {
                return Ok(vec![0.0; n]);
            }
            let call = self.eval_calls.get();
            self.eval_calls.set(call + 1);
            self.state.borrow_mut().0[0] = call as f32;

            let auc = self.auc_script[call.min(self.auc_script.len() - 1)];
            let below = (auc * 100.0).round() as usize;
            let mut scores = Vec::with_capacity(n);
            for _ in 0..n / LIST_LEN {
                scores.push(0.5);
                for j in 0..LIST_LEN - 1 {
                    scores.push(if j < below { 0.1 } else { 0.9 });
                }
            }
            Ok(scores)
        }

        fn backward(&mut self, _rows: &Tensor, _grad: &[f32]) -> ModelResult<()> {
            Ok(())
        }

        fn zero_gradients(&mut self) {}

        fn parameter_count(&self) -> usize {
            1
        }

        fn for_each_parameter(&self, visit: &mut dyn FnMut(usize, &[f32])) {
            visit(0, &self.state.borrow().0);
        }

        fn for_each_parameter_mut(
            &mut self,
            visit: &mut dyn FnMut(usize, &mut [f32], &mut [f32]),
        ) {
            let state = self.state.get_mut();
            visit(0, &mut state.0, &mut state.1);
        }
    }

    fn tiny_table() -> InteractionTable {
        let mut table = InteractionTable::new(
            vec!["user_id".into(), "item_id".into()],
            "user_id",
            "item_id",
        )
        .unwrap();
        table.push_row(vec![0.0, 1.0]).unwrap();
        table.push_row(vec![0.0, 2.0]).unwrap();
        table
    }

    fn one_list_validation() -> ValidationData {
        let rows: Vec<Vec<f32>> = (0..LIST_LEN).map(|i| vec![0.0, i as f32]).collect();
        let mut labels = vec![1.0];
        labels.extend(std::iter::repeat(0.0).take(LIST_LEN - 1));
        ValidationData::new(Tensor::from_rows(&rows).unwrap(), labels).unwrap()
    }

    fn trainer_with_script(auc_script: Vec<f64>, epochs: usize) -> RankingTrainer<ScriptedScorer> {
        let scorer = ScriptedScorer::new(LIST_LEN, auc_script);
        let config = TrainerConfig::new(100)
            .with_epochs(epochs)
            .with_batch_size(4)
            .with_shuffle(false);
        RankingTrainer::new(scorer, RegularizationRegistry::new(), config).unwrap()
    }

    #[test]
    fn test_best_checkpoint_tracks_peak_epoch() {
        let mut trainer = trainer_with_script(vec![0.5, 0.7, 0.6], 3);
        let outcome = trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap();

        assert_eq!(outcome.history.len(), 3);
        assert!((outcome.best_score - 0.7).abs() < 1e-12);
        // The snapshot's parameter carries the validation-pass index; the
        // best epoch was the second one (index 1), not the last.
        let snapshot = outcome.best_snapshot.unwrap();
        assert_eq!(snapshot.tensors()[0], vec![1.0]);
        assert!(!outcome.stopped_early);
        assert!(!outcome.diverged);
    }

    #[test]
    fn test_divergence_floor_stops_training() {
        let mut trainer = trainer_with_script(vec![0.5, 0.05, 0.9], 5);
        let outcome = trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap();

        assert!(outcome.diverged);
        assert_eq!(outcome.history.len(), 2);
        // The diverged epoch did not beat the first epoch's best.
        assert!((outcome.best_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cancellation_between_batches() {
        let mut trainer = trainer_with_script(vec![0.5], 1);
        trainer.cancel_token().cancel();
        let err = trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap_err();
        assert!(matches!(err, TrainError::Interrupted));
    }

    struct StopAfterFirstEpoch;

    impl Hook for StopAfterFirstEpoch {
        fn name(&self) -> &str {
            "stop_after_first_epoch"
        }

        fn after_epoch(&mut self, _epoch: usize, _record: &EpochRecord) -> HookResult<HookAction> {
            Ok(HookAction::Stop)
        }
    }

    #[test]
    fn test_hook_stop_flag() {
        let mut trainer = trainer_with_script(vec![0.5, 0.9], 5);
        trainer.add_hook(StopAfterFirstEpoch);
        let outcome = trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap();
        assert!(outcome.stopped_early);
        assert_eq!(outcome.history.len(), 1);
        assert!((outcome.best_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fit_requires_smooth_auc_loss() {
        let scorer = ScriptedScorer::new(LIST_LEN, vec![0.5]);
        let config = TrainerConfig::new(100).with_loss(LossKind::BinaryCrossentropy);
        let mut trainer =
            RankingTrainer::new(scorer, RegularizationRegistry::new(), config).unwrap();
        let err = trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap_err();
        assert!(matches!(err, TrainError::Config(_)));
    }

    #[test]
    fn test_fit_rejects_empty_table() {
        let mut trainer = trainer_with_script(vec![0.5], 1);
        let empty = InteractionTable::new(
            vec!["user_id".into(), "item_id".into()],
            "user_id",
            "item_id",
        )
        .unwrap();
        let err = trainer
            .fit_ranking(&empty, &one_list_validation())
            .unwrap_err();
        assert!(matches!(err, TrainError::Config(_)));
    }

    #[test]
    fn test_fit_rejects_bad_label_layout() {
        let mut trainer = trainer_with_script(vec![0.5], 1);
        let rows: Vec<Vec<f32>> = (0..LIST_LEN).map(|i| vec![0.0, i as f32]).collect();
        let mut labels = vec![0.0; LIST_LEN];
        labels[3] = 1.0;
        let validation =
            ValidationData::new(Tensor::from_rows(&rows).unwrap(), labels).unwrap();
        let err = trainer.fit_ranking(&tiny_table(), &validation).unwrap_err();
        assert!(matches!(err, TrainError::Eval(_)));
    }

    #[test]
    fn test_registry_frozen_after_fit() {
        let mut trainer = trainer_with_script(vec![0.5], 1);
        trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap();
        assert!(trainer.registry().is_frozen());
    }

    #[test]
    fn test_best_checkpoint_written_to_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        let scorer = ScriptedScorer::new(LIST_LEN, vec![0.6]);
        let config = TrainerConfig::new(100)
            .with_epochs(1)
            .with_shuffle(false)
            .with_model_dir(dir.path().to_path_buf());
        let mut trainer =
            RankingTrainer::new(scorer, RegularizationRegistry::new(), config).unwrap();
        let outcome = trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap();

        let path = outcome.best_checkpoint_path.unwrap();
        assert!(path.exists());
        let payload: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!((payload["val_auc_personal"].as_f64().unwrap() - 0.6).abs() < 1e-12);
        assert!(payload["parameters"].is_object());
    }

    #[test]
    fn test_auxiliary_loss_enters_total() {
        let table = tiny_table();
        let validation = one_list_validation();

        let mut plain = trainer_with_script(vec![0.5], 1);
        let baseline = plain.fit_ranking(&table, &validation).unwrap();

        let mut with_aux = trainer_with_script(vec![0.5], 1);
        with_aux.set_auxiliary_loss(0.5, 2.0);
        let boosted = with_aux.fit_ranking(&table, &validation).unwrap();

        let delta = boosted.history.last().unwrap().total_loss
            - baseline.history.last().unwrap().total_loss;
        assert!((delta - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reporter_receives_intermediate_results() {
        struct RecordingReporter {
            seen: std::sync::Arc<std::sync::Mutex<Vec<f64>>>,
        }

        impl ProgressReporter for RecordingReporter {
            fn report_intermediate(&mut self, value: f64) {
                self.seen.lock().unwrap().push(value);
            }

            fn report_final(&mut self, value: f64) {
                self.seen.lock().unwrap().push(-value);
            }
        }

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut trainer = trainer_with_script(vec![0.5, 0.7], 2);
        trainer.set_reporter(RecordingReporter { seen: seen.clone() });
        trainer
            .fit_ranking(&tiny_table(), &one_list_validation())
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[0.5, 0.7, -0.7]);
    }
}
