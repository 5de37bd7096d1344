//! Personalized ranking training for deeprank.
//!
//! This crate orchestrates the smooth-AUC training loop:
//! [`trainer::RankingTrainer::fit_ranking`] consumes a positive-interaction
//! table and held-out candidate lists, runs epochs of per-user pairwise
//! steps (negative sampling, loss, regularization, optimizer update),
//! evaluates ranking metrics after every epoch and tracks the best
//! parameter snapshot by validation personalized AUC.
//!
//! Supporting pieces: [`config::TrainerConfig`] with closed
//! [`kinds::LossKind`]/[`kinds::MetricKind`] enums, epoch [`hooks`],
//! best-effort [`progress`] reporting, cancellation through
//! [`trainer::CancelToken`], and a serde [`history::TrainingHistory`].
//!
//! # Example
//!
//! ```no_run
//! use deeprank_data::InteractionTable;
//! use deeprank_model::LinearScorerConfig;
//! use deeprank_training::{RankingTrainer, TrainerConfig, ValidationData};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let scorer = LinearScorerConfig::new()
//!     .sparse_column("user_id", 1000)
//!     .sparse_column("item_id", 16980)
//!     .build()?;
//! let registry = scorer.build_registry(1e-5, 1e-5);
//!
//! let table: InteractionTable = unimplemented!("load positive interactions");
//! let validation: ValidationData = unimplemented!("load candidate lists");
//!
//! let config = TrainerConfig::new(16980).with_epochs(5);
//! let mut trainer = RankingTrainer::new(scorer, registry, config)?;
//! let outcome = trainer.fit_ranking(&table, &validation)?;
//! println!("best val auc_personal: {}", outcome.best_score);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod history;
pub mod hooks;
pub mod kinds;
pub mod progress;
pub mod trainer;

pub use config::{TrainerConfig, ValidationData, DEFAULT_BATCH_SIZE, DEFAULT_DIVERGENCE_FLOOR};
pub use error::{TrainError, TrainResult};
pub use history::{EpochRecord, TrainingHistory};
pub use hooks::{EarlyStoppingHook, EpochLoggingHook, Hook, HookAction, HookError};
pub use kinds::{LossKind, MetricKind};
pub use progress::{LoggingReporter, NullReporter, ProgressReporter};
pub use trainer::{CancelToken, FitOutcome, RankingTrainer};
