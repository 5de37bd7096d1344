//! Trains a linear ranking scorer on synthetic interactions end to end:
//! negative sampling, smooth-AUC loss, per-epoch candidate-list evaluation
//! and best-checkpoint tracking. Prints the final report as JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use deeprank_data::{InteractionTable, XorShift64};
use deeprank_model::{LinearScorerConfig, Scorer, Tensor};
use deeprank_training::{
    EpochLoggingHook, LoggingReporter, RankingTrainer, TrainerConfig, ValidationData,
};

#[derive(Parser, Debug)]
#[command(name = "train-ranking", about = "Smooth-AUC ranking training demo")]
struct Args {
    /// Number of synthetic users.
    #[arg(long, default_value_t = 64)]
    users: usize,

    /// Size of the item universe.
    #[arg(long, default_value_t = 500)]
    items: usize,

    /// Positive interactions per user.
    #[arg(long, default_value_t = 5)]
    positives_per_user: usize,

    /// Training epochs.
    #[arg(long, default_value_t = 5)]
    epochs: usize,

    /// Users per gradient step.
    #[arg(long, default_value_t = 16)]
    batch_size: usize,

    /// Learning rate.
    #[arg(long, default_value_t = 0.05)]
    learning_rate: f32,

    /// Logistic temperature of the smooth-AUC loss.
    #[arg(long, default_value_t = 0.02)]
    tau: f32,

    /// Seed for data synthesis, sampling and shuffling.
    #[arg(long, default_value_t = 1024)]
    seed: u64,

    /// Where to write the best checkpoint.
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

/// Draws `count` distinct items for one user, biased to a per-user block so
/// the ranking signal is learnable.
fn draw_positives(user: usize, count: usize, items: usize, rng: &mut XorShift64) -> Vec<usize> {
    let block = (user * count) % items;
    let mut positives = Vec::with_capacity(count);
    for k in 0..count {
        let mut item = (block + k) % items;
        // Occasionally jump out of the block for variety.
        if rng.next_below(4) == 0 {
            item = rng.next_below(items);
        }
        if !positives.contains(&item) {
            positives.push(item);
        }
    }
    if positives.is_empty() {
        positives.push(block);
    }
    positives
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let mut rng = XorShift64::new(args.seed);
    let mut table = InteractionTable::new(
        vec!["user_id".into(), "item_id".into()],
        "user_id",
        "item_id",
    )?;
    let mut user_positives = Vec::with_capacity(args.users);
    for user in 0..args.users {
        let positives = draw_positives(user, args.positives_per_user, args.items, &mut rng);
        for &item in &positives {
            table.push_row(vec![user as f32, item as f32])?;
        }
        user_positives.push(positives);
    }

    // One candidate list per user: the first positive plus 100 sampled
    // negatives.
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for (user, positives) in user_positives.iter().enumerate() {
        rows.push(vec![user as f32, positives[0] as f32]);
        labels.push(1.0);
        let mut drawn = 0;
        while drawn < 100 {
            let item = rng.next_below(args.items);
            if positives.contains(&item) {
                continue;
            }
            rows.push(vec![user as f32, item as f32]);
            labels.push(0.0);
            drawn += 1;
        }
    }
    let validation = ValidationData::new(Tensor::from_rows(&rows)?, labels)?;

    let scorer = LinearScorerConfig::new()
        .sparse_column("user_id", args.users)
        .sparse_column("item_id", args.items)
        .with_seed(args.seed)
        .build()?;
    let registry = scorer.build_registry(1e-5, 1e-5);

    let mut config = TrainerConfig::new(args.items)
        .with_epochs(args.epochs)
        .with_batch_size(args.batch_size)
        .with_learning_rate(args.learning_rate)
        .with_tau(args.tau)
        .with_seed(args.seed);
    if let Some(model_dir) = args.model_dir.clone() {
        config = config.with_model_dir(model_dir);
    }

    let mut trainer = RankingTrainer::new(scorer, registry, config)?;
    trainer.add_hook(EpochLoggingHook::new(1));
    trainer.set_reporter(LoggingReporter);

    let outcome = trainer.fit_ranking(&table, &validation)?;
    tracing::info!(
        epochs = outcome.history.len(),
        best_val_auc_personal = outcome.best_score,
        stopped_early = outcome.stopped_early,
        diverged = outcome.diverged,
        "training finished"
    );

    if let Some(snapshot) = &outcome.best_snapshot {
        trainer.scorer_mut().restore(snapshot)?;
    }
    let report = trainer.evaluate_ranking(&validation)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
