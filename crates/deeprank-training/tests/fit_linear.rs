//! End-to-end training of the linear scorer on synthetic interactions.

use deeprank_data::InteractionTable;
use deeprank_model::{LinearScorerConfig, Scorer, Tensor};
use deeprank_training::{RankingTrainer, TrainerConfig, ValidationData};

const USERS: usize = 8;
const ITEMS: usize = 30;
const POSITIVES_PER_USER: usize = 3;
const NEGATIVES_PER_LIST: usize = 100;

fn positive_items(user: usize) -> Vec<usize> {
    (0..POSITIVES_PER_USER).map(|k| user * 3 + k).collect()
}

fn synthetic_table() -> InteractionTable {
    let mut table = InteractionTable::new(
        vec!["user_id".into(), "item_id".into()],
        "user_id",
        "item_id",
    )
    .unwrap();
    for user in 0..USERS {
        for item in positive_items(user) {
            table.push_row(vec![user as f32, item as f32]).unwrap();
        }
    }
    table
}

fn synthetic_validation() -> ValidationData {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for user in 0..USERS {
        let positives = positive_items(user);
        let complement: Vec<usize> = (0..ITEMS).filter(|i| !positives.contains(i)).collect();

        rows.push(vec![user as f32, positives[0] as f32]);
        labels.push(1.0);
        for j in 0..NEGATIVES_PER_LIST {
            rows.push(vec![user as f32, complement[j % complement.len()] as f32]);
            labels.push(0.0);
        }
    }
    ValidationData::new(Tensor::from_rows(&rows).unwrap(), labels).unwrap()
}

fn build_trainer(model_dir: Option<std::path::PathBuf>) -> RankingTrainer<deeprank_model::LinearScorer> {
    let scorer = LinearScorerConfig::new()
        .sparse_column("user_id", USERS)
        .sparse_column("item_id", ITEMS)
        .with_seed(1024)
        .build()
        .unwrap();
    let registry = scorer.build_registry(1e-5, 1e-5);
    let mut config = TrainerConfig::new(ITEMS)
        .with_epochs(3)
        .with_batch_size(4)
        .with_learning_rate(0.1)
        .with_seed(7);
    if let Some(dir) = model_dir {
        config = config.with_model_dir(dir);
    }
    RankingTrainer::new(scorer, registry, config).unwrap()
}

#[test]
fn fit_ranking_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = build_trainer(Some(dir.path().to_path_buf()));
    let table = synthetic_table();
    let validation = synthetic_validation();

    let outcome = trainer.fit_ranking(&table, &validation).unwrap();

    assert!(!outcome.history.is_empty());
    assert!(outcome.history.len() <= 3);
    assert!((0.0..=1.0).contains(&outcome.best_score));
    let snapshot = outcome.best_snapshot.expect("at least one epoch completed");
    // user table, item table, bias
    assert_eq!(snapshot.len(), 3);

    let path = outcome
        .best_checkpoint_path
        .expect("model_dir was configured");
    assert!(path.exists());

    // The best snapshot restores cleanly into the trained scorer.
    trainer.scorer_mut().restore(&snapshot).unwrap();
    let report = trainer.evaluate_ranking(&validation).unwrap();
    assert_eq!(report.lists, USERS);
    assert!((outcome.best_score - report.auc_personal).abs() < 1e-9);
}

#[test]
fn fit_ranking_is_seed_deterministic() {
    let table = synthetic_table();
    let validation = synthetic_validation();

    let outcome_a = build_trainer(None)
        .fit_ranking(&table, &validation)
        .unwrap();
    let outcome_b = build_trainer(None)
        .fit_ranking(&table, &validation)
        .unwrap();

    assert_eq!(outcome_a.history.len(), outcome_b.history.len());
    assert_eq!(outcome_a.best_score, outcome_b.best_score);
    assert_eq!(outcome_a.best_snapshot, outcome_b.best_snapshot);
}
