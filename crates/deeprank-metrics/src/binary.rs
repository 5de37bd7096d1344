//! Global binary-classification metrics.
//!
//! These back the trainer's metric dictionary for flat prediction arrays
//! (log-loss, ROC AUC, accuracy, MSE). Personalized AUC is not here — it is
//! a per-candidate-list metric owned by [`crate::ranking`].

use crate::error::{EvalError, EvalResult};

/// Clamping epsilon for log-loss probabilities.
pub const LOG_LOSS_EPS: f64 = 1e-7;

fn check_lengths(y_true: &[f32], y_pred: &[f32]) -> EvalResult<()> {
    if y_true.is_empty() {
        return Err(EvalError::Shape {
            message: "empty label array".into(),
        });
    }
    if y_true.len() != y_pred.len() {
        return Err(EvalError::Shape {
            message: format!(
                "labels ({}) and predictions ({}) differ in length",
                y_true.len(),
                y_pred.len()
            ),
        });
    }
    Ok(())
}

/// Mean negative log-likelihood of binary labels under predicted
/// probabilities, with predictions clamped to `[eps, 1 - eps]`.
pub fn log_loss(y_true: &[f32], y_pred: &[f32]) -> EvalResult<f64> {
    check_lengths(y_true, y_pred)?;
    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| {
            let p = (p as f64).clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            let t = t as f64;
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Area under the ROC curve via the rank-statistic formulation.
///
/// Tied predictions receive their midrank, so the result matches the
/// trapezoidal ROC construction exactly.
///
/// # Errors
///
/// Returns [`EvalError::DegenerateLabels`] when only one class is present.
pub fn roc_auc_score(y_true: &[f32], y_pred: &[f32]) -> EvalResult<f64> {
    check_lengths(y_true, y_pred)?;
    let positives = y_true.iter().filter(|&&t| t > 0.5).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvalError::DegenerateLabels {
            message: format!(
                "ROC AUC needs both classes, got {} positives / {} negatives",
                positives, negatives
            ),
        });
    }

    let mut order: Vec<usize> = (0..y_pred.len()).collect();
    order.sort_by(|&a, &b| y_pred[a].total_cmp(&y_pred[b]));

    // Midranks over tied prediction groups, 1-based.
    let mut ranks = vec![0.0f64; y_pred.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && y_pred[order[j + 1]] == y_pred[order[i]] {
            j += 1;
        }
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = midrank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&t, _)| t > 0.5)
        .map(|(_, &r)| r)
        .sum();
    let p = positives as f64;
    let n = negatives as f64;
    Ok((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// Fraction of predictions on the correct side of the 0.5 threshold.
pub fn accuracy_score(y_true: &[f32], y_pred: &[f32]) -> EvalResult<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(&t, &p)| (p > 0.5) == (t > 0.5))
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Mean squared error between labels and predictions.
pub fn mean_squared_error(y_true: &[f32], y_pred: &[f32]) -> EvalResult<f64> {
    check_lengths(y_true, y_pred)?;
    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| {
            let d = (t - p) as f64;
            d * d
        })
        .sum();
    Ok(total / y_true.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_loss_confident_correct_is_small() {
        let loss = log_loss(&[1.0, 0.0], &[0.99, 0.01]).unwrap();
        assert!(loss < 0.02);
    }

    #[test]
    fn test_log_loss_clamps_extreme_predictions() {
        // A hard-wrong prediction of exactly 0 must not produce infinity.
        let loss = log_loss(&[1.0], &[0.0]).unwrap();
        assert!(loss.is_finite());
        assert!((loss - (-LOG_LOSS_EPS.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        let y_true = vec![0.0, 0.0, 1.0, 1.0];
        assert_eq!(
            roc_auc_score(&y_true, &[0.1, 0.2, 0.8, 0.9]).unwrap(),
            1.0
        );
        assert_eq!(
            roc_auc_score(&y_true, &[0.9, 0.8, 0.2, 0.1]).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_roc_auc_hand_computed_with_ties() {
        // Predictions: 0.5 (pos), 0.5 (neg), 0.3 (neg), 0.7 (pos).
        // Sorted: 0.3 (rank 1), {0.5, 0.5} midrank 2.5, 0.7 (rank 4).
        // Positive rank sum = 2.5 + 4 = 6.5; AUC = (6.5 - 3) / 4 = 0.875.
        let auc = roc_auc_score(&[1.0, 0.0, 0.0, 1.0], &[0.5, 0.5, 0.3, 0.7]).unwrap();
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class_rejected() {
        let err = roc_auc_score(&[1.0, 1.0], &[0.1, 0.9]).unwrap_err();
        assert!(matches!(err, EvalError::DegenerateLabels { .. }));
    }

    #[test]
    fn test_accuracy_threshold() {
        let acc = accuracy_score(&[1.0, 0.0, 1.0, 0.0], &[0.9, 0.2, 0.4, 0.6]).unwrap();
        assert_eq!(acc, 0.5);
    }

    #[test]
    fn test_mean_squared_error() {
        let mse = mean_squared_error(&[1.0, 0.0], &[0.5, 0.5]).unwrap();
        assert!((mse - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = log_loss(&[1.0, 0.0], &[0.5]).unwrap_err();
        assert!(matches!(err, EvalError::Shape { .. }));
    }
}
