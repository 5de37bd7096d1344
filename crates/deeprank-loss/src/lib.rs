//! Pairwise ranking losses for deeprank.
//!
//! This crate implements the differentiable core of personalized ranking
//! training:
//!
//! - **Rank transform**: [`rank::rank_weights`] turns a user's positive and
//!   negative score vectors into a P×Q matrix of normalized rank-distance
//!   importance weights.
//! - **Smooth-AUC loss**: [`smooth_auc::SmoothAucLoss`] squashes every
//!   positive/negative residual through a logistic at temperature `tau` and
//!   combines it with the (detached) rank weights into a differentiable
//!   surrogate for per-user AUC, with analytic gradients.
//!
//! # Example
//!
//! ```
//! use deeprank_loss::SmoothAucLoss;
//!
//! let loss = SmoothAucLoss::default();
//! let (terms, grad) = loss
//!     .forward_with_grad(&[0.7, 0.9], &[0.1, 0.2])
//!     .unwrap();
//! assert!(terms.weighted_mean <= 2.0);
//! assert_eq!(grad.wrt_positive.len(), 2);
//! assert_eq!(grad.wrt_negative.len(), 2);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod rank;
pub mod smooth_auc;

pub use error::{LossError, LossResult};
pub use rank::{rank_weights, PairMatrix};
pub use smooth_auc::{
    PairwiseLossGrad, PairwiseLossTerms, SmoothAucLoss, DEFAULT_TAU,
};
