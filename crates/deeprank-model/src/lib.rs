//! Model seam for deeprank.
//!
//! The training loop never sees a concrete model: it talks to a
//! [`scorer::Scorer`], a differentiable scoring function over numeric
//! feature rows with indexed parameter visitation, gradient accumulation and
//! value-level [`scorer::ParameterSnapshot`]s. This crate also owns the
//! append-only [`registry::RegularizationRegistry`] consumed on every
//! training step and ships [`linear::LinearScorer`], a linear model over
//! per-column sparse weight tables and dense weights that exercises the
//! whole loop in tests and demos.
//!
//! # Example
//!
//! ```
//! use deeprank_model::linear::LinearScorerConfig;
//! use deeprank_model::scorer::Scorer;
//! use deeprank_model::tensor::Tensor;
//!
//! let scorer = LinearScorerConfig::new()
//!     .sparse_column("user_id", 10)
//!     .sparse_column("item_id", 20)
//!     .build()
//!     .unwrap();
//!
//! let rows = Tensor::from_rows(&[vec![3.0, 7.0]]).unwrap();
//! let scores = scorer.score(&rows).unwrap();
//! assert_eq!(scores.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod linear;
pub mod registry;
pub mod scorer;
pub mod tensor;

pub use error::{ModelError, ModelResult};
pub use linear::{ColumnKind, LinearScorer, LinearScorerConfig, DEFAULT_INIT_STD};
pub use registry::{RegularizationEntry, RegularizationRegistry};
pub use scorer::{ParameterSnapshot, Scorer};
pub use tensor::Tensor;
