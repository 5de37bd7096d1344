//! Training data plumbing for deeprank.
//!
//! This crate owns the positive-interaction table and everything the
//! training loop needs to turn it into pairwise training work:
//!
//! - [`table::InteractionTable`]: numeric feature rows, one per observed
//!   positive interaction, sliceable by per-user contiguous row ranges.
//! - [`table::build_batches`]: per-epoch batching of user slices with
//!   optional shuffling.
//! - [`sampler::UniformNegativeSampler`]: capped rejection sampling of
//!   negative item identifiers with a complement fallback.
//! - [`rng::XorShift64`]: the explicit, caller-owned random source every
//!   sampling and shuffling call takes.
//!
//! # Example
//!
//! ```
//! use deeprank_data::{InteractionTable, UniformNegativeSampler, XorShift64};
//!
//! let mut table = InteractionTable::new(
//!     vec!["user_id".into(), "item_id".into()],
//!     "user_id",
//!     "item_id",
//! )
//! .unwrap();
//! table.push_row(vec![0.0, 4.0]).unwrap();
//! table.push_row(vec![0.0, 7.0]).unwrap();
//!
//! let sampler = UniformNegativeSampler::new(100);
//! let mut rng = XorShift64::new(1024);
//! let slice = table.user_slices()[0];
//! let rows = table.slice(&slice).unwrap();
//! let seen = table.seen_items(&slice).unwrap();
//! let negatives = sampler
//!     .negative_frame(rows, &seen, table.item_column(), &mut rng)
//!     .unwrap();
//! assert_eq!(negatives.len(), 2);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod rng;
pub mod sampler;
pub mod table;

pub use error::{DataError, SampleError};
pub use rng::XorShift64;
pub use sampler::{UniformNegativeSampler, DEFAULT_MAX_ATTEMPTS};
pub use table::{build_batches, InteractionTable, UserSlice};
