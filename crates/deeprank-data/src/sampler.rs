//! Uniform negative sampling over a fixed item universe.
//!
//! For each positive row of a user, one negative item identifier is drawn
//! uniformly from `[0, item_universe)` excluding the user's seen set.
//! Sampling rejects collisions with the seen set; duplicates across negative
//! slots are allowed. Each slot is capped at a fixed number of rejection
//! attempts, after which the sampler draws directly from the materialized
//! complement of the seen set so a dense seen set cannot hang the loop.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::SampleError;
use crate::rng::XorShift64;

/// Default rejection attempts per negative slot before the complement
/// fallback kicks in.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Uniform negative sampler over `[0, item_universe)`.
///
/// # Example
///
/// ```
/// use deeprank_data::rng::XorShift64;
/// use deeprank_data::sampler::UniformNegativeSampler;
/// use std::collections::HashSet;
///
/// let sampler = UniformNegativeSampler::new(1000);
/// let seen: HashSet<i64> = [3, 14, 15].into_iter().collect();
/// let mut rng = XorShift64::new(42);
///
/// let negatives = sampler.sample(&seen, 5, &mut rng).unwrap();
/// assert_eq!(negatives.len(), 5);
/// assert!(negatives.iter().all(|n| !seen.contains(n)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformNegativeSampler {
    item_universe: usize,
    max_attempts: usize,
}

impl UniformNegativeSampler {
    /// Creates a sampler over `[0, item_universe)`.
    pub fn new(item_universe: usize) -> Self {
        Self {
            item_universe,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the per-slot rejection attempt cap.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Size of the item universe.
    pub fn item_universe(&self) -> usize {
        self.item_universe
    }

    /// Draws one negative identifier not present in `seen`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::UniverseExhausted`] when `seen` covers the
    /// whole universe.
    pub fn sample_one(
        &self,
        seen: &HashSet<i64>,
        rng: &mut XorShift64,
    ) -> Result<i64, SampleError> {
        if self.item_universe == 0 {
            return Err(SampleError::UniverseExhausted {
                universe: 0,
                seen: seen.len(),
            });
        }
        for _ in 0..self.max_attempts {
            let candidate = rng.next_below(self.item_universe) as i64;
            if !seen.contains(&candidate) {
                return Ok(candidate);
            }
        }
        // The seen set is dense relative to the universe; fall back to an
        // exact draw from the complement.
        let complement: Vec<i64> = (0..self.item_universe as i64)
            .filter(|item| !seen.contains(item))
            .collect();
        if complement.is_empty() {
            return Err(SampleError::UniverseExhausted {
                universe: self.item_universe,
                seen: seen.len(),
            });
        }
        Ok(complement[rng.next_below(complement.len())])
    }

    /// Draws `count` negatives, each excluded from `seen`.
    ///
    /// Duplicates across slots are allowed.
    pub fn sample(
        &self,
        seen: &HashSet<i64>,
        count: usize,
        rng: &mut XorShift64,
    ) -> Result<Vec<i64>, SampleError> {
        let mut negatives = Vec::with_capacity(count);
        for _ in 0..count {
            negatives.push(self.sample_one(seen, rng)?);
        }
        Ok(negatives)
    }

    /// Builds the negative frame for one user's positive rows.
    ///
    /// Every positive row is cloned and its item column overwritten with a
    /// freshly sampled negative identifier; the frame keeps the positive
    /// rows' remaining feature values and carries an implicit label of 0.
    pub fn negative_frame(
        &self,
        rows: &[Vec<f32>],
        seen: &HashSet<i64>,
        item_column: usize,
        rng: &mut XorShift64,
    ) -> Result<Vec<Vec<f32>>, SampleError> {
        let mut frame = Vec::with_capacity(rows.len());
        for row in rows {
            let mut negative = row.clone();
            negative[item_column] = self.sample_one(seen, rng)? as f32;
            frame.push(negative);
        }
        Ok(frame)
    }
}
