//! Positive-interaction table and per-user batching.
//!
//! The table holds one feature row per observed positive interaction, sorted
//! so that each user's rows are contiguous. Training never iterates rows
//! directly; it iterates [`UserSlice`]s — `(user, start, end)` triples that
//! reference a row range — grouped into shuffled batches.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DataError;
use crate::rng::XorShift64;

/// A contiguous range of one user's positive rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserSlice {
    /// User identifier.
    pub user_id: i64,
    /// First row index (inclusive).
    pub start: usize,
    /// Last row index (exclusive).
    pub end: usize,
}

impl UserSlice {
    /// Number of positive rows in this slice.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the slice covers no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Table of positive interactions, one numeric feature row per interaction.
///
/// All rows carry an implicit label of 1; negatives are derived by cloning
/// rows and overwriting the item column (see
/// [`crate::sampler::UniformNegativeSampler`]). Rows must be appended grouped
/// by user: the user column changing value starts a new [`UserSlice`].
///
/// # Example
///
/// ```
/// use deeprank_data::table::InteractionTable;
///
/// let mut table = InteractionTable::new(
///     vec!["user_id".into(), "item_id".into()],
///     "user_id",
///     "item_id",
/// )
/// .unwrap();
/// table.push_row(vec![1.0, 10.0]).unwrap();
/// table.push_row(vec![1.0, 11.0]).unwrap();
/// table.push_row(vec![2.0, 10.0]).unwrap();
///
/// let slices = table.user_slices();
/// assert_eq!(slices.len(), 2);
/// assert_eq!(slices[0].len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionTable {
    columns: Vec<String>,
    user_column: usize,
    item_column: usize,
    rows: Vec<Vec<f32>>,
}

impl InteractionTable {
    /// Creates an empty table with the given schema.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownColumn`] if `user_column` or
    /// `item_column` is not in `columns`.
    pub fn new(
        columns: Vec<String>,
        user_column: &str,
        item_column: &str,
    ) -> Result<Self, DataError> {
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
        };
        let user_column = find(user_column)?;
        let item_column = find(item_column)?;
        Ok(Self {
            columns,
            user_column,
            item_column,
            rows: Vec::new(),
        })
    }

    /// Appends one interaction row.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::RowWidth`] if the row width does not match the
    /// schema.
    pub fn push_row(&mut self, row: Vec<f32>) -> Result<(), DataError> {
        if row.len() != self.columns.len() {
            return Err(DataError::RowWidth {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of feature columns per row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the item column.
    pub fn item_column(&self) -> usize {
        self.item_column
    }

    /// Index of the user column.
    pub fn user_column(&self) -> usize {
        self.user_column
    }

    /// Returns the rows referenced by a user slice.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::SliceOutOfBounds`] if the slice exceeds the
    /// table.
    pub fn slice(&self, slice: &UserSlice) -> Result<&[Vec<f32>], DataError> {
        if slice.start > slice.end || slice.end > self.rows.len() {
            return Err(DataError::SliceOutOfBounds {
                start: slice.start,
                end: slice.end,
                len: self.rows.len(),
            });
        }
        Ok(&self.rows[slice.start..slice.end])
    }

    /// Collects the distinct item identifiers of a user slice.
    pub fn seen_items(&self, slice: &UserSlice) -> Result<HashSet<i64>, DataError> {
        let rows = self.slice(slice)?;
        Ok(rows
            .iter()
            .map(|row| row[self.item_column] as i64)
            .collect())
    }

    /// Groups contiguous rows with the same user-column value into slices.
    ///
    /// Rows are taken in storage order; a user appearing in two separate
    /// runs yields two slices, mirroring the row-range contract of the
    /// training loop.
    pub fn user_slices(&self) -> Vec<UserSlice> {
        let mut slices = Vec::new();
        let mut start = 0usize;
        for i in 0..self.rows.len() {
            let user = self.rows[i][self.user_column] as i64;
            let next_differs = i + 1 == self.rows.len()
                || self.rows[i + 1][self.user_column] as i64 != user;
            if next_differs {
                slices.push(UserSlice {
                    user_id: user,
                    start,
                    end: i + 1,
                });
                start = i + 1;
            }
        }
        slices
    }
}

/// Groups user slices into batches of at most `batch_size` users.
///
/// With `shuffle` set, the slice order is permuted with the caller's RNG
/// before grouping, as at the start of each training epoch.
///
/// # Panics
///
/// Panics if `batch_size` is zero.
pub fn build_batches(
    slices: &[UserSlice],
    batch_size: usize,
    shuffle: bool,
    rng: &mut XorShift64,
) -> Vec<Vec<UserSlice>> {
    assert!(batch_size > 0, "batch_size must be positive");
    let mut ordered: Vec<UserSlice> = slices.to_vec();
    if shuffle {
        rng.shuffle(&mut ordered);
    }
    ordered
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}
