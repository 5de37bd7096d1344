//! Error types for the deeprank-data crate.

use thiserror::Error;

/// Error type for interaction-table construction and slicing.
#[derive(Debug, Error)]
pub enum DataError {
    /// A referenced column name does not exist in the table schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A row's width does not match the table schema.
    #[error("row width mismatch: expected {expected}, got {actual}")]
    RowWidth {
        /// Schema width.
        expected: usize,
        /// Offending row width.
        actual: usize,
    },

    /// A user slice references rows outside the table.
    #[error("slice out of bounds: rows {start}..{end} of {len}")]
    SliceOutOfBounds {
        /// Slice start row.
        start: usize,
        /// Slice end row (exclusive).
        end: usize,
        /// Table length.
        len: usize,
    },
}

/// Error type for negative sampling.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Every item in the universe is already in the seen set, so no negative
    /// exists.
    #[error("item universe exhausted: {seen} seen items cover the universe of {universe}")]
    UniverseExhausted {
        /// Size of the item universe.
        universe: usize,
        /// Size of the seen set.
        seen: usize,
    },
}
