//! Error types for grid construction.

use thiserror::Error;

/// Errors raised while parsing or linking a hex grid.
///
/// All of these are malformed-input errors: they are reported at
/// construction time and the grid is never partially built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The label matrix has no rows or no columns.
    #[error("Grid must have at least one row and one column")]
    EmptyGrid,

    /// A label row has a different length than the first row.
    #[error("Ragged grid: row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// The policy matrix has a different number of rows than the grid.
    #[error("Policy has {got} rows, grid has {expected}")]
    PolicyRowCount { expected: usize, got: usize },

    /// A policy row has a different length than the grid row.
    #[error("Policy row {row} has {got} entries, grid row has {expected}")]
    PolicyShapeMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A decision cell (open, score 0) has no policy action.
    #[error("Missing policy action for decision cell ({row}, {col})")]
    MissingPolicy { row: usize, col: usize },

    /// A label is neither an integer nor the blocked marker.
    #[error("Invalid cell label {label:?} at ({row}, {col})")]
    InvalidLabel {
        row: usize,
        col: usize,
        label: String,
    },

    /// A string could not be parsed as a move direction.
    #[error("Unknown move direction {input:?} (expected one of NW, NE, E, SE, SW, W)")]
    UnknownMove { input: String },
}
