//! Grid-shaped view of evaluator output.

use std::fmt;

use hexworld_grid::HexGrid;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Flat row-major values reshaped to the grid.
///
/// Non-decision cells hold `f64::INFINITY` and print as `inf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ValueTable {
    /// Wrap `values` for a `rows × cols` grid.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, EvalError> {
        if values.len() != rows * cols {
            return Err(EvalError::ShapeMismatch {
                expected: rows * cols,
                got: values.len(),
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Wrap `values` using the shape of `grid`.
    pub fn for_grid(grid: &HexGrid, values: Vec<f64>) -> Result<Self, EvalError> {
        Self::new(grid.rows(), grid.cols(), values)
    }

    /// Grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    /// One grid row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// The flat values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Give back the flat values.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Largest absolute difference over cells finite in both tables.
    ///
    /// Returns `None` when the shapes differ.
    pub fn max_abs_diff(&self, other: &ValueTable) -> Option<f64> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }
        let diff = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        Some(diff)
    }
}

impl fmt::Display for ValueTable {
    /// Odd rows are indented half a cell, like the hex layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r % 2 == 1 {
                write!(f, "    ")?;
            }
            for (c, v) in self.row(r).iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v:>7.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
