//! Hex grid construction: label parsing and neighbor linking.
//!
//! The grid is an arena of [`Cell`]s addressed by [`CellId`]. Linking runs
//! once at construction and the result is read-only afterwards, so the
//! cyclic neighbor graph never needs shared ownership.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellId};
use crate::direction::HexMove;
use crate::lottery::{drifted_move, Lottery};
use crate::GridError;

/// Label marking an impassable tile.
pub const BLOCKED_LABEL: &str = "X";

/// A fully linked rectangular hex grid with a fixed policy.
///
/// # Example
///
/// ```rust
/// use hexworld_grid::{HexGrid, HexMove};
///
/// let grid = HexGrid::uniform(&[vec!["1", "2"], vec!["3", "4"]], HexMove::East).unwrap();
/// let top_left = grid.get(0, 0).unwrap();
/// assert_eq!(grid.cell(top_left.neighbor(HexMove::East).unwrap()).score, 2);
/// assert_eq!(grid.cell(top_left.neighbor(HexMove::SouthEast).unwrap()).score, 3);
/// assert!(top_left.neighbor(HexMove::NorthWest).is_none());
/// ```
///
/// Serializes for inspection but does not deserialize: links are only
/// ever produced by construction. Load grids through [`GridSpec`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl HexGrid {
    /// Build a grid from a label matrix and a policy matrix of the same shape.
    ///
    /// Labels are integer literals or [`BLOCKED_LABEL`]. The policy is
    /// required on every decision cell (open, score 0) and ignored
    /// everywhere else.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty or ragged, if the policy shape
    /// differs from the grid, if a label does not parse, or if a decision
    /// cell has no policy action.
    pub fn new<S: AsRef<str>>(
        labels: &[Vec<S>],
        policy: &[Vec<Option<HexMove>>],
    ) -> Result<Self, GridError> {
        let (rows, cols) = check_shape(labels)?;
        if policy.len() != rows {
            return Err(GridError::PolicyRowCount {
                expected: rows,
                got: policy.len(),
            });
        }
        for (row, actions) in policy.iter().enumerate() {
            if actions.len() != cols {
                return Err(GridError::PolicyShapeMismatch {
                    row,
                    expected: cols,
                    got: actions.len(),
                });
            }
        }

        let mut cells = parse_cells(labels, cols)?;
        for cell in cells.iter_mut().filter(|c| c.is_decision()) {
            let action = policy[cell.row][cell.col].ok_or(GridError::MissingPolicy {
                row: cell.row,
                col: cell.col,
            })?;
            cell.policy = Some(action);
        }

        let mut grid = Self { rows, cols, cells };
        grid.link();
        Ok(grid)
    }

    /// Build a grid where every decision cell takes the same action.
    pub fn uniform<S: AsRef<str>>(labels: &[Vec<S>], action: HexMove) -> Result<Self, GridError> {
        let policy: Vec<Vec<Option<HexMove>>> = labels
            .iter()
            .map(|row| vec![Some(action); row.len()])
            .collect();
        Self::new(labels, &policy)
    }

    fn link(&mut self) {
        for idx in 0..self.cells.len() {
            if self.cells[idx].blocked {
                continue;
            }
            let (row, col) = (self.cells[idx].row, self.cells[idx].col);
            for m in HexMove::ALL {
                let target = self
                    .offset_id(row, col, m)
                    .filter(|id| !self.cells[id.index()].blocked);
                self.cells[idx].neighbors[m.index()] = target;
            }
        }
    }

    fn offset_id(&self, row: usize, col: usize, m: HexMove) -> Option<CellId> {
        let (dr, dc) = m.offset(row);
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < self.rows && c < self.cols).then(|| self.id(r, c))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells, blocked ones included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Arena index of `(row, col)`. Does not bounds-check.
    pub fn id(&self, row: usize, col: usize) -> CellId {
        CellId(row * self.cols + col)
    }

    /// The cell at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this grid.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// The cell at `(row, col)`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells where the policy acts (open, score 0).
    pub fn decision_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_decision())
    }

    /// Neighbor of `id` in direction `m`.
    pub fn neighbor(&self, id: CellId, m: HexMove) -> Option<CellId> {
        self.cell(id).neighbor(m)
    }

    /// Drift lottery for taking `action` from `id`.
    pub fn reachable_states(&self, id: CellId, action: HexMove) -> Lottery {
        self.cell(id).reachable_states(action)
    }

    /// Sample one noisy move using a uniform draw `u` in `[0, 1)`.
    ///
    /// Returns the landing cell, or `None` if the move bounced.
    pub fn sample_move(&self, id: CellId, action: HexMove, u: f64) -> Option<CellId> {
        self.neighbor(id, drifted_move(action, u))
    }
}

fn check_shape<S: AsRef<str>>(labels: &[Vec<S>]) -> Result<(usize, usize), GridError> {
    let cols = labels.first().map(Vec::len).unwrap_or(0);
    if cols == 0 {
        return Err(GridError::EmptyGrid);
    }
    for (row, cells) in labels.iter().enumerate() {
        if cells.len() != cols {
            return Err(GridError::RaggedRow {
                row,
                expected: cols,
                got: cells.len(),
            });
        }
    }
    Ok((labels.len(), cols))
}

fn parse_cells<S: AsRef<str>>(labels: &[Vec<S>], cols: usize) -> Result<Vec<Cell>, GridError> {
    let mut cells = Vec::with_capacity(labels.len() * cols);
    for (row, line) in labels.iter().enumerate() {
        for (col, label) in line.iter().enumerate() {
            let label = label.as_ref().trim();
            let id = CellId(row * cols + col);
            let cell = if label.eq_ignore_ascii_case(BLOCKED_LABEL) {
                Cell::new(id, row, col, 0, true)
            } else {
                let score = label.parse::<i64>().map_err(|_| GridError::InvalidLabel {
                    row,
                    col,
                    label: label.to_string(),
                })?;
                Cell::new(id, row, col, score, false)
            };
            cells.push(cell);
        }
    }
    Ok(cells)
}

// ============================================================================
// Serializable grid description
// ============================================================================

/// A serde-friendly grid description.
///
/// `policy` may be left empty when `default_move` is set, in which case
/// every decision cell takes that move.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Cell labels, row-major.
    pub labels: Vec<Vec<String>>,
    /// Per-cell policy actions.
    #[serde(default)]
    pub policy: Vec<Vec<Option<HexMove>>>,
    /// Action used for every cell when `policy` is empty.
    #[serde(default)]
    pub default_move: Option<HexMove>,
}

impl GridSpec {
    /// Parse the labels and policy and link the grid.
    pub fn build(&self) -> Result<HexGrid, GridError> {
        match (self.policy.is_empty(), self.default_move) {
            (true, Some(action)) => HexGrid::uniform(&self.labels, action),
            _ => HexGrid::new(&self.labels, &self.policy),
        }
    }
}
