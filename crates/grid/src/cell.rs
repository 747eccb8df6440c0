//! Hexagonal tiles and their stable arena indices.

use serde::{Deserialize, Serialize};

use crate::direction::HexMove;
use crate::lottery::Lottery;

/// Stable index of a cell in the grid arena: `row * cols + col`.
///
/// Indices are assigned before blocked cells are identified, so the
/// arithmetic never shifts around a blocked tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl CellId {
    /// The raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One hexagonal tile.
///
/// Neighbor relations are plain indices into the owning grid, one slot per
/// [`HexMove`]. A slot is `None` when the neighbor would be off-grid or
/// blocked; blocked cells have no neighbors at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Arena index of this cell.
    pub id: CellId,
    /// Grid row.
    pub row: usize,
    /// Grid column.
    pub col: usize,
    /// Reward label: 0 for an ordinary tile, nonzero for a terminal payoff.
    pub score: i64,
    /// Impassable tile.
    pub blocked: bool,
    /// Fixed policy action, present only on decision cells.
    pub policy: Option<HexMove>,
    pub(crate) neighbors: [Option<CellId>; HexMove::COUNT],
}

impl Cell {
    pub(crate) fn new(id: CellId, row: usize, col: usize, score: i64, blocked: bool) -> Self {
        Self {
            id,
            row,
            col,
            score,
            blocked,
            policy: None,
            neighbors: [None; HexMove::COUNT],
        }
    }

    /// The neighbor in direction `m`, if any.
    pub fn neighbor(&self, m: HexMove) -> Option<CellId> {
        self.neighbors[m.index()]
    }

    /// Iterate over the directions that have a neighbor.
    pub fn neighbors(&self) -> impl Iterator<Item = (HexMove, CellId)> + '_ {
        HexMove::ALL
            .into_iter()
            .filter_map(|m| self.neighbor(m).map(|id| (m, id)))
    }

    /// Open tile with a nonzero payoff; entering it ends the episode.
    pub fn is_terminal(&self) -> bool {
        !self.blocked && self.score != 0
    }

    /// Open tile with no payoff, where the policy chooses an action.
    pub fn is_decision(&self) -> bool {
        !self.blocked && self.score == 0
    }

    /// The drift lottery for taking `action` from this cell.
    pub fn reachable_states(&self, action: HexMove) -> Lottery {
        Lottery::drift(self, action)
    }
}
