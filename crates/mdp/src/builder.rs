//! Converting a linked hex grid into `(T, R)`.

use hexworld_grid::{HexGrid, HexMove};
use log::debug;

use crate::mdp::{Mdp, StateKind};
use crate::tensor::{RewardMatrix, TransitionTensor};
use crate::EDGE_PENALTY;

impl Mdp {
    /// Build the transition tensor and reward matrix for `grid`.
    ///
    /// - Terminal cells route every action to the absorbing state with
    ///   probability 1 and pay their score for every action.
    /// - Decision cells spread each action over its drift lottery; a
    ///   bounced branch becomes a self-transition. Actions whose nominal
    ///   neighbor is missing pay [`EDGE_PENALTY`].
    /// - Blocked cells keep empty rows and zero rewards.
    /// - The absorbing state loops to itself with reward 0.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hexworld_grid::{HexGrid, HexMove};
    /// use hexworld_mdp::Mdp;
    ///
    /// let grid = HexGrid::uniform(&[vec!["0", "10"]], HexMove::East).unwrap();
    /// let mdp = Mdp::from_grid(&grid);
    /// let east = HexMove::East.index();
    ///
    /// assert_eq!(mdp.num_states(), 3);
    /// assert!((mdp.transitions().get(0, east, 1) - 0.7).abs() < 1e-12);
    /// assert!((mdp.transitions().get(0, east, 0) - 0.3).abs() < 1e-12);
    /// assert_eq!(mdp.rewards().get(1, east), 10.0);
    /// ```
    pub fn from_grid(grid: &HexGrid) -> Self {
        let num_cells = grid.len();
        let absorbing = num_cells;
        let num_states = num_cells + 1;

        let mut t = TransitionTensor::zeros(num_states);
        let mut r = RewardMatrix::zeros(num_states);
        let mut kinds = Vec::with_capacity(num_states);

        for cell in grid.cells() {
            let s = cell.id.index();
            if cell.blocked {
                kinds.push(StateKind::Blocked);
                continue;
            }

            if cell.is_terminal() {
                kinds.push(StateKind::Terminal);
                for m in HexMove::ALL {
                    t.add(s, m.index(), absorbing, 1.0);
                    r.set(s, m.index(), cell.score as f64);
                }
                continue;
            }

            kinds.push(StateKind::Decision);
            for m in HexMove::ALL {
                for outcome in &cell.reachable_states(m) {
                    let next = outcome.next.map_or(s, |id| id.index());
                    t.add(s, m.index(), next, outcome.prob);
                }
                if cell.neighbor(m).is_none() {
                    r.set(s, m.index(), EDGE_PENALTY);
                }
            }
        }

        kinds.push(StateKind::Absorbing);
        for m in HexMove::ALL {
            t.add(absorbing, m.index(), absorbing, 1.0);
        }

        debug_assert!(t.validate().is_ok(), "hex-world transition rows must be stochastic");
        debug!(
            "built hex-world MDP: {}x{} grid, {} states, {} decision",
            grid.rows(),
            grid.cols(),
            num_states,
            kinds.iter().filter(|k| **k == StateKind::Decision).count()
        );

        Mdp::from_parts(grid.rows(), grid.cols(), t, r, kinds)
    }
}
