//! Policy matrices: one action distribution per MDP state.

use hexworld_grid::{HexGrid, HexMove};
use serde::{Deserialize, Serialize};

use crate::dist::Dist;
use crate::error::MdpError;
use crate::NUM_ACTIONS;

/// A `num_states × NUM_ACTIONS` row-stochastic policy matrix.
///
/// A fixed deterministic policy has one-hot rows. States where the choice
/// is irrelevant (terminal payoffs, blocked tiles, the absorbing state)
/// get a uniform row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRows")]
pub struct PolicyMatrix {
    rows: Vec<Dist>,
}

#[derive(Deserialize)]
struct PolicyRows {
    rows: Vec<Dist>,
}

impl TryFrom<PolicyRows> for PolicyMatrix {
    type Error = MdpError;

    fn try_from(raw: PolicyRows) -> Result<Self, Self::Error> {
        PolicyMatrix::from_rows(raw.rows)
    }
}

impl PolicyMatrix {
    /// One-hot rows for the grid's fixed policy, plus the absorbing state.
    pub fn from_grid(grid: &HexGrid) -> Self {
        let actions: Vec<Option<HexMove>> = grid
            .cells()
            .iter()
            .map(|c| c.policy)
            .chain(std::iter::once(None))
            .collect();
        Self::from_actions(&actions)
    }

    /// One row per entry: a point mass where an action is given, uniform otherwise.
    pub fn from_actions(actions: &[Option<HexMove>]) -> Self {
        let rows = actions
            .iter()
            .map(|a| match a {
                Some(m) => Dist::point(NUM_ACTIONS, m.index()),
                None => Dist::uniform(NUM_ACTIONS),
            })
            .collect();
        Self { rows }
    }

    /// Build from explicit action distributions.
    pub fn from_rows(rows: Vec<Dist>) -> Result<Self, MdpError> {
        if let Some(bad) = rows.iter().find(|d| d.len() != NUM_ACTIONS) {
            return Err(MdpError::ShapeMismatch {
                expected: NUM_ACTIONS,
                got: bad.len(),
            });
        }
        Ok(Self { rows })
    }

    /// Mix every row with the uniform distribution.
    ///
    /// With probability `epsilon` the action is uniform at random, so every
    /// action keeps positive probability and sampled trajectories cannot get
    /// stuck in a cycle the deterministic policy never leaves.
    pub fn epsilon_soft(&self, epsilon: f64) -> Result<Self, MdpError> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(MdpError::InvalidEpsilon { epsilon });
        }
        let uniform = Dist::uniform(NUM_ACTIONS);
        let rows = self
            .rows
            .iter()
            .map(|row| row.mix(&uniform, epsilon))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Number of states covered.
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// Action distribution in state `s`.
    pub fn row(&self, s: usize) -> &Dist {
        &self.rows[s]
    }

    /// `π(a | s)`.
    pub fn prob(&self, s: usize, a: usize) -> f64 {
        self.rows[s].p[a]
    }

    /// The action taken in `s` if the row is a point mass.
    pub fn action(&self, s: usize) -> Option<HexMove> {
        self.rows[s].as_point().and_then(HexMove::from_index)
    }

    /// Sample an action in `s` with a uniform draw `u` in `[0, 1)`.
    pub fn sample(&self, s: usize, u: f64) -> HexMove {
        // Rows always have NUM_ACTIONS entries, so the index is in range.
        HexMove::ALL[self.rows[s].sample(u)]
    }
}
