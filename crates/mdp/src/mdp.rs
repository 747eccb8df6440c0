//! The hex-world MDP and the Markov chain a policy induces on it.

use serde::{Deserialize, Serialize};

use crate::dist::Dist;
use crate::error::MdpError;
use crate::policy::PolicyMatrix;
use crate::tensor::{RewardMatrix, TransitionTensor};
use crate::{NUM_ACTIONS, PROB_TOLERANCE};

/// Role of a state in the flattened state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    /// Open cell with no payoff; the policy acts here.
    Decision,
    /// Open cell with a payoff; every action routes to the absorbing state.
    Terminal,
    /// Impassable cell; its transition rows are empty.
    Blocked,
    /// The synthetic end-of-episode state.
    Absorbing,
}

/// A finite MDP over `rows * cols` cells plus one absorbing state.
///
/// State `row * cols + col` is the cell at `(row, col)`; the absorbing
/// state is the last index. Both matrices are read-only once built.
///
/// Deserialization goes through [`Mdp::new`]; a serialized `kinds` field
/// is ignored and recomputed from `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MdpParts")]
pub struct Mdp {
    rows: usize,
    cols: usize,
    transitions: TransitionTensor,
    rewards: RewardMatrix,
    kinds: Vec<StateKind>,
}

#[derive(Deserialize)]
struct MdpParts {
    rows: usize,
    cols: usize,
    transitions: TransitionTensor,
    rewards: RewardMatrix,
}

impl TryFrom<MdpParts> for Mdp {
    type Error = MdpError;

    fn try_from(parts: MdpParts) -> Result<Self, Self::Error> {
        Mdp::new(parts.rows, parts.cols, parts.transitions, parts.rewards)
    }
}

impl Mdp {
    /// Wrap externally produced `(T, R)` for a `rows × cols` grid.
    ///
    /// State roles are read off `T`: empty rows mark blocked cells, rows
    /// routing all mass to the absorbing state mark terminal payoffs.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes don't match `rows * cols + 1`
    /// states, if `T` has a row that is not a distribution, if a reward is
    /// not finite, or if any row puts mass on a blocked (empty-row) state.
    pub fn new(
        rows: usize,
        cols: usize,
        transitions: TransitionTensor,
        rewards: RewardMatrix,
    ) -> Result<Self, MdpError> {
        let num_states = rows * cols + 1;
        if transitions.num_states() != num_states {
            return Err(MdpError::ShapeMismatch {
                expected: num_states,
                got: transitions.num_states(),
            });
        }
        if rewards.num_states() != num_states {
            return Err(MdpError::ShapeMismatch {
                expected: num_states,
                got: rewards.num_states(),
            });
        }
        transitions.validate()?;
        rewards.validate()?;

        let kinds = classify(&transitions);
        check_blocked_unreachable(&transitions, &kinds)?;
        Ok(Self {
            rows,
            cols,
            transitions,
            rewards,
            kinds,
        })
    }

    pub(crate) fn from_parts(
        rows: usize,
        cols: usize,
        transitions: TransitionTensor,
        rewards: RewardMatrix,
        kinds: Vec<StateKind>,
    ) -> Self {
        Self {
            rows,
            cols,
            transitions,
            rewards,
            kinds,
        }
    }

    /// Grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of grid cells.
    pub fn num_cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of states, the absorbing state included.
    pub fn num_states(&self) -> usize {
        self.num_cells() + 1
    }

    /// Index of the absorbing terminal state.
    pub fn absorbing_state(&self) -> usize {
        self.num_cells()
    }

    /// `T`.
    pub fn transitions(&self) -> &TransitionTensor {
        &self.transitions
    }

    /// `R`.
    pub fn rewards(&self) -> &RewardMatrix {
        &self.rewards
    }

    /// Role of state `s`.
    pub fn kind(&self, s: usize) -> StateKind {
        self.kinds[s]
    }

    /// Roles of all states.
    pub fn kinds(&self) -> &[StateKind] {
        &self.kinds
    }

    /// Whether `s` is a decision state.
    pub fn is_decision(&self, s: usize) -> bool {
        self.kinds[s] == StateKind::Decision
    }

    /// Whether `s` pays out and routes to the absorbing state.
    pub fn is_terminal(&self, s: usize) -> bool {
        self.kinds[s] == StateKind::Terminal
    }

    /// Decision states in index order.
    pub fn decision_states(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_states()).filter(|&s| self.is_decision(s))
    }

    /// Uniform start distribution over decision states.
    pub fn initial_distribution(&self) -> Result<Dist, MdpError> {
        let weights: Vec<f64> = (0..self.num_states())
            .map(|s| if self.is_decision(s) { 1.0 } else { 0.0 })
            .collect();
        Dist::from_weights(weights).map_err(|_| MdpError::NoDecisionStates)
    }

    /// The Markov chain induced by following `policy`.
    ///
    /// `T_π[s, s'] = Σ_a π(a|s) T[s, a, s']` and `R_π[s] = Σ_a π(a|s) R[s, a]`.
    pub fn induced_kernel(&self, policy: &PolicyMatrix) -> Result<PolicyKernel, MdpError> {
        let n = self.num_states();
        if policy.num_states() != n {
            return Err(MdpError::ShapeMismatch {
                expected: n,
                got: policy.num_states(),
            });
        }

        let mut k = vec![vec![0.0; n]; n];
        let mut rewards = vec![0.0; n];
        for (s, row) in k.iter_mut().enumerate() {
            for a in 0..NUM_ACTIONS {
                let w = policy.prob(s, a);
                if w == 0.0 {
                    continue;
                }
                for (next, p) in self.transitions.successors(s, a) {
                    row[next] += w * p;
                }
                rewards[s] += w * self.rewards.get(s, a);
            }
        }
        Ok(PolicyKernel { k, rewards })
    }
}

fn classify(transitions: &TransitionTensor) -> Vec<StateKind> {
    let n = transitions.num_states();
    let absorbing = n - 1;
    (0..n)
        .map(|s| {
            if s == absorbing {
                StateKind::Absorbing
            } else if (0..NUM_ACTIONS).all(|a| transitions.row_sum(s, a) < PROB_TOLERANCE) {
                StateKind::Blocked
            } else if (0..NUM_ACTIONS)
                .all(|a| (transitions.get(s, a, absorbing) - 1.0).abs() < PROB_TOLERANCE)
            {
                StateKind::Terminal
            } else {
                StateKind::Decision
            }
        })
        .collect()
}

fn check_blocked_unreachable(
    transitions: &TransitionTensor,
    kinds: &[StateKind],
) -> Result<(), MdpError> {
    for s in 0..kinds.len() {
        for a in 0..NUM_ACTIONS {
            if let Some((blocked, _)) = transitions
                .successors(s, a)
                .find(|&(next, _)| kinds[next] == StateKind::Blocked)
            {
                return Err(MdpError::TransitionIntoBlocked {
                    state: s,
                    action: a,
                    blocked,
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Policy-induced chain
// ============================================================================

/// Row-substochastic matrix `T_π` and reward vector `R_π` under a policy.
///
/// Rows of blocked states are all zero; every other row sums to one.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyKernel {
    k: Vec<Vec<f64>>,
    rewards: Vec<f64>,
}

impl PolicyKernel {
    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.k.len()
    }

    /// `T_π[s, next]`.
    pub fn get(&self, s: usize, next: usize) -> f64 {
        self.k[s][next]
    }

    /// Successor distribution of `s`.
    pub fn row(&self, s: usize) -> &[f64] {
        &self.k[s]
    }

    /// Non-zero successors of `s` as `(next, prob)` pairs.
    pub fn successors(&self, s: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.k[s]
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, p)| p > 0.0)
    }

    /// Probability of staying put, i.e. of bouncing off an edge or block.
    pub fn self_transition(&self, s: usize) -> f64 {
        self.k[s][s]
    }

    /// `R_π[s]`.
    pub fn reward(&self, s: usize) -> f64 {
        self.rewards[s]
    }
}
