//! Dense transition tensor and reward matrix.
//!
//! `T[s, a, s']` is stored flat in `(s, a, s')` row-major order, so the
//! distribution over successors for one `(s, a)` pair is a contiguous
//! slice. Each such row is either a probability distribution or all zeros
//! (a blocked cell that never takes part in the process).

use serde::{Deserialize, Serialize};

use crate::error::MdpError;
use crate::{NUM_ACTIONS, PROB_TOLERANCE};

/// Transition probabilities of shape `(num_states, NUM_ACTIONS, num_states)`.
///
/// Deserialization runs the same checks as [`TransitionTensor::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlatMatrix")]
pub struct TransitionTensor {
    num_states: usize,
    data: Vec<f64>,
}

/// Wire form shared by both matrices, checked on the way in.
#[derive(Deserialize)]
struct FlatMatrix {
    num_states: usize,
    data: Vec<f64>,
}

impl TryFrom<FlatMatrix> for TransitionTensor {
    type Error = MdpError;

    fn try_from(raw: FlatMatrix) -> Result<Self, Self::Error> {
        let tensor = Self {
            num_states: raw.num_states,
            data: raw.data,
        };
        tensor.validate()?;
        Ok(tensor)
    }
}

impl TransitionTensor {
    /// An all-zero tensor.
    pub fn zeros(num_states: usize) -> Self {
        Self {
            num_states,
            data: vec![0.0; num_states * NUM_ACTIONS * num_states],
        }
    }

    /// Build a tensor from nested rows `t[s][a][s']`.
    ///
    /// # Errors
    ///
    /// Returns an error if the nesting is not
    /// `num_states × NUM_ACTIONS × num_states`, or if any `(s, a)` row
    /// has negative entries or sums to something other than 0 or 1.
    pub fn from_rows(t: Vec<Vec<Vec<f64>>>) -> Result<Self, MdpError> {
        let num_states = t.len();
        let mut tensor = Self::zeros(num_states);
        for (s, actions) in t.into_iter().enumerate() {
            if actions.len() != NUM_ACTIONS {
                return Err(MdpError::ShapeMismatch {
                    expected: NUM_ACTIONS,
                    got: actions.len(),
                });
            }
            for (a, row) in actions.into_iter().enumerate() {
                if row.len() != num_states {
                    return Err(MdpError::ShapeMismatch {
                        expected: num_states,
                        got: row.len(),
                    });
                }
                tensor.row_mut(s, a).copy_from_slice(&row);
            }
        }
        tensor.validate()?;
        Ok(tensor)
    }

    /// Check the storage length, then every `(s, a)` row: non-negative,
    /// summing to 0 or 1.
    pub fn validate(&self) -> Result<(), MdpError> {
        let expected = self.num_states * NUM_ACTIONS * self.num_states;
        if self.data.len() != expected {
            return Err(MdpError::ShapeMismatch {
                expected,
                got: self.data.len(),
            });
        }
        for s in 0..self.num_states {
            for a in 0..NUM_ACTIONS {
                let row = self.row(s, a);
                if row.iter().any(|&p| p < -PROB_TOLERANCE) {
                    return Err(MdpError::NegativeProbability);
                }
                let sum = self.row_sum(s, a);
                if sum.abs() > PROB_TOLERANCE && (sum - 1.0).abs() > PROB_TOLERANCE {
                    return Err(MdpError::RowNotNormalized {
                        state: s,
                        action: a,
                        sum,
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of states, the absorbing state included.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    fn offset(&self, s: usize, a: usize) -> usize {
        (s * NUM_ACTIONS + a) * self.num_states
    }

    /// `T[s, a, next]`.
    pub fn get(&self, s: usize, a: usize, next: usize) -> f64 {
        self.data[self.offset(s, a) + next]
    }

    /// Successor distribution for `(s, a)`.
    pub fn row(&self, s: usize, a: usize) -> &[f64] {
        let start = self.offset(s, a);
        &self.data[start..start + self.num_states]
    }

    pub(crate) fn row_mut(&mut self, s: usize, a: usize) -> &mut [f64] {
        let start = self.offset(s, a);
        let n = self.num_states;
        &mut self.data[start..start + n]
    }

    pub(crate) fn add(&mut self, s: usize, a: usize, next: usize, prob: f64) {
        let i = self.offset(s, a) + next;
        self.data[i] += prob;
    }

    /// Total probability mass of the `(s, a)` row.
    pub fn row_sum(&self, s: usize, a: usize) -> f64 {
        self.row(s, a).iter().sum()
    }

    /// Non-zero successors of `(s, a)` as `(next, prob)` pairs.
    pub fn successors(&self, s: usize, a: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.row(s, a)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, p)| p > 0.0)
    }

    /// Sample a successor of `(s, a)` with a uniform draw `u` in `[0, 1)`.
    ///
    /// Same inverse-transform rule as [`crate::Dist::sample`]. Returns
    /// `None` for an empty row.
    pub fn sample_next(&self, s: usize, a: usize, u: f64) -> Option<usize> {
        let mut cumsum = 0.0;
        let mut last = None;
        for (next, p) in self.successors(s, a) {
            cumsum += p;
            last = Some(next);
            if u < cumsum {
                return last;
            }
        }
        last
    }
}

/// Immediate rewards of shape `(num_states, NUM_ACTIONS)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlatMatrix")]
pub struct RewardMatrix {
    num_states: usize,
    data: Vec<f64>,
}

impl TryFrom<FlatMatrix> for RewardMatrix {
    type Error = MdpError;

    fn try_from(raw: FlatMatrix) -> Result<Self, Self::Error> {
        let rewards = Self {
            num_states: raw.num_states,
            data: raw.data,
        };
        rewards.validate()?;
        Ok(rewards)
    }
}

impl RewardMatrix {
    /// An all-zero reward matrix.
    pub fn zeros(num_states: usize) -> Self {
        Self {
            num_states,
            data: vec![0.0; num_states * NUM_ACTIONS],
        }
    }

    /// Build from nested rows `r[s][a]`.
    pub fn from_rows(r: Vec<Vec<f64>>) -> Result<Self, MdpError> {
        let num_states = r.len();
        let mut data = Vec::with_capacity(num_states * NUM_ACTIONS);
        for row in r {
            if row.len() != NUM_ACTIONS {
                return Err(MdpError::ShapeMismatch {
                    expected: NUM_ACTIONS,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        let rewards = Self { num_states, data };
        rewards.validate()?;
        Ok(rewards)
    }

    /// Check that storage holds `num_states × NUM_ACTIONS` finite rewards.
    pub fn validate(&self) -> Result<(), MdpError> {
        let expected = self.num_states * NUM_ACTIONS;
        if self.data.len() != expected {
            return Err(MdpError::ShapeMismatch {
                expected,
                got: self.data.len(),
            });
        }
        if let Some(i) = self.data.iter().position(|r| !r.is_finite()) {
            return Err(MdpError::NonFiniteReward {
                state: i / NUM_ACTIONS,
                action: i % NUM_ACTIONS,
            });
        }
        Ok(())
    }

    /// Number of states, the absorbing state included.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// `R[s, a]`.
    pub fn get(&self, s: usize, a: usize) -> f64 {
        self.data[s * NUM_ACTIONS + a]
    }

    /// All action rewards for state `s`.
    pub fn row(&self, s: usize) -> &[f64] {
        &self.data[s * NUM_ACTIONS..(s + 1) * NUM_ACTIONS]
    }

    pub(crate) fn set(&mut self, s: usize, a: usize, reward: f64) {
        self.data[s * NUM_ACTIONS + a] = reward;
    }
}
