//! Bounded-depth recursion over `(T, R)` indices.
//!
//! The same unrolling as [`crate::lookahead`], but driven by the policy's
//! induced chain `T_π` instead of cell references. A bounce shows up as
//! self-transition mass and pays the edge penalty; terminal-producing
//! states are recognised by their routing to the absorbing state, not by
//! a nonzero reward, since edge penalties are nonzero too. Like the graph
//! version it runs as a backward sweep over depth layers.

use hexworld_mdp::{Mdp, PolicyKernel, PolicyMatrix, StateKind, EDGE_PENALTY};
use log::debug;

use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::lookahead::backward_sweep;

/// Policy evaluation by recursion on state indices.
#[derive(Debug, Clone)]
pub struct MatrixLookahead<'m> {
    mdp: &'m Mdp,
    chain: PolicyKernel,
    config: EvalConfig,
}

impl<'m> MatrixLookahead<'m> {
    /// Bind `policy` and `config` to `mdp`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or `policy` does not cover
    /// every state.
    pub fn new(mdp: &'m Mdp, policy: &PolicyMatrix, config: EvalConfig) -> Result<Self, EvalError> {
        config.validate()?;
        let chain = mdp.induced_kernel(policy)?;
        Ok(Self { mdp, chain, config })
    }

    /// The induced chain being unrolled.
    pub fn chain(&self) -> &PolicyKernel {
        &self.chain
    }

    /// `V(s)` at depth 0.
    ///
    /// # Panics
    ///
    /// Panics if the chain moves a decision state into a blocked state.
    pub fn value(&self, s: usize) -> f64 {
        self.sweep()[s]
    }

    /// Values of all cells in row-major order; non-decision cells report
    /// `f64::INFINITY`.
    pub fn evaluate(&self) -> Vec<f64> {
        let swept = self.sweep();
        let values = (0..self.mdp.num_cells())
            .map(|s| {
                if self.mdp.is_decision(s) {
                    swept[s]
                } else {
                    f64::INFINITY
                }
            })
            .collect();
        debug!(
            "matrix lookahead over {} states: horizon {}, gamma {}",
            self.mdp.num_states(),
            self.config.horizon,
            self.config.gamma
        );
        values
    }

    fn sweep(&self) -> Vec<f64> {
        backward_sweep(self.mdp.num_states(), self.config.horizon, |next, out| {
            for (s, v) in out.iter_mut().enumerate() {
                *v = match self.mdp.kind(s) {
                    StateKind::Decision => self.expand(s, next),
                    StateKind::Terminal => self.chain.reward(s),
                    StateKind::Absorbing | StateKind::Blocked => 0.0,
                };
            }
        })
    }

    fn expand(&self, s: usize, next: &[f64]) -> f64 {
        let mut total = 0.0;
        for (to, p) in self.chain.successors(s) {
            if self.mdp.kind(to) == StateKind::Blocked {
                panic!("matrix lookahead reached blocked state {to}");
            }
            if to == s {
                total += p * EDGE_PENALTY;
            }
            total += p * next[to];
        }
        self.config.gamma * total
    }
}

/// Matrix-recursion values of every cell under `policy` and `config`.
pub fn recursive_policy_evaluation(
    mdp: &Mdp,
    policy: &PolicyMatrix,
    config: EvalConfig,
) -> Result<Vec<f64>, EvalError> {
    Ok(MatrixLookahead::new(mdp, policy, config)?.evaluate())
}
