//! Closed-form policy evaluation.
//!
//! Restricting the Bellman equation to decision states `N`, with the
//! terminal-producing states `K` as fixed boundary values, gives
//!
//! ```text
//! (I - γ T_NN) V_N = γ (-diag(T_NN) + T_NK v_K)
//! ```
//!
//! where `diag(T_NN)` is the bounce mass of each state (each bounce pays
//! the edge penalty) and `v_K` are the terminal scores. This is the
//! infinite-horizon limit of the bounded recursions.

use std::collections::HashMap;

use hexworld_mdp::{Mdp, PolicyKernel, PolicyMatrix, StateKind, EDGE_PENALTY};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::reach::trapped_states;

/// Solves the Bellman linear system for a fixed policy.
#[derive(Debug, Clone)]
pub struct LinearEvaluator<'m> {
    mdp: &'m Mdp,
    chain: PolicyKernel,
    gamma: f64,
}

impl<'m> LinearEvaluator<'m> {
    /// Bind `policy` to `mdp`; only `config.gamma` is used.
    pub fn new(mdp: &'m Mdp, policy: &PolicyMatrix, config: EvalConfig) -> Result<Self, EvalError> {
        config.validate()?;
        let chain = mdp.induced_kernel(policy)?;
        Ok(Self {
            mdp,
            chain,
            gamma: config.gamma,
        })
    }

    /// `(I - γ T_NN)` and the right-hand side, in decision-state order.
    pub fn system(&self) -> (Vec<usize>, DMatrix<f64>, DVector<f64>) {
        let decision: Vec<usize> = self.mdp.decision_states().collect();
        let row_of: HashMap<usize, usize> =
            decision.iter().enumerate().map(|(i, &s)| (s, i)).collect();

        let n = decision.len();
        let gamma = self.gamma;
        let mut a = DMatrix::<f64>::identity(n, n);
        let mut b = DVector::<f64>::zeros(n);

        for (i, &s) in decision.iter().enumerate() {
            for (next, p) in self.chain.successors(s) {
                match self.mdp.kind(next) {
                    StateKind::Decision => a[(i, row_of[&next])] -= gamma * p,
                    StateKind::Terminal => b[i] += gamma * p * self.chain.reward(next),
                    StateKind::Absorbing => {}
                    StateKind::Blocked => {
                        panic!("decision state {s} routes onto blocked state {next}")
                    }
                }
                if next == s {
                    b[i] += gamma * p * EDGE_PENALTY;
                }
            }
        }
        (decision, a, b)
    }

    /// Values of all cells in row-major order; non-decision cells report
    /// `f64::INFINITY`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Singular`] when the system cannot be solved:
    /// with `gamma == 1` because some decision states never reach a
    /// terminal, or when the LU factorization breaks down.
    pub fn evaluate(&self) -> Result<Vec<f64>, EvalError> {
        if self.gamma >= 1.0 {
            let trapped = trapped_states(self.mdp, &self.chain);
            if !trapped.is_empty() {
                warn!(
                    "undiscounted solve: {} decision states never terminate",
                    trapped.len()
                );
                return Err(EvalError::Singular { states: trapped });
            }
        }

        let (decision, a, b) = self.system();
        let mut values = vec![f64::INFINITY; self.mdp.num_cells()];
        if decision.is_empty() {
            return Ok(values);
        }

        let solution = a
            .lu()
            .solve(&b)
            .filter(|x| x.iter().all(|v| v.is_finite()))
            .ok_or_else(|| EvalError::Singular {
                states: decision.clone(),
            })?;

        for (i, &s) in decision.iter().enumerate() {
            values[s] = solution[i];
        }
        debug!(
            "closed-form solve: {} decision states, gamma {}",
            decision.len(),
            self.gamma
        );
        Ok(values)
    }
}

/// Closed-form values of every cell under `policy`.
pub fn solve_policy(
    mdp: &Mdp,
    policy: &PolicyMatrix,
    config: EvalConfig,
) -> Result<Vec<f64>, EvalError> {
    LinearEvaluator::new(mdp, policy, config)?.evaluate()
}
