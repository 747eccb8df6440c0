//! First-visit Monte Carlo policy evaluation.
//!
//! Trajectories start from the uniform prior over decision states, pick
//! actions from the policy matrix and successors from the transition
//! tensor, and stop on reaching the absorbing state. Walking a trajectory
//! backwards builds the return:
//!
//! ```text
//! terminal step:  G = R[s, a]
//! decision step:  G = γ (G + penalty),  penalty = -1 if the step bounced
//! ```
//!
//! which is the sampled counterpart of the lookahead recursion. Each
//! decision state records `G` at its first visit only, and its estimate is
//! the mean over every trajectory that visited it.
//!
//! Trajectories that run past `max_steps` are discarded. A deterministic
//! policy can cycle forever in a closed region, and
//! [`PolicyMatrix::epsilon_soft`] is the usual remedy.

use std::collections::HashMap;

use hexworld_grid::HexMove;
use hexworld_mdp::{Dist, Mdp, MdpError, PolicyMatrix, StateKind, EDGE_PENALTY};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MonteCarloConfig;
use crate::error::EvalError;

/// One transition of a sampled trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: usize,
    pub action: HexMove,
    pub next: usize,
}

impl Step {
    /// The agent stayed in place.
    pub fn bounced(&self) -> bool {
        self.state == self.next
    }
}

/// A trajectory that reached the absorbing state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub steps: Vec<Step>,
}

impl Trajectory {
    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `(state, action)` pairs in order.
    pub fn state_actions(&self) -> impl Iterator<Item = (usize, HexMove)> + '_ {
        self.steps.iter().map(|step| (step.state, step.action))
    }
}

/// Result of one sampling round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryBatch {
    /// Terminated trajectories.
    pub trajectories: Vec<Trajectory>,
    /// Trajectories dropped for exceeding the step cap.
    pub discarded: usize,
}

/// Sample `batch_size` trajectories; drop any still running after `max_steps`.
///
/// # Errors
///
/// Returns an error if `policy` or `start` do not cover every state.
pub fn sample_trajectories<R: Rng + ?Sized>(
    mdp: &Mdp,
    policy: &PolicyMatrix,
    start: &Dist,
    batch_size: usize,
    max_steps: usize,
    rng: &mut R,
) -> Result<TrajectoryBatch, EvalError> {
    check_len(mdp, policy.num_states())?;
    check_len(mdp, start.len())?;

    let absorbing = mdp.absorbing_state();
    let mut batch = TrajectoryBatch::default();

    for _ in 0..batch_size {
        let mut state = start.sample(rng.gen());
        let mut trajectory = Trajectory::default();

        while state != absorbing && trajectory.len() < max_steps {
            let action = policy.sample(state, rng.gen());
            let next = mdp
                .transitions()
                .sample_next(state, action.index(), rng.gen())
                .unwrap_or_else(|| panic!("trajectory entered blocked state {state}"));
            trajectory.steps.push(Step {
                state,
                action,
                next,
            });
            state = next;
        }

        if state == absorbing {
            trace!("trajectory terminated after {} steps", trajectory.len());
            batch.trajectories.push(trajectory);
        } else {
            trace!("trajectory discarded at step cap {max_steps}");
            batch.discarded += 1;
        }
    }
    Ok(batch)
}

fn check_len(mdp: &Mdp, got: usize) -> Result<(), EvalError> {
    if got == mdp.num_states() {
        Ok(())
    } else {
        Err(MdpError::ShapeMismatch {
            expected: mdp.num_states(),
            got,
        }
        .into())
    }
}

/// Per-cell output of [`first_visit_monte_carlo`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloEstimate {
    /// Mean first-visit return per cell, row-major. Non-decision cells are
    /// `f64::INFINITY`; decision cells never visited are `NaN`.
    pub values: Vec<f64>,
    /// Number of first visits recorded per cell.
    pub visits: Vec<usize>,
    /// Trajectories that terminated and contributed returns.
    pub completed: usize,
    /// Trajectories discarded at the step cap.
    pub discarded: usize,
}

impl MonteCarloEstimate {
    /// Share of sampled trajectories that were discarded.
    pub fn discard_rate(&self) -> f64 {
        let total = self.completed + self.discarded;
        if total == 0 {
            0.0
        } else {
            self.discarded as f64 / total as f64
        }
    }
}

/// Estimate the policy's value by first-visit return averaging.
///
/// # Example
///
/// ```rust
/// use hexworld_eval::{first_visit_monte_carlo, MonteCarloConfig};
/// use hexworld_grid::{HexGrid, HexMove};
/// use hexworld_mdp::{Mdp, PolicyMatrix};
///
/// let grid = HexGrid::uniform(&[vec!["0", "10"]], HexMove::East).unwrap();
/// let mdp = Mdp::from_grid(&grid);
/// let config = MonteCarloConfig::default().with_iterations(100);
/// let estimate = first_visit_monte_carlo(&mdp, &PolicyMatrix::from_grid(&grid), &config).unwrap();
///
/// assert_eq!(estimate.discarded, 0);
/// assert!(estimate.values[0] > 7.0 && estimate.values[0] < 10.0);
/// ```
pub fn first_visit_monte_carlo(
    mdp: &Mdp,
    policy: &PolicyMatrix,
    config: &MonteCarloConfig,
) -> Result<MonteCarloEstimate, EvalError> {
    config.validate()?;
    let start = mdp.initial_distribution()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut returns: Vec<Vec<f64>> = vec![Vec::new(); mdp.num_cells()];
    let mut completed = 0;
    let mut discarded = 0;

    for _ in 0..config.iterations {
        let batch = sample_trajectories(
            mdp,
            policy,
            &start,
            config.batch_size,
            config.max_steps,
            &mut rng,
        )?;
        discarded += batch.discarded;
        for trajectory in &batch.trajectories {
            record_first_visits(mdp, trajectory, config.gamma, &mut returns);
        }
        completed += batch.trajectories.len();
    }

    if discarded > 0 {
        warn!(
            "discarded {discarded} of {} trajectories at the {}-step cap",
            config.num_trajectories(),
            config.max_steps
        );
    }

    let visits: Vec<usize> = returns.iter().map(Vec::len).collect();
    let values = (0..mdp.num_cells())
        .map(|s| {
            if !mdp.is_decision(s) {
                f64::INFINITY
            } else if returns[s].is_empty() {
                f64::NAN
            } else {
                returns[s].iter().sum::<f64>() / returns[s].len() as f64
            }
        })
        .collect();
    debug!(
        "monte carlo: {completed} trajectories completed, gamma {}",
        config.gamma
    );

    Ok(MonteCarloEstimate {
        values,
        visits,
        completed,
        discarded,
    })
}

fn record_first_visits(mdp: &Mdp, trajectory: &Trajectory, gamma: f64, returns: &mut [Vec<f64>]) {
    let mut first_visit: HashMap<usize, usize> = HashMap::new();
    for (t, step) in trajectory.steps.iter().enumerate() {
        first_visit.entry(step.state).or_insert(t);
    }

    let mut g = 0.0;
    for (t, step) in trajectory.steps.iter().enumerate().rev() {
        match mdp.kind(step.state) {
            StateKind::Terminal => {
                g = mdp.rewards().get(step.state, step.action.index());
                continue;
            }
            StateKind::Decision => {
                let penalty = if step.bounced() { EDGE_PENALTY } else { 0.0 };
                g = gamma * (g + penalty);
            }
            StateKind::Absorbing | StateKind::Blocked => continue,
        }
        if first_visit.get(&step.state) == Some(&t) {
            returns[step.state].push(g);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexworld_grid::HexGrid;

    fn corridor() -> (HexGrid, Mdp) {
        let grid = HexGrid::uniform(&[vec!["0", "10"]], HexMove::East).unwrap();
        let mdp = Mdp::from_grid(&grid);
        (grid, mdp)
    }

    #[test]
    fn test_trajectories_end_in_absorbing() {
        let (grid, mdp) = corridor();
        let start = mdp.initial_distribution().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let batch = sample_trajectories(
            &mdp,
            &PolicyMatrix::from_grid(&grid),
            &start,
            50,
            100,
            &mut rng,
        )
        .unwrap();
        assert_eq!(batch.trajectories.len(), 50);
        for trajectory in &batch.trajectories {
            assert_eq!(trajectory.steps[0].state, 0);
            let last = trajectory.steps.last().unwrap();
            assert_eq!((last.state, last.next), (1, 2));
            assert!(trajectory
                .state_actions()
                .filter(|&(s, _)| s == 0)
                .all(|(_, a)| a == HexMove::East));
        }
    }

    #[test]
    fn test_return_with_bounces() {
        // 0 bounces twice, then reaches the goal at 1.
        let (_, mdp) = corridor();
        let step = |state, next| Step {
            state,
            action: HexMove::East,
            next,
        };
        let trajectory = Trajectory {
            steps: vec![step(0, 0), step(0, 0), step(0, 1), step(1, 2)],
        };
        let gamma = 0.5;
        let mut returns = vec![Vec::new(); 2];
        record_first_visits(&mdp, &trajectory, gamma, &mut returns);

        let g2 = gamma * 10.0;
        let g1 = gamma * (g2 - 1.0);
        let g0 = gamma * (g1 - 1.0);
        assert_eq!(returns[0], vec![g0]);
        assert!(returns[1].is_empty());
    }

    #[test]
    fn test_step_cap_discards() {
        // All-west from 0 only ever bounces.
        let grid = HexGrid::uniform(&[vec!["0", "10"]], HexMove::West).unwrap();
        let mdp = Mdp::from_grid(&grid);
        let config = MonteCarloConfig::default()
            .with_iterations(2)
            .with_batch_size(5)
            .with_max_steps(20);
        let estimate =
            first_visit_monte_carlo(&mdp, &PolicyMatrix::from_grid(&grid), &config).unwrap();
        assert_eq!(estimate.discarded, 10);
        assert_eq!(estimate.completed, 0);
        assert_eq!(estimate.discard_rate(), 1.0);
        assert!(estimate.values[0].is_nan());
        assert_eq!(estimate.values[1], f64::INFINITY);
    }

    #[test]
    fn test_seed_reproducible() {
        let (grid, mdp) = corridor();
        let policy = PolicyMatrix::from_grid(&grid);
        let config = MonteCarloConfig::default().with_iterations(20);
        let a = first_visit_monte_carlo(&mdp, &policy, &config).unwrap();
        let b = first_visit_monte_carlo(&mdp, &policy, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.visits[0], 200);
    }
}
