//! # Hex-World Policy Evaluation
//!
//! Four ways to compute the expected discounted value of a fixed policy
//! on a hex-world grid, all reporting a flat row-major vector in which
//! terminal and blocked cells hold `f64::INFINITY`:
//!
//! | evaluator | works on | horizon |
//! |-----------|----------|---------|
//! | [`LookaheadEvaluator`] | linked cell graph | bounded |
//! | [`MatrixLookahead`] | `(T, R)` indices | bounded |
//! | [`LinearEvaluator`] | `(T, R)`, Bellman linear system | infinite |
//! | [`first_visit_monte_carlo`] | sampled trajectories | until absorption |
//!
//! The two bounded recursions agree to floating-point tolerance, and both
//! approach the closed-form solution as the horizon grows.
//!
//! ## Example
//!
//! ```rust
//! use hexworld_eval::{loopy_lookahead, solve_policy, EvalConfig};
//! use hexworld_grid::{HexGrid, HexMove};
//! use hexworld_mdp::{Mdp, PolicyMatrix};
//!
//! let grid = HexGrid::uniform(&[vec!["10", "0", "0", "10"]], HexMove::East).unwrap();
//! let mdp = Mdp::from_grid(&grid);
//! let policy = PolicyMatrix::from_grid(&grid);
//!
//! let config = EvalConfig::default().with_gamma(0.9).with_horizon(200);
//! let bounded = loopy_lookahead(&grid, config).unwrap();
//! let exact = solve_policy(&mdp, &policy, config).unwrap();
//!
//! assert!((bounded[2] - exact[2]).abs() < 1e-6);
//! assert!(exact[1] < exact[2] && exact[2] < 10.0);
//! ```

pub mod config;
mod error;
pub mod linear;
pub mod lookahead;
pub mod matrix;
pub mod monte_carlo;
pub mod reach;
pub mod values;

pub use config::{EvalConfig, MonteCarloConfig, MAX_HORIZON};
pub use error::EvalError;
pub use linear::{solve_policy, LinearEvaluator};
pub use lookahead::{loopy_lookahead, LookaheadEvaluator};
pub use matrix::{recursive_policy_evaluation, MatrixLookahead};
pub use monte_carlo::{
    first_visit_monte_carlo, sample_trajectories, MonteCarloEstimate, Step, Trajectory,
    TrajectoryBatch,
};
pub use reach::{transition_graph, trapped_states};
pub use values::ValueTable;
