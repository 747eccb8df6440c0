//! Error types for policy evaluation.

use hexworld_mdp::MdpError;
use thiserror::Error;

/// Errors that can occur while configuring or running an evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Discount factor outside `[0, 1]`.
    #[error("Discount factor {gamma} must lie in [0, 1]")]
    InvalidDiscount { gamma: f64 },

    /// Any other unusable setting.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The Bellman system has no unique solution.
    ///
    /// With `gamma == 1` this happens when some decision states can never
    /// reach a terminal payoff under the policy.
    #[error("Bellman system is singular; states {states:?} never reach a terminal")]
    Singular { states: Vec<usize> },

    /// A value vector does not fit the grid.
    #[error("Value table shape mismatch: expected {expected} cells, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Underlying MDP error.
    #[error(transparent)]
    Mdp(#[from] MdpError),
}
