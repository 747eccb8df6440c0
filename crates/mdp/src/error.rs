//! Error types for MDP construction and probability bookkeeping.

use thiserror::Error;

/// Errors that can occur while building or querying an MDP.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MdpError {
    /// Distribution doesn't sum to 1.
    #[error("Distribution not normalized: sum = {sum} (expected 1.0)")]
    NotNormalized { sum: f64 },

    /// Negative probability encountered.
    #[error("Negative probability encountered")]
    NegativeProbability,

    /// All weights are zero (can't normalize).
    #[error("Cannot normalize: all weights are zero")]
    ZeroWeights,

    /// Empty distribution.
    #[error("Distribution cannot be empty")]
    EmptyDistribution,

    /// A transition row is neither empty nor a probability distribution.
    #[error("Transition row ({state}, {action}) sums to {sum} (expected 0 or 1)")]
    RowNotNormalized {
        state: usize,
        action: usize,
        sum: f64,
    },

    /// Dimensions don't line up.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// A reward entry is NaN or infinite.
    #[error("Reward ({state}, {action}) is not finite")]
    NonFiniteReward { state: usize, action: usize },

    /// A state with outgoing mass can move into a state with empty rows.
    #[error("State {state} moves into blocked state {blocked} under action {action}")]
    TransitionIntoBlocked {
        state: usize,
        action: usize,
        blocked: usize,
    },

    /// No state qualifies as a start state.
    #[error("MDP has no decision states to start from")]
    NoDecisionStates,

    /// Exploration rate outside `[0, 1]`.
    #[error("Exploration rate {epsilon} must lie in [0, 1]")]
    InvalidEpsilon { epsilon: f64 },
}
