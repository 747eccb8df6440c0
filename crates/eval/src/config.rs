//! Evaluator settings.
//!
//! Both structs deserialize with defaults for missing fields, so a JSON
//! document only has to name what it changes:
//!
//! ```rust
//! use hexworld_eval::MonteCarloConfig;
//!
//! let config: MonteCarloConfig = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.iterations, 1000);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Deepest horizon [`EvalConfig::validate`] accepts.
///
/// Each level costs one pass over the states, so this bounds the work of
/// a single evaluation; with `γ < 1` the values have long converged.
pub const MAX_HORIZON: usize = 1_000_000;

/// Discount and depth bound shared by the recursive evaluators.
///
/// The closed-form solve only reads `gamma`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Discount factor in `(0, 1]`.
    pub gamma: f64,
    /// Deepest recursion level that still contributes value.
    pub horizon: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            horizon: 10,
        }
    }
}

impl EvalConfig {
    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the recursion horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Reject a non-finite discount, one outside `(0, 1]`, or a horizon
    /// above [`MAX_HORIZON`].
    pub fn validate(&self) -> Result<(), EvalError> {
        check_gamma(self.gamma)?;
        if self.horizon > MAX_HORIZON {
            return Err(EvalError::InvalidConfig {
                message: format!("horizon {} exceeds {MAX_HORIZON}", self.horizon),
            });
        }
        Ok(())
    }
}

/// Sampling budget for first-visit Monte Carlo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Discount factor in `(0, 1]`.
    pub gamma: f64,
    /// Outer iterations; each samples one batch.
    pub iterations: usize,
    /// Trajectories per batch.
    pub batch_size: usize,
    /// Trajectories still running after this many steps are discarded.
    pub max_steps: usize,
    /// Seed for the trajectory sampler.
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            iterations: 1000,
            batch_size: 10,
            max_steps: 1000,
            seed: 42,
        }
    }
}

impl MonteCarloConfig {
    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the number of batches.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the trajectories per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the step cap per trajectory.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the sampler seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total number of trajectories sampled.
    pub fn num_trajectories(&self) -> usize {
        self.iterations * self.batch_size
    }

    /// Reject a bad discount or any zero-sized budget.
    pub fn validate(&self) -> Result<(), EvalError> {
        check_gamma(self.gamma)?;
        for (name, value) in [
            ("iterations", self.iterations),
            ("batch_size", self.batch_size),
            ("max_steps", self.max_steps),
        ] {
            if value == 0 {
                return Err(EvalError::InvalidConfig {
                    message: format!("{name} must be positive"),
                });
            }
        }
        Ok(())
    }
}

fn check_gamma(gamma: f64) -> Result<(), EvalError> {
    if gamma.is_finite() && gamma > 0.0 && gamma <= 1.0 {
        Ok(())
    } else {
        Err(EvalError::InvalidDiscount { gamma })
    }
}
