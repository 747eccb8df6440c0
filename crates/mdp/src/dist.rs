//! Finite distributions: policy rows over actions and the start-state prior.

use serde::{Deserialize, Serialize};

use crate::error::MdpError;
use crate::PROB_TOLERANCE;

/// Probability vector indexed by action or by state.
///
/// Policy matrices hold one per state (over the six moves); the Monte
/// Carlo start prior is one over all states with mass only on decision
/// states. Entries are non-negative and sum to one, and deserialization
/// checks both.
///
/// # Example
///
/// ```rust
/// use hexworld_mdp::Dist;
///
/// let start = Dist::from_weights(vec![0.0, 1.0, 1.0, 0.0]).unwrap();
/// assert_eq!(start.support(), vec![1, 2]);
/// assert_eq!(start.sample(0.25), 1);
/// assert_eq!(start.sample(0.75), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDist")]
pub struct Dist {
    /// Mass per outcome.
    pub p: Vec<f64>,
}

#[derive(Deserialize)]
struct RawDist {
    p: Vec<f64>,
}

impl TryFrom<RawDist> for Dist {
    type Error = MdpError;

    fn try_from(raw: RawDist) -> Result<Self, Self::Error> {
        Dist::new(raw.p)
    }
}

impl Dist {
    /// Take `p` as given; it must already be normalized.
    ///
    /// # Errors
    ///
    /// Rejects an empty vector, a negative entry, or a total that is not
    /// one within [`PROB_TOLERANCE`].
    pub fn new(p: Vec<f64>) -> Result<Self, MdpError> {
        if p.is_empty() {
            return Err(MdpError::EmptyDistribution);
        }

        if p.iter().any(|&x| x < -PROB_TOLERANCE) {
            return Err(MdpError::NegativeProbability);
        }

        let sum: f64 = p.iter().sum();
        if (sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(MdpError::NotNormalized { sum });
        }

        Ok(Self { p })
    }

    /// Normalize non-negative weights, e.g. a 0/1 mask over states.
    pub fn from_weights(weights: Vec<f64>) -> Result<Self, MdpError> {
        if weights.is_empty() {
            return Err(MdpError::EmptyDistribution);
        }

        if weights.iter().any(|&x| x < 0.0) {
            return Err(MdpError::NegativeProbability);
        }

        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(MdpError::ZeroWeights);
        }

        let p: Vec<f64> = weights.iter().map(|w| w / sum).collect();
        Ok(Self { p })
    }

    /// Equal mass on `n` outcomes: the row of a state where the action
    /// does not matter.
    pub fn uniform(n: usize) -> Self {
        assert!(n > 0, "uniform row needs at least one outcome");
        Self {
            p: vec![1.0 / n as f64; n],
        }
    }

    /// All mass on outcome `i`: a deterministic policy row.
    pub fn point(n: usize, i: usize) -> Self {
        assert!(i < n, "outcome {i} out of range for {n} outcomes");
        let mut p = vec![0.0; n];
        p[i] = 1.0;
        Self { p }
    }

    /// Mix with another distribution: `(1 - weight) * self + weight * other`.
    pub fn mix(&self, other: &Dist, weight: f64) -> Result<Dist, MdpError> {
        if self.p.len() != other.p.len() {
            return Err(MdpError::ShapeMismatch {
                expected: self.p.len(),
                got: other.p.len(),
            });
        }
        let p = self
            .p
            .iter()
            .zip(&other.p)
            .map(|(a, b)| (1.0 - weight) * a + weight * b)
            .collect();
        Dist::new(p)
    }

    /// Outcomes carrying more than [`PROB_TOLERANCE`] mass.
    pub fn support(&self) -> Vec<usize> {
        self.p
            .iter()
            .enumerate()
            .filter(|(_, &x)| x > PROB_TOLERANCE)
            .map(|(i, _)| i)
            .collect()
    }

    /// The outcome carrying all the mass, if this is a point mass.
    pub fn as_point(&self) -> Option<usize> {
        match self.support().as_slice() {
            [i] => Some(*i),
            _ => None,
        }
    }

    /// Number of outcomes, zero-mass ones included.
    pub fn len(&self) -> usize {
        self.p.len()
    }

    /// Only true for a hand-built `Dist` with no entries.
    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }

    /// Inverse-CDF draw with `u` in `[0, 1)`; never lands on a zero-mass
    /// outcome.
    pub fn sample(&self, u: f64) -> usize {
        let mut cumsum = 0.0;
        let mut last = 0;
        for (i, &p) in self.p.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            cumsum += p;
            last = i;
            if u < cumsum {
                return i;
            }
        }
        // u close to 1.0 with rounding in the cumulative sum
        last
    }
}
