//! Bounded-depth lookahead over the linked cell graph.
//!
//! The value of a decision cell is the discounted expectation over its
//! policy lottery:
//!
//! ```text
//! V(c, d) = 0                                        if d > horizon
//!         = score(c)                                 if c is terminal
//!         = γ Σ p · (V(next, d+1))                   for landed outcomes
//!             + γ Σ p · (-1 + V(c, d+1))             for bounced outcomes
//! ```
//!
//! The grid has cycles, so the depth bound is what makes the recursion
//! terminate. `V(·, d)` only reads `V(·, d+1)`, so the whole unrolling is
//! computed as a backward sweep from depth `horizon` to 0 over two
//! state-sized buffers: `O(cells · horizon)` time, `O(cells)` memory, and
//! no call stack that grows with the horizon.

use hexworld_grid::{CellId, HexGrid};
use hexworld_mdp::EDGE_PENALTY;
use log::{debug, trace};

use crate::config::EvalConfig;
use crate::error::EvalError;

/// Backward induction from `V(·, horizon + 1) = 0` down to `V(·, 0)`.
///
/// `layer(next, out)` writes `V(·, d)` into `out` given `next = V(·, d+1)`.
/// Once two successive layers are identical every shallower layer is too,
/// so the sweep stops there.
pub(crate) fn backward_sweep(
    num_states: usize,
    horizon: usize,
    mut layer: impl FnMut(&[f64], &mut [f64]),
) -> Vec<f64> {
    let mut next = vec![0.0; num_states];
    let mut current = vec![0.0; num_states];
    for depth in (0..=horizon).rev() {
        layer(&next, &mut current);
        std::mem::swap(&mut next, &mut current);
        if next == current {
            trace!("sweep reached a fixed point at depth {depth}");
            break;
        }
    }
    next
}

/// Policy evaluation by recursion on the cell graph.
#[derive(Debug, Clone, Copy)]
pub struct LookaheadEvaluator<'g> {
    grid: &'g HexGrid,
    config: EvalConfig,
}

impl<'g> LookaheadEvaluator<'g> {
    /// Check `config` and bind it to `grid`.
    pub fn new(grid: &'g HexGrid, config: EvalConfig) -> Result<Self, EvalError> {
        config.validate()?;
        Ok(Self { grid, config })
    }

    /// The settings in use.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// `V(id)` at depth 0.
    ///
    /// # Panics
    ///
    /// Panics if a lottery lands on a blocked cell, which a correctly
    /// linked grid never allows.
    pub fn value(&self, id: CellId) -> f64 {
        self.sweep()[id.index()]
    }

    /// Values of all cells in row-major order.
    ///
    /// Terminal and blocked cells are not decision states and report
    /// `f64::INFINITY`.
    pub fn evaluate(&self) -> Vec<f64> {
        let mut values = self.sweep();
        for cell in self.grid.cells().iter().filter(|c| !c.is_decision()) {
            values[cell.id.index()] = f64::INFINITY;
        }
        debug!(
            "lookahead over {}x{} grid: horizon {}, gamma {}",
            self.grid.rows(),
            self.grid.cols(),
            self.config.horizon,
            self.config.gamma
        );
        values
    }

    fn sweep(&self) -> Vec<f64> {
        backward_sweep(self.grid.len(), self.config.horizon, |next, out| {
            for cell in self.grid.cells() {
                out[cell.id.index()] = if cell.is_terminal() {
                    cell.score as f64
                } else if cell.is_decision() {
                    self.expand(cell.id, next)
                } else {
                    0.0
                };
            }
        })
    }

    fn expand(&self, id: CellId, next: &[f64]) -> f64 {
        let cell = self.grid.cell(id);
        let action = cell
            .policy
            .unwrap_or_else(|| panic!("decision cell {id} has no policy action"));
        let mut total = 0.0;
        for outcome in &cell.reachable_states(action) {
            total += match outcome.next {
                Some(to) => {
                    let landed = self.grid.cell(to);
                    if landed.blocked {
                        panic!(
                            "lookahead reached blocked cell {to} at ({}, {})",
                            landed.row, landed.col
                        );
                    }
                    outcome.prob * next[to.index()]
                }
                None => outcome.prob * (EDGE_PENALTY + next[id.index()]),
            };
        }
        self.config.gamma * total
    }
}

/// Lookahead values of every cell under `config`.
pub fn loopy_lookahead(grid: &HexGrid, config: EvalConfig) -> Result<Vec<f64>, EvalError> {
    Ok(LookaheadEvaluator::new(grid, config)?.evaluate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexworld_grid::HexMove;

    fn corridor() -> HexGrid {
        HexGrid::uniform(&[vec!["0", "10"]], HexMove::East).unwrap()
    }

    #[test]
    fn test_horizon_cuts_before_payoff() {
        // Horizon 0: every successor sits at depth 1 and counts as 0, so
        // only the bounce penalty of the first lottery survives.
        let grid = corridor();
        let config = EvalConfig::default().with_gamma(1.0).with_horizon(0);
        let v = LookaheadEvaluator::new(&grid, config)
            .unwrap()
            .value(grid.id(0, 0));
        assert!((v - 0.3 * -1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_level_unrolling() {
        let grid = corridor();
        let config = EvalConfig::default().with_gamma(0.5).with_horizon(1);
        let v = LookaheadEvaluator::new(&grid, config)
            .unwrap()
            .value(grid.id(0, 0));
        let v1 = 0.5 * (0.3 * -1.0);
        let v0 = 0.5 * (0.7 * 10.0 + 0.3 * (-1.0 + v1));
        assert!((v - v0).abs() < 1e-12);
    }

    #[test]
    fn test_non_decision_cells_report_infinity() {
        let grid = HexGrid::uniform(&[vec!["0", "10", "X"]], HexMove::East).unwrap();
        let values = loopy_lookahead(&grid, EvalConfig::default()).unwrap();
        assert!(values[0].is_finite());
        assert_eq!(values[1], f64::INFINITY);
        assert_eq!(values[2], f64::INFINITY);
    }

    #[test]
    fn test_rejects_bad_gamma() {
        let grid = corridor();
        assert!(matches!(
            LookaheadEvaluator::new(&grid, EvalConfig::default().with_gamma(2.0)),
            Err(EvalError::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn test_sweep_matches_naive_unrolling() {
        fn naive(grid: &HexGrid, id: CellId, depth: usize, config: &EvalConfig) -> f64 {
            if depth > config.horizon {
                return 0.0;
            }
            let cell = grid.cell(id);
            if cell.is_terminal() {
                return cell.score as f64;
            }
            let lottery = cell.reachable_states(cell.policy.unwrap());
            config.gamma
                * lottery
                    .outcomes()
                    .iter()
                    .map(|o| match o.next {
                        Some(n) => o.prob * naive(grid, n, depth + 1, config),
                        None => o.prob * (-1.0 + naive(grid, id, depth + 1, config)),
                    })
                    .sum::<f64>()
        }

        let grid = HexGrid::uniform(
            &[vec!["0", "0", "5"], vec!["0", "X", "0"], vec!["-5", "0", "0"]],
            HexMove::NorthEast,
        )
        .unwrap();
        let config = EvalConfig::default().with_gamma(0.9).with_horizon(6);
        let swept = LookaheadEvaluator::new(&grid, config).unwrap();
        for cell in grid.decision_cells() {
            let expected = naive(&grid, cell.id, 0, &config);
            assert!((swept.value(cell.id) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deep_horizon_runs_without_recursion() {
        // All three branches bounce off a single cell: V = -γ / (1 - γ).
        let grid = HexGrid::uniform(&[vec!["0", "10"]], HexMove::West).unwrap();
        let config = EvalConfig::default().with_horizon(50_000);
        let v = LookaheadEvaluator::new(&grid, config)
            .unwrap()
            .value(grid.id(0, 0));
        assert!((v - -99.0).abs() < 1e-6, "{v}");
    }

    #[test]
    fn test_sweep_stops_at_fixed_point() {
        let mut layers = 0;
        let values = backward_sweep(2, usize::MAX, |next, out| {
            layers += 1;
            out[0] = 5.0;
            out[1] = 0.5 * next[0];
        });
        assert_eq!(values, vec![5.0, 2.5]);
        assert_eq!(layers, 3);
    }
}
