//! Stochastic transition model: directional drift.
//!
//! A nominal move proceeds as intended with probability 0.70 and drifts one
//! step clockwise or counter-clockwise with probability 0.15 each. An
//! outcome with no neighbor means the move tried to leave the grid or
//! enter a blocked tile: the agent bounces and stays where it is. A bounce
//! is not the same thing as reaching the absorbing terminal state.

use crate::cell::{Cell, CellId};
use crate::direction::HexMove;

/// Probability of drifting to either side of the nominal direction.
pub const DRIFT_PROB: f64 = 0.15;

/// Probability of moving in the nominal direction.
pub const NOMINAL_PROB: f64 = 0.7;

/// Tolerance for the lottery normalization check.
pub const LOTTERY_TOLERANCE: f64 = 1e-9;

/// One branch of a lottery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Probability of this branch.
    pub prob: f64,
    /// Direction actually taken.
    pub direction: HexMove,
    /// Landing cell, or `None` for a bounce.
    pub next: Option<CellId>,
}

/// A discrete distribution over landing cells for one nominal action.
#[derive(Debug, Clone, PartialEq)]
pub struct Lottery {
    outcomes: [Outcome; 3],
}

impl Lottery {
    /// Build the drift lottery for `action` taken from `cell`.
    ///
    /// Branch order is clockwise drift, nominal, counter-clockwise drift.
    ///
    /// # Panics
    ///
    /// Panics if the branch probabilities do not sum to one. That can only
    /// happen if the drift constants are edited inconsistently.
    pub fn drift(cell: &Cell, action: HexMove) -> Self {
        let branch = |prob: f64, direction: HexMove| Outcome {
            prob,
            direction,
            next: cell.neighbor(direction),
        };
        let lottery = Self {
            outcomes: [
                branch(DRIFT_PROB, action.clockwise()),
                branch(NOMINAL_PROB, action),
                branch(DRIFT_PROB, action.counter_clockwise()),
            ],
        };
        let total = lottery.total_probability();
        assert!(
            (total - 1.0).abs() < LOTTERY_TOLERANCE,
            "drift lottery for {action} from {} sums to {total}",
            cell.id
        );
        lottery
    }

    /// The branches in clockwise, nominal, counter-clockwise order.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Sum of branch probabilities (one, up to rounding).
    pub fn total_probability(&self) -> f64 {
        self.outcomes.iter().map(|o| o.prob).sum()
    }

    /// Probability mass that bounces off an edge or blocked tile.
    pub fn bounce_probability(&self) -> f64 {
        self.outcomes
            .iter()
            .filter(|o| o.next.is_none())
            .map(|o| o.prob)
            .sum()
    }
}

impl<'a> IntoIterator for &'a Lottery {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Pick the direction actually taken given a uniform draw `u` in `[0, 1)`.
///
/// Draws below [`DRIFT_PROB`] drift counter-clockwise, draws above
/// `1 - DRIFT_PROB` drift clockwise, and everything in between is nominal.
pub fn drifted_move(action: HexMove, u: f64) -> HexMove {
    if u < DRIFT_PROB {
        action.counter_clockwise()
    } else if u > 1.0 - DRIFT_PROB {
        action.clockwise()
    } else {
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_cell() -> Cell {
        let mut cell = Cell::new(CellId(4), 1, 1, 0, false);
        cell.neighbors[HexMove::East.index()] = Some(CellId(5));
        cell.neighbors[HexMove::SouthEast.index()] = Some(CellId(8));
        cell
    }

    #[test]
    fn test_lottery_sums_to_one() {
        let cell = open_cell();
        for m in HexMove::ALL {
            let lottery = cell.reachable_states(m);
            assert!((lottery.total_probability() - 1.0).abs() < LOTTERY_TOLERANCE);
        }
    }

    #[test]
    fn test_lottery_branch_order() {
        let cell = open_cell();
        let lottery = cell.reachable_states(HexMove::East);
        let outcomes = lottery.outcomes();

        assert_eq!(outcomes[0].direction, HexMove::SouthEast);
        assert_eq!(outcomes[0].next, Some(CellId(8)));
        assert!((outcomes[0].prob - DRIFT_PROB).abs() < 1e-12);

        assert_eq!(outcomes[1].direction, HexMove::East);
        assert_eq!(outcomes[1].next, Some(CellId(5)));
        assert!((outcomes[1].prob - NOMINAL_PROB).abs() < 1e-12);

        assert_eq!(outcomes[2].direction, HexMove::NorthEast);
        assert_eq!(outcomes[2].next, None);
    }

    #[test]
    fn test_bounce_probability() {
        let cell = open_cell();
        assert!((cell.reachable_states(HexMove::East).bounce_probability() - 0.15).abs() < 1e-12);
        assert!((cell.reachable_states(HexMove::West).bounce_probability() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_drifted_move_bands() {
        assert_eq!(drifted_move(HexMove::East, 0.0), HexMove::NorthEast);
        assert_eq!(drifted_move(HexMove::East, 0.14), HexMove::NorthEast);
        assert_eq!(drifted_move(HexMove::East, 0.5), HexMove::East);
        assert_eq!(drifted_move(HexMove::East, 0.85), HexMove::East);
        assert_eq!(drifted_move(HexMove::East, 0.9), HexMove::SouthEast);
    }
}
