//! # Hex-World Grid
//!
//! The layout layer of hex-world: a rectangular grid of hexagonal tiles
//! with staggered rows, a fixed per-cell policy, and the drift model that
//! turns a nominal move into a lottery over neighbors.
//!
//! ## Core Components
//!
//! - [`HexMove`]: the six directions and their clockwise order
//! - [`HexGrid`]: parses labels, links neighbors, stores the policy
//! - [`Lottery`]: the 0.15 / 0.70 / 0.15 drift distribution for a move
//!
//! ## Example
//!
//! ```rust
//! use hexworld_grid::{HexGrid, HexMove};
//!
//! let grid = HexGrid::uniform(&[vec!["10", "0", "0", "10"]], HexMove::East).unwrap();
//! let start = grid.id(0, 2);
//! let lottery = grid.reachable_states(start, HexMove::East);
//!
//! // Drifting north-east or south-east off a single row bounces.
//! assert!((lottery.bounce_probability() - 0.3).abs() < 1e-12);
//! ```
//!
//! ## Layout
//!
//! ```text
//!   row 0:  (0,0) (0,1) (0,2)
//!   row 1:     (1,0) (1,1) (1,2)
//!   row 2:  (2,0) (2,1) (2,2)
//! ```
//!
//! Odd rows are shifted half a tile to the right.

pub mod cell;
pub mod direction;
mod error;
pub mod grid;
pub mod lottery;

pub use cell::{Cell, CellId};
pub use direction::HexMove;
pub use error::GridError;
pub use grid::{GridSpec, HexGrid, BLOCKED_LABEL};
pub use lottery::{drifted_move, Lottery, Outcome, DRIFT_PROB, LOTTERY_TOLERANCE, NOMINAL_PROB};
