//! # Hex-World MDP
//!
//! Turns a linked [`hexworld_grid::HexGrid`] into a finite Markov decision
//! process: a dense transition tensor `T[s, a, s']`, a reward matrix
//! `R[s, a]`, and a policy matrix `π[s, a]`.
//!
//! ## State Space
//!
//! States are the grid cells in row-major order (`row * cols + col`) plus
//! one synthetic absorbing state at index `rows * cols`:
//!
//! ```text
//!   cells:  0 1 2 ... n-1 │ n
//!           └── grid ───┘ └ absorbing (self-loop, reward 0)
//! ```
//!
//! Terminal cells (nonzero score) hand out their score and move to the
//! absorbing state. Blocked cells keep empty rows.
//!
//! ## Example
//!
//! ```rust
//! use hexworld_grid::{HexGrid, HexMove};
//! use hexworld_mdp::{Mdp, PolicyMatrix, StateKind};
//!
//! let grid = HexGrid::uniform(&[vec!["10", "0", "0", "10"]], HexMove::East).unwrap();
//! let mdp = Mdp::from_grid(&grid);
//! let policy = PolicyMatrix::from_grid(&grid);
//!
//! assert_eq!(mdp.kind(0), StateKind::Terminal);
//! assert_eq!(mdp.kind(4), StateKind::Absorbing);
//!
//! let chain = mdp.induced_kernel(&policy).unwrap();
//! assert!((chain.get(2, 3) - 0.7).abs() < 1e-12);
//! ```

mod builder;
pub mod dist;
mod error;
pub mod mdp;
pub mod policy;
pub mod tensor;

pub use dist::Dist;
pub use error::MdpError;
pub use mdp::{Mdp, PolicyKernel, StateKind};
pub use policy::PolicyMatrix;
pub use tensor::{RewardMatrix, TransitionTensor};

/// Number of actions: one per hex direction.
pub const NUM_ACTIONS: usize = hexworld_grid::HexMove::COUNT;

/// Reward for an action whose nominal move leaves the grid or hits a block.
pub const EDGE_PENALTY: f64 = -1.0;

/// Tolerance for probability comparisons.
pub const PROB_TOLERANCE: f64 = 1e-9;
