//! The six move directions of a hexagonal tile.
//!
//! Directions are cyclically ordered going clockwise:
//!
//! ```text
//!        NW   NE
//!          \ /
//!     W ── ( ) ── E
//!          / \
//!        SW   SE
//! ```
//!
//! `NW → NE → E → SE → SW → W → NW`. The clockwise and counter-clockwise
//! successors are pure functions of this order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GridError;

/// A nominal move direction on the hex grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HexMove {
    #[serde(rename = "NW")]
    NorthWest,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "W")]
    West,
}

impl HexMove {
    /// Number of directions (and of MDP actions).
    pub const COUNT: usize = 6;

    /// All directions in clockwise order; position equals [`HexMove::index`].
    pub const ALL: [HexMove; Self::COUNT] = [
        HexMove::NorthWest,
        HexMove::NorthEast,
        HexMove::East,
        HexMove::SouthEast,
        HexMove::SouthWest,
        HexMove::West,
    ];

    /// Action index used by the transition tensor and reward matrix.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`HexMove::index`].
    pub fn from_index(index: usize) -> Option<HexMove> {
        Self::ALL.get(index).copied()
    }

    /// The next direction going clockwise.
    pub const fn clockwise(self) -> HexMove {
        Self::ALL[(self as usize + 1) % Self::COUNT]
    }

    /// The next direction going counter-clockwise.
    pub const fn counter_clockwise(self) -> HexMove {
        Self::ALL[(self as usize + Self::COUNT - 1) % Self::COUNT]
    }

    /// The direction pointing back the way this one came.
    pub const fn opposite(self) -> HexMove {
        Self::ALL[(self as usize + 3) % Self::COUNT]
    }

    /// Compass abbreviation (`"NW"`, `"E"`, ...).
    pub const fn abbrev(self) -> &'static str {
        match self {
            HexMove::NorthWest => "NW",
            HexMove::NorthEast => "NE",
            HexMove::East => "E",
            HexMove::SouthEast => "SE",
            HexMove::SouthWest => "SW",
            HexMove::West => "W",
        }
    }

    /// `(d_row, d_col)` offset of the neighbor in this direction.
    ///
    /// Rows are staggered: odd rows sit half a tile to the right of even
    /// rows, so diagonal neighbors of an even row lean one column left
    /// compared to those of an odd row.
    pub const fn offset(self, row: usize) -> (isize, isize) {
        let odd = row % 2 == 1;
        match (self, odd) {
            (HexMove::East, _) => (0, 1),
            (HexMove::West, _) => (0, -1),
            (HexMove::NorthWest, false) => (-1, -1),
            (HexMove::NorthEast, false) => (-1, 0),
            (HexMove::SouthEast, false) => (1, 0),
            (HexMove::SouthWest, false) => (1, -1),
            (HexMove::NorthWest, true) => (-1, 0),
            (HexMove::NorthEast, true) => (-1, 1),
            (HexMove::SouthEast, true) => (1, 1),
            (HexMove::SouthWest, true) => (1, 0),
        }
    }
}

impl fmt::Display for HexMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl FromStr for HexMove {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NW" | "NORTH_WEST" => Ok(HexMove::NorthWest),
            "NE" | "NORTH_EAST" => Ok(HexMove::NorthEast),
            "E" | "EAST" => Ok(HexMove::East),
            "SE" | "SOUTH_EAST" => Ok(HexMove::SouthEast),
            "SW" | "SOUTH_WEST" => Ok(HexMove::SouthWest),
            "W" | "WEST" => Ok(HexMove::West),
            _ => Err(GridError::UnknownMove {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, m) in HexMove::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
            assert_eq!(HexMove::from_index(i), Some(*m));
        }
        assert_eq!(HexMove::from_index(6), None);
    }

    #[test]
    fn test_clockwise_cycle() {
        assert_eq!(HexMove::NorthWest.clockwise(), HexMove::NorthEast);
        assert_eq!(HexMove::East.clockwise(), HexMove::SouthEast);
        assert_eq!(HexMove::West.clockwise(), HexMove::NorthWest);

        let mut m = HexMove::East;
        for _ in 0..6 {
            m = m.clockwise();
        }
        assert_eq!(m, HexMove::East);
    }

    #[test]
    fn test_counter_clockwise_inverts_clockwise() {
        for m in HexMove::ALL {
            assert_eq!(m.clockwise().counter_clockwise(), m);
        }
        assert_eq!(HexMove::NorthWest.counter_clockwise(), HexMove::West);
        assert_eq!(HexMove::East.counter_clockwise(), HexMove::NorthEast);
    }

    #[test]
    fn test_opposite_offsets_cancel() {
        // Going one way and then back lands on the start for both parities.
        for row in [2usize, 3] {
            for m in HexMove::ALL {
                let (dr, dc) = m.offset(row);
                let next_row = (row as isize + dr) as usize;
                let (br, bc) = m.opposite().offset(next_row);
                assert_eq!((dr + br, dc + bc), (0, 0), "{m} from row {row}");
            }
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("ne".parse::<HexMove>().unwrap(), HexMove::NorthEast);
        assert_eq!("EAST".parse::<HexMove>().unwrap(), HexMove::East);
        assert_eq!(HexMove::SouthWest.to_string(), "SW");
        assert!(matches!(
            "up".parse::<HexMove>(),
            Err(GridError::UnknownMove { .. })
        ));
    }

    #[test]
    fn test_serde_uses_abbreviations() {
        let json = serde_json::to_string(&HexMove::SouthEast).unwrap();
        assert_eq!(json, "\"SE\"");
        let back: HexMove = serde_json::from_str("\"W\"").unwrap();
        assert_eq!(back, HexMove::West);
    }
}
