// Cell model representing integer coordinates on the store floor

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single square of the store grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Creates a new cell with the given coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the cell shifted by `(dx, dy)`
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance between two cells
    pub fn manhattan_distance_to(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance between two cells
    pub fn chebyshev_distance_to(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Whether `other` is one orthogonal step away
    pub fn is_orthogonal_neighbor(&self, other: &Cell) -> bool {
        self.manhattan_distance_to(other) == 1
    }

    /// Whether `other` is one orthogonal or diagonal step away
    pub fn is_king_neighbor(&self, other: &Cell) -> bool {
        self.chebyshev_distance_to(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
