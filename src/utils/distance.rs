// Distance heuristics on the store grid

use crate::models::Cell;

/// Manhattan distance, exact on an open floor with orthogonal moves
pub fn manhattan_distance(p1: &Cell, p2: &Cell) -> u32 {
    p1.manhattan_distance_to(p2)
}

/// Chebyshev distance, exact on an open floor when diagonal moves cost one step
pub fn chebyshev_distance(p1: &Cell, p2: &Cell) -> u32 {
    p1.chebyshev_distance_to(p2)
}
