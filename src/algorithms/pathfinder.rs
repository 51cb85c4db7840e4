use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::error::SearchFailure;
use crate::models::{Cell, Distance, StoreGrid};
use crate::utils::distance::{chebyshev_distance, manhattan_distance};

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

const NOT_REACHED: Distance = Distance::MAX;

/// Moves allowed between adjacent cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Orthogonal steps only
    #[default]
    Four,
    /// Orthogonal and diagonal steps, each costing one step
    Eight,
}

impl Connectivity {
    /// Admissible and consistent estimate of the remaining steps
    pub fn estimate(&self, from: &Cell, to: &Cell) -> Distance {
        match self {
            Connectivity::Four => manhattan_distance(from, to),
            Connectivity::Eight => chebyshev_distance(from, to),
        }
    }

    /// Whether one move connects the two cells
    pub fn are_adjacent(&self, a: &Cell, b: &Cell) -> bool {
        match self {
            Connectivity::Four => a.is_orthogonal_neighbor(b),
            Connectivity::Eight => a.is_king_neighbor(b),
        }
    }
}

/// Single-pair A* search over the store grid with unit step cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pathfinder {
    pub connectivity: Connectivity,

    /// Expansions after which a search counts as failed
    pub max_expansions: Option<usize>,
}

impl Pathfinder {
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            max_expansions: None,
        }
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Collects the walkable cells one move away from `cell` into `out`.
    ///
    /// A diagonal move needs both orthogonal cells it passes to be walkable,
    /// so paths never squeeze between two shelf corners.
    pub fn neighbors(&self, grid: &StoreGrid, cell: Cell, out: &mut Vec<Cell>) {
        out.clear();
        for (dx, dy) in ORTHOGONAL {
            let next = cell.offset(dx, dy);
            if grid.is_walkable(next) {
                out.push(next);
            }
        }
        if self.connectivity == Connectivity::Eight {
            for (dx, dy) in DIAGONAL {
                let next = cell.offset(dx, dy);
                if grid.is_walkable(next)
                    && grid.is_walkable(cell.offset(dx, 0))
                    && grid.is_walkable(cell.offset(0, dy))
                {
                    out.push(next);
                }
            }
        }
    }

    /// Computes the shortest path from `start` to `goal`, both inclusive.
    ///
    /// Frontier ties on estimated total cost go to the cell closer to the goal,
    /// then to the earliest pushed, so equal inputs always give the same path.
    pub fn shortest_path(
        &self,
        grid: &StoreGrid,
        start: Cell,
        goal: Cell,
    ) -> Result<Vec<Cell>, SearchFailure> {
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return Err(SearchFailure::NoPath);
        }
        if start == goal {
            return Ok(vec![start]);
        }
        let (Some(start_idx), Some(goal_idx)) = (grid.index(start), grid.index(goal)) else {
            return Err(SearchFailure::NoPath);
        };

        let cells = grid.cell_count();
        let mut cost = vec![NOT_REACHED; cells];
        let mut parent = vec![usize::MAX; cells];
        let mut closed = vec![false; cells];

        // Max-queue, so priorities are reversed: lowest f, then lowest h, then oldest
        let mut open: PriorityQueue<usize, Reverse<(Distance, Distance, u64)>> =
            PriorityQueue::new();
        let mut pushes: u64 = 0;

        let h = self.connectivity.estimate(&start, &goal);
        cost[start_idx] = 0;
        open.push(start_idx, Reverse((h, h, pushes)));

        let mut expansions = 0usize;
        let mut buf = Vec::with_capacity(8);

        while let Some((idx, _)) = open.pop() {
            if idx == goal_idx {
                return Ok(trace_back(grid, &parent, goal_idx));
            }

            if let Some(limit) = self.max_expansions {
                if expansions >= limit {
                    return Err(SearchFailure::ExpansionLimit(limit));
                }
            }
            expansions += 1;
            closed[idx] = true;

            let current = grid.cell_at(idx);
            let tentative = cost[idx] + 1;
            self.neighbors(grid, current, &mut buf);

            for &next in &buf {
                let Some(next_idx) = grid.index(next) else {
                    continue;
                };
                if closed[next_idx] || tentative >= cost[next_idx] {
                    continue;
                }

                cost[next_idx] = tentative;
                parent[next_idx] = idx;

                let h = self.connectivity.estimate(&next, &goal);
                pushes += 1;
                // Replaces the queued priority when the cell is already open
                open.push(next_idx, Reverse((tentative + h, h, pushes)));
            }
        }

        Err(SearchFailure::NoPath)
    }
}

fn trace_back(grid: &StoreGrid, parent: &[usize], goal_idx: usize) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut idx = goal_idx;
    while idx != usize::MAX {
        path.push(grid.cell_at(idx));
        idx = parent[idx];
    }
    path.reverse();
    path
}
