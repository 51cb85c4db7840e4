use rayon::prelude::*;
use std::collections::HashMap;

use crate::algorithms::pathfinder::Pathfinder;
use crate::error::{SimulationError, SimulationResult};
use crate::models::{Cell, Distance, StoreGrid};

/// Shortest paths between every ordered pair of one customer's stops.
///
/// Both directions are searched independently: tie-breaking may pick different
/// equal-length paths each way, and reconstruction must use the path that
/// matches the direction actually walked.
#[derive(Debug, Clone)]
pub struct PairwiseDistances {
    /// Distinct stops; the position is the matrix index
    stops: Vec<Cell>,
    positions: HashMap<Cell, usize>,

    /// (from, to) -> cells walked, both endpoints included
    paths: HashMap<(usize, usize), Vec<Cell>>,

    /// matrix[from][to] = path length in steps
    matrix: Vec<Vec<Distance>>,
}

impl PairwiseDistances {
    /// Searches a path for every ordered pair of distinct stops.
    ///
    /// Duplicate stops are collapsed, keeping the first occurrence. The first
    /// failed search (in pair order) aborts construction.
    pub fn build(
        grid: &StoreGrid,
        pathfinder: &Pathfinder,
        stops: &[Cell],
    ) -> SimulationResult<Self> {
        let mut unique = Vec::with_capacity(stops.len());
        let mut positions = HashMap::with_capacity(stops.len());
        for &stop in stops {
            if !positions.contains_key(&stop) {
                positions.insert(stop, unique.len());
                unique.push(stop);
            }
        }

        let n = unique.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();

        let searched: Vec<_> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let result = pathfinder.shortest_path(grid, unique[i], unique[j]);
                ((i, j), result)
            })
            .collect();

        let mut matrix = vec![vec![0; n]; n];
        let mut paths = HashMap::with_capacity(searched.len() + n);
        for ((i, j), result) in searched {
            let path = result.map_err(|reason| SimulationError::UnreachableStop {
                from: unique[i],
                to: unique[j],
                reason,
            })?;
            matrix[i][j] = (path.len() - 1) as Distance;
            paths.insert((i, j), path);
        }
        for (i, &stop) in unique.iter().enumerate() {
            paths.insert((i, i), vec![stop]);
        }

        Ok(Self {
            stops: unique,
            positions,
            paths,
            matrix,
        })
    }

    /// Distinct stops in matrix order
    pub fn stops(&self) -> &[Cell] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Matrix index of a stop
    pub fn position(&self, stop: Cell) -> Option<usize> {
        self.positions.get(&stop).copied()
    }

    /// Dense distance matrix indexed by stop position
    pub fn matrix(&self) -> &[Vec<Distance>] {
        &self.matrix
    }

    pub fn distance(&self, from: Cell, to: Cell) -> Option<Distance> {
        let (i, j) = (self.position(from)?, self.position(to)?);
        Some(self.matrix[i][j])
    }

    /// Cells walked from `from` to `to`, both included
    pub fn path(&self, from: Cell, to: Cell) -> Option<&[Cell]> {
        let (i, j) = (self.position(from)?, self.position(to)?);
        self.paths.get(&(i, j)).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchFailure;

    #[test]
    fn test_lengths_match_paths() {
        let grid = StoreGrid::from_ascii(&["E.#..", "..#a.", "....X"]).unwrap();
        let stops = vec![Cell::new(0, 0), Cell::new(3, 1), Cell::new(4, 2)];
        let distances = PairwiseDistances::build(&grid, &Pathfinder::default(), &stops).unwrap();

        assert_eq!(distances.len(), 3);
        for &a in &stops {
            for &b in &stops {
                let path = distances.path(a, b).unwrap();
                assert_eq!(distances.distance(a, b), Some((path.len() - 1) as Distance));
                assert_eq!(path.first(), Some(&a));
                assert_eq!(path.last(), Some(&b));
            }
        }
        assert_eq!(distances.distance(Cell::new(0, 0), Cell::new(3, 1)), Some(6));
    }

    #[test]
    fn test_duplicate_stops_collapse() {
        let grid = StoreGrid::from_ascii(&["E..X"]).unwrap();
        let stops = vec![Cell::new(0, 0), Cell::new(2, 0), Cell::new(2, 0), Cell::new(3, 0)];
        let distances = PairwiseDistances::build(&grid, &Pathfinder::default(), &stops).unwrap();

        assert_eq!(distances.stops(), &[Cell::new(0, 0), Cell::new(2, 0), Cell::new(3, 0)]);
        assert_eq!(distances.position(Cell::new(3, 0)), Some(2));
        assert_eq!(distances.distance(Cell::new(3, 0), Cell::new(3, 0)), Some(0));
    }

    #[test]
    fn test_unreachable_stop_aborts() {
        let grid = StoreGrid::from_ascii(&["E.#.X"]).unwrap();
        let stops = vec![Cell::new(0, 0), Cell::new(4, 0)];
        let result = PairwiseDistances::build(&grid, &Pathfinder::default(), &stops);

        assert_eq!(
            result.unwrap_err(),
            SimulationError::UnreachableStop {
                from: Cell::new(0, 0),
                to: Cell::new(4, 0),
                reason: SearchFailure::NoPath,
            }
        );
    }
}
