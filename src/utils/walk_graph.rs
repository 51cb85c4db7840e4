use petgraph::algo::dijkstra;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet};

use crate::algorithms::pathfinder::Pathfinder;
use crate::models::{Cell, Distance, StoreGrid};

/// Walkable floor as an undirected graph, one edge per allowed move
pub struct WalkGraph {
    graph: UnGraphMap<Cell, ()>,
}

impl WalkGraph {
    /// Builds the graph with the same move rules as the pathfinder
    pub fn from_grid(grid: &StoreGrid, pathfinder: &Pathfinder) -> Self {
        let mut graph = UnGraphMap::new();
        let mut neighbors = Vec::with_capacity(8);

        for cell in grid.walkable_cells() {
            graph.add_node(cell);
            pathfinder.neighbors(grid, cell, &mut neighbors);
            for &next in &neighbors {
                graph.add_edge(cell, next, ());
            }
        }

        WalkGraph { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cells connected to `start`, itself included; empty off the walkable floor
    pub fn reachable_from(&self, start: Cell) -> HashSet<Cell> {
        let mut reachable = HashSet::new();
        if !self.graph.contains_node(start) {
            return reachable;
        }

        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(cell) = bfs.next(&self.graph) {
            reachable.insert(cell);
        }
        reachable
    }

    /// Exact step distance from `start` to every connected cell
    pub fn step_distances(&self, start: Cell) -> HashMap<Cell, Distance> {
        if !self.graph.contains_node(start) {
            return HashMap::new();
        }
        dijkstra(&self.graph, start, None, |_| 1 as Distance)
    }
}
