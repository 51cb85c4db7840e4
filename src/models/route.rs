// Route models for representing in-store walks

use crate::models::{Cell, Distance};

/// Ordered stops of one customer: entrance, pickups, chosen exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Sequence of stop cells to visit
    pub stops: Vec<Cell>,

    /// Total walking distance in grid steps
    pub length: Distance,
}

impl Route {
    pub fn new(stops: Vec<Cell>, length: Distance) -> Self {
        Self { stops, length }
    }

    pub fn entrance(&self) -> Option<Cell> {
        self.stops.first().copied()
    }

    pub fn exit(&self) -> Option<Cell> {
        self.stops.last().copied()
    }
}

/// Cell-by-cell walk of a route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkPlan {
    /// Every cell occupied, from the entrance to the exit inclusive
    pub cells: Vec<Cell>,

    /// Indices into `cells` where a pickup happens, in route order
    pub pickup_steps: Vec<usize>,
}

impl WalkPlan {
    pub fn new(cells: Vec<Cell>, pickup_steps: Vec<usize>) -> Self {
        Self {
            cells,
            pickup_steps,
        }
    }

    /// Number of moves between cells
    pub fn step_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_pickup_step(&self, idx: usize) -> bool {
        self.pickup_steps.contains(&idx)
    }
}
