pub mod pairwise;
pub mod pathfinder;
pub mod reconstruct;
pub mod sequencer;
pub mod timeline;

// Common algorithm traits
use crate::models::Distance;

/// Trait for fixed-start, fixed-end visit-all route solvers
pub trait RouteSequencer: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Orders `pickups` so that walking `start -> pickups... -> end` is as
    /// short as the solver can make it.
    ///
    /// All arguments are indices into `matrix`. `pickups` never contains
    /// `start` or `end`. Returns the pickup order and the total length, or
    /// `None` when no order avoids an unreachable leg.
    fn order_pickups(
        &self,
        matrix: &[Vec<Distance>],
        start: usize,
        pickups: &[usize],
        end: usize,
    ) -> Option<(Vec<usize>, Distance)>;

    /// Largest pickup count the solver accepts; `None` means unbounded
    fn max_pickups(&self) -> Option<usize> {
        None
    }
}
