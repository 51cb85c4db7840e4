use std::collections::BTreeSet;

use crate::algorithms::pairwise::PairwiseDistances;
use crate::error::{SearchFailure, SimulationError, SimulationResult};
use crate::models::{Cell, Route, WalkPlan};

/// Expands a route into every cell walked.
///
/// Consecutive legs share their boundary cell, which is kept once. A pickup
/// step is the index where the route arrives at that pickup stop; a pickup on
/// the entrance is step 0 and one on the exit is the final step.
pub fn reconstruct(
    route: &Route,
    distances: &PairwiseDistances,
    pickups: &[Cell],
) -> SimulationResult<WalkPlan> {
    let Some(&first) = route.stops.first() else {
        return Ok(WalkPlan::default());
    };

    let mut pending: BTreeSet<Cell> = pickups.iter().copied().collect();
    let mut cells = vec![first];
    let mut pickup_steps = Vec::with_capacity(pending.len());

    if pending.remove(&first) {
        pickup_steps.push(0);
    }

    for leg in route.stops.windows(2) {
        let (from, to) = (leg[0], leg[1]);
        let path = distances
            .path(from, to)
            .ok_or(SimulationError::UnreachableStop {
                from,
                to,
                reason: SearchFailure::NoPath,
            })?;
        cells.extend_from_slice(&path[1..]);

        if pending.remove(&to) {
            pickup_steps.push(cells.len() - 1);
        }
    }

    Ok(WalkPlan::new(cells, pickup_steps))
}
