use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use crate::algorithms::pairwise::PairwiseDistances;
use crate::algorithms::RouteSequencer;
use crate::error::{SimulationError, SimulationResult};
use crate::models::{Cell, Distance, Route};

/// Matrix entry marking a leg with no walkable path
pub const UNREACHABLE: Distance = Distance::MAX;

/// Largest pickup count the subset DP accepts (2^n * n table)
pub const HELD_KARP_MAX_PICKUPS: usize = 20;

/// Largest pickup count brute force accepts (n! orders)
pub const EXHAUSTIVE_MAX_PICKUPS: usize = 9;

/// Total length of `start -> order... -> end`, `None` if any leg is unreachable
pub fn route_length(
    matrix: &[Vec<Distance>],
    start: usize,
    order: &[usize],
    end: usize,
) -> Option<Distance> {
    let mut total: Distance = 0;
    let mut previous = start;
    for &next in order.iter().chain(std::iter::once(&end)) {
        let leg = matrix[previous][next];
        if leg == UNREACHABLE {
            return None;
        }
        total = total.checked_add(leg)?;
        previous = next;
    }
    Some(total)
}

/// Picks the visiting order and the exit giving the shortest total walk.
///
/// Every candidate exit is solved independently (in parallel). The shortest
/// route wins; equal lengths go to the exit listed first. Exits for which
/// the sequencer finds no feasible order are skipped.
pub fn sequence_route(
    sequencer: &dyn RouteSequencer,
    distances: &PairwiseDistances,
    entrance: Cell,
    pickups: &[Cell],
    exits: &[Cell],
) -> SimulationResult<Route> {
    let infeasible = || SimulationError::InfeasibleRoute {
        pickups: pickups.len(),
        exits: exits.len(),
    };
    let start = distances.position(entrance).ok_or_else(infeasible)?;

    let mut pickup_positions: Vec<usize> = Vec::with_capacity(pickups.len());
    for cell in pickups {
        let position = distances.position(*cell).ok_or_else(infeasible)?;
        if position != start && !pickup_positions.contains(&position) {
            pickup_positions.push(position);
        }
    }

    let best = exits
        .par_iter()
        .enumerate()
        .filter_map(|(rank, exit)| {
            let end = distances.position(*exit)?;
            // A pickup on the exit cell is visited on arrival
            let between: Vec<usize> = pickup_positions
                .iter()
                .copied()
                .filter(|&p| p != end)
                .collect();
            let (order, length) =
                sequencer.order_pickups(distances.matrix(), start, &between, end)?;
            Some((length, rank, order, end))
        })
        .min_by_key(|(length, rank, _, _)| (*length, *rank));

    let (length, rank, order, end) = best.ok_or_else(infeasible)?;
    debug!(
        sequencer = sequencer.name(),
        exit = %exits[rank],
        length,
        "selected exit"
    );

    let stops = distances.stops();
    let mut route = Vec::with_capacity(order.len() + 2);
    route.push(stops[start]);
    route.extend(order.iter().map(|&p| stops[p]));
    route.push(stops[end]);

    Ok(Route::new(route, length))
}

/// Exact dynamic programming over pickup subsets
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKarp;

impl RouteSequencer for HeldKarp {
    fn name(&self) -> &'static str {
        "held-karp"
    }

    fn max_pickups(&self) -> Option<usize> {
        Some(HELD_KARP_MAX_PICKUPS)
    }

    fn order_pickups(
        &self,
        matrix: &[Vec<Distance>],
        start: usize,
        pickups: &[usize],
        end: usize,
    ) -> Option<(Vec<usize>, Distance)> {
        let k = pickups.len();
        if k == 0 {
            return route_length(matrix, start, &[], end).map(|length| (Vec::new(), length));
        }
        if k > HELD_KARP_MAX_PICKUPS {
            return None;
        }

        let full = 1usize << k;
        // cost[mask * k + last]: shortest walk from start covering `mask`, ending at `last`
        let mut cost = vec![UNREACHABLE; full * k];
        let mut parent = vec![usize::MAX; full * k];

        for (j, &p) in pickups.iter().enumerate() {
            cost[(1 << j) * k + j] = matrix[start][p];
        }

        for mask in 1..full {
            for last in 0..k {
                if mask & (1 << last) == 0 {
                    continue;
                }
                let here = cost[mask * k + last];
                if here == UNREACHABLE {
                    continue;
                }
                for next in 0..k {
                    if mask & (1 << next) != 0 {
                        continue;
                    }
                    let leg = matrix[pickups[last]][pickups[next]];
                    if leg == UNREACHABLE {
                        continue;
                    }
                    let slot = (mask | (1 << next)) * k + next;
                    let candidate = here.saturating_add(leg);
                    if candidate < cost[slot] {
                        cost[slot] = candidate;
                        parent[slot] = last;
                    }
                }
            }
        }

        let all = full - 1;
        let (mut last, length) = (0..k)
            .filter_map(|last| {
                let here = cost[all * k + last];
                let leg = matrix[pickups[last]][end];
                if here == UNREACHABLE || leg == UNREACHABLE {
                    None
                } else {
                    Some((last, here.saturating_add(leg)))
                }
            })
            .min_by_key(|&(last, length)| (length, last))?;

        let mut order = Vec::with_capacity(k);
        let mut mask = all;
        while last != usize::MAX {
            order.push(pickups[last]);
            let previous = parent[mask * k + last];
            mask &= !(1 << last);
            last = previous;
        }
        order.reverse();

        Some((order, length))
    }
}

/// Tries every permutation; only practical for a handful of pickups
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhaustive;

/// Advances `slots` to the next lexicographic permutation, `false` after the last
fn next_permutation(slots: &mut [usize]) -> bool {
    let Some(pivot) = slots.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        return false;
    };
    let successor = slots
        .iter()
        .rposition(|&slot| slot > slots[pivot])
        .unwrap_or(pivot + 1);
    slots.swap(pivot, successor);
    slots[pivot + 1..].reverse();
    true
}

impl RouteSequencer for Exhaustive {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn max_pickups(&self) -> Option<usize> {
        Some(EXHAUSTIVE_MAX_PICKUPS)
    }

    /// Walks the permutations in lexicographic order, one at a time
    fn order_pickups(
        &self,
        matrix: &[Vec<Distance>],
        start: usize,
        pickups: &[usize],
        end: usize,
    ) -> Option<(Vec<usize>, Distance)> {
        if pickups.len() > EXHAUSTIVE_MAX_PICKUPS {
            return None;
        }

        let mut slots: Vec<usize> = (0..pickups.len()).collect();
        let mut order = Vec::with_capacity(pickups.len());
        let mut best: Option<(Vec<usize>, Distance)> = None;

        loop {
            order.clear();
            order.extend(slots.iter().map(|&slot| pickups[slot]));
            if let Some(length) = route_length(matrix, start, &order, end) {
                if best.as_ref().map_or(true, |(_, min)| length < *min) {
                    best = Some((order.clone(), length));
                }
            }
            if !next_permutation(&mut slots) {
                break;
            }
        }

        best
    }
}

/// Nearest-neighbour construction refined by 2-opt and relocate moves,
/// repeated from seeded random orders
#[derive(Debug, Clone, Copy)]
pub struct LocalSearch {
    pub restarts: usize,
    pub seed: u64,
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self {
            restarts: 8,
            seed: 0,
        }
    }
}

impl LocalSearch {
    pub fn new(restarts: usize, seed: u64) -> Self {
        Self { restarts, seed }
    }

    /// Greedy order: always walk to the closest unvisited pickup
    fn nearest_neighbour(matrix: &[Vec<Distance>], start: usize, pickups: &[usize]) -> Vec<usize> {
        let mut remaining = pickups.to_vec();
        let mut order = Vec::with_capacity(pickups.len());
        let mut current = start;

        while !remaining.is_empty() {
            let slot = (0..remaining.len())
                .min_by_key(|&slot| (matrix[current][remaining[slot]], slot))
                .unwrap_or(0);
            current = remaining.remove(slot);
            order.push(current);
        }

        order
    }

    /// Applies improving moves until none is left. Returns the final length.
    fn improve(
        matrix: &[Vec<Distance>],
        start: usize,
        order: &mut Vec<usize>,
        end: usize,
    ) -> Option<Distance> {
        let mut best = route_length(matrix, start, order, end).unwrap_or(UNREACHABLE);
        let n = order.len();

        loop {
            let mut improved = false;

            // 2-opt: reverse a segment
            for i in 0..n {
                for j in (i + 1)..n {
                    order[i..=j].reverse();
                    match route_length(matrix, start, order, end) {
                        Some(length) if length < best => {
                            best = length;
                            improved = true;
                        }
                        _ => order[i..=j].reverse(),
                    }
                }
            }

            // Relocate: move one pickup elsewhere
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let pickup = order.remove(i);
                    order.insert(j, pickup);
                    match route_length(matrix, start, order, end) {
                        Some(length) if length < best => {
                            best = length;
                            improved = true;
                        }
                        _ => {
                            let pickup = order.remove(j);
                            order.insert(i, pickup);
                        }
                    }
                }
            }

            if !improved {
                break;
            }
        }

        if best == UNREACHABLE {
            None
        } else {
            Some(best)
        }
    }
}

impl RouteSequencer for LocalSearch {
    fn name(&self) -> &'static str {
        "local-search"
    }

    fn order_pickups(
        &self,
        matrix: &[Vec<Distance>],
        start: usize,
        pickups: &[usize],
        end: usize,
    ) -> Option<(Vec<usize>, Distance)> {
        let mut order = Self::nearest_neighbour(matrix, start, pickups);
        let mut best = Self::improve(matrix, start, &mut order, end).map(|length| (order, length));

        let mut rng = StdRng::seed_from_u64(self.seed);
        for _ in 0..self.restarts {
            let mut candidate = pickups.to_vec();
            candidate.shuffle(&mut rng);
            if let Some(length) = Self::improve(matrix, start, &mut candidate, end) {
                if best.as_ref().map_or(true, |(_, min)| length < *min) {
                    best = Some((candidate, length));
                }
            }
        }

        best
    }
}

/// Exact solver for small baskets, local search above `exact_limit` pickups
#[derive(Debug, Clone, Copy)]
pub struct AutoSequencer<E = HeldKarp> {
    name: &'static str,
    pub exact: E,
    pub exact_limit: usize,
    pub heuristic: LocalSearch,
}

impl Default for AutoSequencer {
    fn default() -> Self {
        Self::new(12, LocalSearch::default())
    }
}

impl AutoSequencer {
    /// Held-Karp up to `exact_limit` pickups, capped at what the DP accepts
    pub fn new(exact_limit: usize, heuristic: LocalSearch) -> Self {
        Self {
            name: "auto",
            ..Self::with_exact(HeldKarp, exact_limit, heuristic)
        }
    }
}

impl<E: RouteSequencer> AutoSequencer<E> {
    /// Uses `exact` up to `exact_limit` pickups, clamped to its own maximum
    pub fn with_exact(exact: E, exact_limit: usize, heuristic: LocalSearch) -> Self {
        let exact_limit = match exact.max_pickups() {
            Some(max) => exact_limit.min(max),
            None => exact_limit,
        };
        Self {
            name: exact.name(),
            exact,
            exact_limit,
            heuristic,
        }
    }
}

impl<E: RouteSequencer> RouteSequencer for AutoSequencer<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn order_pickups(
        &self,
        matrix: &[Vec<Distance>],
        start: usize,
        pickups: &[usize],
        end: usize,
    ) -> Option<(Vec<usize>, Distance)> {
        if pickups.len() <= self.exact_limit {
            self.exact.order_pickups(matrix, start, pickups, end)
        } else {
            self.heuristic.order_pickups(matrix, start, pickups, end)
        }
    }
}
