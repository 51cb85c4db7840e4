// Route sequencers compared with brute force on random store floors
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use store_trajectory::algorithms::pairwise::PairwiseDistances;
use store_trajectory::algorithms::pathfinder::Pathfinder;
use store_trajectory::algorithms::sequencer::{
    route_length, sequence_route, AutoSequencer, Exhaustive, HeldKarp, LocalSearch,
    EXHAUSTIVE_MAX_PICKUPS, HELD_KARP_MAX_PICKUPS,
};
use store_trajectory::algorithms::RouteSequencer;
use store_trajectory::error::SimulationError;
use store_trajectory::models::{Cell, StoreGrid};

// Shelving rows with cross aisles at both ends, like a supermarket floor
fn aisle_floor() -> StoreGrid {
    StoreGrid::from_ascii(&[
        "E...........",
        ".##.##.##.#.",
        ".##.##.##.#.",
        ".##.##.##.#.",
        "............",
        ".##.##.##.#.",
        ".##.##.##.#.",
        "X..........X",
    ])
    .unwrap()
}

fn random_instance(rng: &mut StdRng, grid: &StoreGrid, pickups: usize) -> Vec<Cell> {
    let mut floor: Vec<Cell> = grid
        .walkable_cells()
        .filter(|cell| *cell != grid.entrance() && !grid.exits().contains(cell))
        .collect();
    floor.shuffle(rng);
    floor.truncate(pickups);
    floor
}

fn stops_for(grid: &StoreGrid, pickups: &[Cell]) -> Vec<Cell> {
    let mut stops = vec![grid.entrance()];
    stops.extend_from_slice(pickups);
    stops.extend_from_slice(grid.exits());
    stops
}

#[test]
fn test_exact_sequencers_match_brute_force() {
    let grid = aisle_floor();
    let pathfinder = Pathfinder::default();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..25 {
        let count = rng.gen_range(0..=6);
        let pickups = random_instance(&mut rng, &grid, count);
        let distances = PairwiseDistances::build(&grid, &pathfinder, &stops_for(&grid, &pickups)).unwrap();

        let brute = sequence_route(&Exhaustive, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
        for sequencer in [&HeldKarp as &dyn RouteSequencer, &AutoSequencer::default()] {
            let route = sequence_route(sequencer, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
            assert_eq!(route.length, brute.length, "{} on {:?}", sequencer.name(), pickups);
        }
    }
}

#[test]
fn test_heuristic_is_feasible_and_close() {
    let grid = aisle_floor();
    let pathfinder = Pathfinder::default();
    let mut rng = StdRng::seed_from_u64(5);
    let heuristic = LocalSearch::new(8, 3);

    for _ in 0..25 {
        let pickups = random_instance(&mut rng, &grid, 6);
        let distances = PairwiseDistances::build(&grid, &pathfinder, &stops_for(&grid, &pickups)).unwrap();

        let exact = sequence_route(&HeldKarp, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
        let route = sequence_route(&heuristic, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();

        assert!(route.length >= exact.length);
        assert_eq!(route.stops.len(), pickups.len() + 2);
        for pickup in &pickups {
            assert!(route.stops.contains(pickup));
        }

        // reported length is the walk over the matrix
        let positions: Vec<usize> = route.stops.iter().map(|c| distances.position(*c).unwrap()).collect();
        let (start, end) = (positions[0], positions[positions.len() - 1]);
        assert_eq!(
            route_length(distances.matrix(), start, &positions[1..positions.len() - 1], end),
            Some(route.length)
        );
    }
}

#[test]
fn test_heuristic_is_deterministic_for_a_seed() {
    let grid = aisle_floor();
    let mut rng = StdRng::seed_from_u64(9);
    let pickups = random_instance(&mut rng, &grid, 14);
    let distances = PairwiseDistances::build(&grid, &Pathfinder::default(), &stops_for(&grid, &pickups)).unwrap();

    let first = sequence_route(&LocalSearch::new(4, 17), &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
    let second = sequence_route(&LocalSearch::new(4, 17), &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_best_exit_is_chosen() {
    let grid = aisle_floor();
    let pathfinder = Pathfinder::default();

    // near the right-hand exit
    let pickups = vec![Cell::new(11, 5)];
    let distances = PairwiseDistances::build(&grid, &pathfinder, &stops_for(&grid, &pickups)).unwrap();
    let route = sequence_route(&HeldKarp, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
    assert_eq!(route.exit(), Some(Cell::new(11, 7)));

    // near the left-hand exit
    let pickups = vec![Cell::new(0, 5)];
    let distances = PairwiseDistances::build(&grid, &pathfinder, &stops_for(&grid, &pickups)).unwrap();
    let route = sequence_route(&HeldKarp, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
    assert_eq!(route.exit(), Some(Cell::new(0, 7)));
    assert_eq!(route.length, 7);
}

#[test]
fn test_equal_exits_prefer_first_listed() {
    let grid = StoreGrid::from_ascii(&["X.E.X"]).unwrap();
    let distances = PairwiseDistances::build(&grid, &Pathfinder::default(), &stops_for(&grid, &[])).unwrap();
    let route = sequence_route(&HeldKarp, &distances, grid.entrance(), &[], grid.exits()).unwrap();

    assert_eq!(route.exit(), Some(grid.exits()[0]));
    assert_eq!(route.length, 2);
}

#[test]
fn test_no_exits_is_infeasible() {
    let grid = aisle_floor();
    let distances = PairwiseDistances::build(&grid, &Pathfinder::default(), &[grid.entrance()]).unwrap();

    assert!(matches!(
        sequence_route(&HeldKarp, &distances, grid.entrance(), &[], &[]),
        Err(SimulationError::InfeasibleRoute { .. })
    ));
}

#[test]
fn test_long_corridor_beyond_exact_limits() {
    let corridor = format!("E{}X", ".".repeat(30));
    let grid = StoreGrid::from_ascii(&[corridor.as_str()]).unwrap();
    let pickups: Vec<Cell> = (0..21).map(|i| Cell::new(2 + i, 0)).collect();
    let distances = PairwiseDistances::build(&grid, &Pathfinder::default(), &stops_for(&grid, &pickups)).unwrap();

    // plain DP refuses baskets this large
    assert!(matches!(
        sequence_route(&HeldKarp, &distances, grid.entrance(), &pickups, grid.exits()),
        Err(SimulationError::InfeasibleRoute { pickups: 21, exits: 1 })
    ));

    let exact = AutoSequencer::with_exact(HeldKarp, HELD_KARP_MAX_PICKUPS, LocalSearch::default());
    let brute = AutoSequencer::with_exact(Exhaustive, EXHAUSTIVE_MAX_PICKUPS, LocalSearch::default());
    for sequencer in [&exact as &dyn RouteSequencer, &brute] {
        let route = sequence_route(sequencer, &distances, grid.entrance(), &pickups, grid.exits()).unwrap();
        assert_eq!(route.length, 31);
        assert_eq!(route.stops.len(), 23);
    }
}
