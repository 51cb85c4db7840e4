use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::algorithms::pairwise::PairwiseDistances;
use crate::algorithms::pathfinder::Pathfinder;
use crate::algorithms::reconstruct::reconstruct;
use crate::algorithms::sequencer::{sequence_route, AutoSequencer};
use crate::algorithms::timeline::{checkout_seconds, simulate, DwellSchedule};
use crate::algorithms::RouteSequencer;
use crate::error::{SearchFailure, SimulationError, SimulationResult};
use crate::models::{
    Cell, CustomerBasket, CustomerId, CustomerProfile, PickTimeCatalog, Route, Seconds, StoreGrid,
    TrajectoryRecord, WalkPlan,
};
use crate::utils::walk_graph::WalkGraph;

/// Seconds per purchased unit spent at checkout unless configured otherwise
pub const DEFAULT_CHECKOUT_SECONDS_PER_UNIT: Seconds = 5;

/// Route and walk computed for one customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPlan {
    pub route: Route,
    pub walk: WalkPlan,

    /// Pick seconds for each entry of `walk.pickup_steps`
    pub pick_seconds: Vec<Seconds>,
}

/// A customer abandoned during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFailure {
    pub customer_id: CustomerId,
    pub error: SimulationError,
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// All customers' records, ordered by timestamp
    pub records: Vec<TrajectoryRecord>,

    /// Number of customers simulated successfully
    pub routed: usize,

    /// Customers abandoned, in basket order
    pub failures: Vec<CustomerFailure>,
}

/// Routes and simulates customers over one shared store floor
pub struct TrajectorySimulator {
    grid: StoreGrid,
    catalog: PickTimeCatalog,
    profiles: HashMap<CustomerId, CustomerProfile>,
    pathfinder: Pathfinder,
    sequencer: Box<dyn RouteSequencer>,
    checkout_seconds_per_unit: Seconds,

    /// Cells connected to the entrance
    reachable: HashSet<Cell>,

    /// Exits connected to the entrance, in planogram order
    exits: Vec<Cell>,
}

impl TrajectorySimulator {
    /// Creates a simulator with the default auto sequencer
    pub fn new(
        grid: StoreGrid,
        catalog: PickTimeCatalog,
        profiles: Vec<CustomerProfile>,
        pathfinder: Pathfinder,
    ) -> Self {
        Self::with_sequencer(
            grid,
            catalog,
            profiles,
            pathfinder,
            Box::new(AutoSequencer::default()),
        )
    }

    /// Creates a simulator and checks the floor's connectivity once
    pub fn with_sequencer(
        grid: StoreGrid,
        catalog: PickTimeCatalog,
        profiles: Vec<CustomerProfile>,
        pathfinder: Pathfinder,
        sequencer: Box<dyn RouteSequencer>,
    ) -> Self {
        let walk_graph = WalkGraph::from_grid(&grid, &pathfinder);
        let reachable = walk_graph.reachable_from(grid.entrance());
        debug!(
            nodes = walk_graph.node_count(),
            edges = walk_graph.edge_count(),
            reachable = reachable.len(),
            "built walk graph"
        );

        let exits: Vec<Cell> = grid
            .exits()
            .iter()
            .copied()
            .filter(|exit| reachable.contains(exit))
            .collect();
        for exit in grid.exits().iter().filter(|exit| !reachable.contains(exit)) {
            warn!(exit = %exit, "exit is unreachable from the entrance and will not be used");
        }

        let mut stranded: Vec<_> = grid
            .pickups()
            .iter()
            .filter(|(_, cell)| !reachable.contains(cell))
            .map(|(article, cell)| (article.clone(), *cell))
            .collect();
        stranded.sort();
        for (article, cell) in stranded {
            warn!(article = %article, cell = %cell, "pickup cell is unreachable from the entrance");
        }

        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.customer_id.clone(), profile))
            .collect();

        Self {
            grid,
            catalog,
            profiles,
            pathfinder,
            sequencer,
            checkout_seconds_per_unit: DEFAULT_CHECKOUT_SECONDS_PER_UNIT,
            reachable,
            exits,
        }
    }

    pub fn with_checkout_seconds_per_unit(mut self, seconds: Seconds) -> Self {
        self.checkout_seconds_per_unit = seconds;
        self
    }

    pub fn grid(&self) -> &StoreGrid {
        &self.grid
    }

    /// Exits that customers can actually reach
    pub fn usable_exits(&self) -> &[Cell] {
        &self.exits
    }

    /// Computes the shortest route and its walk for one customer
    pub fn plan_customer(&self, basket: &CustomerBasket) -> SimulationResult<CustomerPlan> {
        let stops_by_cell = basket.pickup_stops(&self.grid)?;
        let pick_seconds_by_cell = self.pick_seconds_by_cell(basket, &stops_by_cell)?;

        let entrance = self.grid.entrance();
        let pickups: Vec<Cell> = stops_by_cell.keys().copied().collect();

        // Stops cut off from the entrance would exhaust the whole floor in A*
        if let Some(&stranded) = pickups.iter().find(|cell| !self.reachable.contains(cell)) {
            return Err(SimulationError::UnreachableStop {
                from: entrance,
                to: stranded,
                reason: SearchFailure::NoPath,
            });
        }
        if self.exits.is_empty() {
            return Err(SimulationError::InfeasibleRoute {
                pickups: pickups.len(),
                exits: self.grid.exits().len(),
            });
        }

        let mut stops = Vec::with_capacity(pickups.len() + self.exits.len() + 1);
        stops.push(entrance);
        stops.extend_from_slice(&pickups);
        stops.extend_from_slice(&self.exits);

        let distances = PairwiseDistances::build(&self.grid, &self.pathfinder, &stops)?;
        let route = sequence_route(
            self.sequencer.as_ref(),
            &distances,
            entrance,
            &pickups,
            &self.exits,
        )?;
        let walk = reconstruct(&route, &distances, &pickups)?;

        let pick_seconds = walk
            .pickup_steps
            .iter()
            .map(|&step| {
                pick_seconds_by_cell
                    .get(&walk.cells[step])
                    .copied()
                    .unwrap_or(0)
            })
            .collect();

        debug!(
            customer = %basket.customer_id,
            pickups = pickups.len(),
            exit = ?route.exit(),
            length = route.length,
            "planned route"
        );

        Ok(CustomerPlan {
            route,
            walk,
            pick_seconds,
        })
    }

    /// Sums tiered pick times of every article collected at each stop
    fn pick_seconds_by_cell(
        &self,
        basket: &CustomerBasket,
        stops_by_cell: &BTreeMap<Cell, Vec<String>>,
    ) -> SimulationResult<HashMap<Cell, Seconds>> {
        let mut seconds = HashMap::with_capacity(stops_by_cell.len());
        for (cell, articles) in stops_by_cell {
            let mut total: Seconds = 0;
            for article in articles {
                let quantity = basket.items.get(article).copied().unwrap_or(0);
                let seconds = self.catalog.seconds_for(article, quantity).ok_or_else(|| {
                    SimulationError::MissingPickTime {
                        article: article.clone(),
                    }
                })?;
                total = total.saturating_add(seconds);
            }
            seconds.insert(*cell, total);
        }
        Ok(seconds)
    }

    /// Plans one customer and expands the walk into per-second records
    pub fn simulate_customer(
        &self,
        basket: &CustomerBasket,
    ) -> SimulationResult<Vec<TrajectoryRecord>> {
        let profile = self.profiles.get(&basket.customer_id).ok_or_else(|| {
            SimulationError::MissingProfile {
                customer: basket.customer_id.clone(),
            }
        })?;
        let plan = self.plan_customer(basket)?;

        let schedule = DwellSchedule {
            step_seconds: profile.step_seconds,
            pick_seconds: plan.pick_seconds,
            checkout_seconds: checkout_seconds(
                basket.total_quantity(),
                self.checkout_seconds_per_unit,
                profile.step_seconds,
            ),
        };

        Ok(simulate(
            &plan.walk,
            &schedule,
            &basket.customer_id,
            &basket.ticket_id,
            basket.entered_at,
        ))
    }

    /// Simulates every basket in parallel.
    ///
    /// A failing customer is reported and skipped. Records are merged and
    /// stably sorted by timestamp, so equal timestamps keep basket order.
    pub fn run(&self, baskets: &[CustomerBasket]) -> BatchOutcome {
        info!(
            customers = baskets.len(),
            sequencer = self.sequencer.name(),
            "Starting trajectory simulation"
        );

        let results: Vec<_> = baskets
            .par_iter()
            .map(|basket| (basket, self.simulate_customer(basket)))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (basket, result) in results {
            match result {
                Ok(records) => {
                    outcome.routed += 1;
                    outcome.records.extend(records);
                }
                Err(error) => {
                    warn!(customer = %basket.customer_id, %error, "customer abandoned");
                    outcome.failures.push(CustomerFailure {
                        customer_id: basket.customer_id.clone(),
                        error,
                    });
                }
            }
        }
        outcome.records.sort_by_key(|record| record.timestamp);

        info!(
            routed = outcome.routed,
            failed = outcome.failures.len(),
            records = outcome.records.len(),
            "Finished trajectory simulation"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PickTimeTable;
    use chrono::{NaiveDate, NaiveDateTime};

    fn opening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 11, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn create_test_simulator(rows: &[&str]) -> TrajectorySimulator {
        let grid = StoreGrid::from_ascii(rows).unwrap();
        let mut catalog = PickTimeCatalog::new();
        catalog.insert("a", PickTimeTable::new([4, 3, 2, 1, 1]));
        catalog.insert("b", PickTimeTable::new([6, 6, 6, 6, 6]));
        let profiles = vec![CustomerProfile::new("c1", 1), CustomerProfile::new("c2", 2)];
        TrajectorySimulator::new(grid, catalog, profiles, Pathfinder::default())
    }

    fn basket(customer: &str, items: &[(&str, u32)]) -> CustomerBasket {
        let mut basket = CustomerBasket::new(customer, format!("T-{}", customer), opening());
        for (article, quantity) in items {
            basket.add_item(*article, *quantity);
        }
        basket
    }

    #[test]
    fn test_plan_visits_every_pickup() {
        let simulator = create_test_simulator(&["E.a..", ".###.", "..b.X"]);
        let plan = simulator
            .plan_customer(&basket("c1", &[("a", 2), ("b", 1)]))
            .unwrap();

        assert_eq!(plan.walk.pickup_steps.len(), 2);
        assert_eq!(plan.route.stops.first(), Some(&Cell::new(0, 0)));
        assert_eq!(plan.route.stops.last(), Some(&Cell::new(4, 2)));
        assert_eq!(plan.walk.step_count() as u32, plan.route.length);

        let mut seconds = plan.pick_seconds.clone();
        seconds.sort();
        assert_eq!(seconds, vec![6, 7]);
    }

    #[test]
    fn test_unreachable_exit_is_ignored() {
        let simulator = create_test_simulator(&["E.a#X", "...#.", "X...."]);
        assert_eq!(simulator.usable_exits().len(), 2);

        let walled = create_test_simulator(&["E.a#X", "...##"]);
        assert_eq!(walled.usable_exits().len(), 0);
        assert!(matches!(
            walled.plan_customer(&basket("c1", &[("a", 1)])),
            Err(SimulationError::InfeasibleRoute { .. })
        ));
    }

    #[test]
    fn test_failures_are_isolated() {
        let simulator = create_test_simulator(&["E.a.X"]);
        let baskets = vec![
            basket("c1", &[("a", 1)]),
            basket("c2", &[("zz", 1)]),
            basket("c3", &[("a", 1)]),
        ];
        let outcome = simulator.run(&baskets);

        assert_eq!(outcome.routed, 1);
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(
            outcome.failures[0].error,
            SimulationError::LayoutInconsistency { .. }
        ));
        assert_eq!(
            outcome.failures[1].error,
            SimulationError::MissingProfile {
                customer: "c3".into()
            }
        );
        assert!(outcome.records.iter().all(|r| r.customer_id == "c1"));
    }

    #[test]
    fn test_walled_off_pickup_fails_only_its_customer() {
        // b sits in a pocket closed off by shelving
        let simulator = create_test_simulator(&["E.#b", "..##", "a..X"]);
        let outcome = simulator.run(&[basket("c1", &[("b", 1)]), basket("c2", &[("a", 1)])]);

        assert_eq!(outcome.routed, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].customer_id, "c1");
        assert_eq!(
            outcome.failures[0].error,
            SimulationError::UnreachableStop {
                from: Cell::new(0, 0),
                to: Cell::new(3, 0),
                reason: SearchFailure::NoPath,
            }
        );
        assert!(outcome.records.iter().all(|r| r.customer_id == "c2"));
        assert!(outcome.records.iter().any(|r| r.is_picking && (r.x, r.y) == (0, 2)));

        assert!(matches!(
            simulator.plan_customer(&basket("c1", &[("a", 1), ("b", 2)])),
            Err(SimulationError::UnreachableStop { to, .. }) if to == Cell::new(3, 0)
        ));
    }

    #[test]
    fn test_missing_pick_time() {
        let grid = StoreGrid::from_ascii(&["E.a.X"]).unwrap();
        let simulator = TrajectorySimulator::new(
            grid,
            PickTimeCatalog::new(),
            vec![CustomerProfile::new("c1", 1)],
            Pathfinder::default(),
        );

        assert_eq!(
            simulator.simulate_customer(&basket("c1", &[("a", 1)])),
            Err(SimulationError::MissingPickTime {
                article: "a".into()
            })
        );
    }
}
