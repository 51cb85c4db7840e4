use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::algorithms::pathfinder::{Connectivity, Pathfinder};
use crate::algorithms::sequencer::{
    AutoSequencer, Exhaustive, HeldKarp, LocalSearch, EXHAUSTIVE_MAX_PICKUPS, HELD_KARP_MAX_PICKUPS,
};
use crate::algorithms::RouteSequencer;
use crate::error::{RunError, RunResult};
use crate::models::Seconds;
use crate::simulator::DEFAULT_CHECKOUT_SECONDS_PER_UNIT;
use crate::utils::input::InputPaths;
use crate::utils::output::OutputPaths;

/// Which solver orders a customer's pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencerKind {
    #[default]
    Auto,
    Exact,
    Heuristic,
    Exhaustive,
}

/// Run configuration, read from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub inputs: InputPaths,
    pub output: OutputPaths,
    pub connectivity: Connectivity,
    pub max_expansions: Option<usize>,
    pub sequencer: SequencerKind,
    pub exact_pickup_limit: usize,
    pub restarts: usize,
    pub seed: u64,
    pub checkout_seconds_per_unit: Seconds,
    pub customer_limit: Option<usize>,
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            output: OutputPaths::default(),
            connectivity: Connectivity::default(),
            max_expansions: None,
            sequencer: SequencerKind::default(),
            exact_pickup_limit: 12,
            restarts: 8,
            seed: 0,
            checkout_seconds_per_unit: DEFAULT_CHECKOUT_SECONDS_PER_UNIT,
            customer_limit: None,
            threads: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> RunResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| RunError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> RunResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn pathfinder(&self) -> Pathfinder {
        let pathfinder = Pathfinder::new(self.connectivity);
        match self.max_expansions {
            Some(cap) => pathfinder.with_max_expansions(cap),
            None => pathfinder,
        }
    }

    /// Builds the configured solver. Exact solvers hand baskets beyond
    /// their size limit to local search.
    pub fn sequencer(&self) -> Box<dyn RouteSequencer> {
        let heuristic = LocalSearch::new(self.restarts, self.seed);
        match self.sequencer {
            SequencerKind::Auto => Box::new(AutoSequencer::new(self.exact_pickup_limit, heuristic)),
            SequencerKind::Exact => Box::new(AutoSequencer::with_exact(
                HeldKarp,
                HELD_KARP_MAX_PICKUPS,
                heuristic,
            )),
            SequencerKind::Heuristic => Box::new(heuristic),
            SequencerKind::Exhaustive => Box::new(AutoSequencer::with_exact(
                Exhaustive,
                EXHAUSTIVE_MAX_PICKUPS,
                heuristic,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();

        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.output.trajectory, PathBuf::from("data/output.csv"));
        assert_eq!(config.sequencer().name(), "auto");
        assert_eq!(config.pathfinder(), Pathfinder::default());
    }

    #[test]
    fn test_partial_config() {
        let config = SimulationConfig::from_toml_str(
            r#"
connectivity = "eight"
max_expansions = 5000
sequencer = "heuristic"
customer_limit = 3

[inputs]
tickets = "other/tickets.csv"

[output]
report = "out/report.json"
"#,
        )
        .unwrap();

        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.pathfinder().max_expansions, Some(5000));
        assert_eq!(config.sequencer().name(), "local-search");
        assert_eq!(config.customer_limit, Some(3));
        assert_eq!(config.inputs.tickets, PathBuf::from("other/tickets.csv"));
        assert_eq!(config.inputs.planogram, InputPaths::default().planogram);
        assert_eq!(config.output.report, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn test_exact_kinds_accept_large_baskets() {
        // start 0, end 23, 22 pickups on a line
        let n = HELD_KARP_MAX_PICKUPS + 4;
        let matrix: Vec<Vec<u32>> = (0..n)
            .map(|i| (0..n).map(|j| (i as i64 - j as i64).unsigned_abs() as u32).collect())
            .collect();
        let pickups: Vec<usize> = (1..n - 1).collect();

        for kind in [SequencerKind::Exact, SequencerKind::Exhaustive] {
            let config = SimulationConfig {
                sequencer: kind,
                ..SimulationConfig::default()
            };
            let sequencer = config.sequencer();
            let (order, length) = sequencer.order_pickups(&matrix, 0, &pickups, n - 1).unwrap();
            assert_eq!(order.len(), pickups.len());
            assert_eq!(length, (n - 1) as u32);
        }
        let exact = SimulationConfig {
            sequencer: SequencerKind::Exact,
            ..SimulationConfig::default()
        };
        assert_eq!(exact.sequencer().name(), "held-karp");
    }

    #[test]
    fn test_unknown_sequencer_is_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("sequencer = \"genetic\""),
            Err(RunError::Config(_))
        ));
    }
}
