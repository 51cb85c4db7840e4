use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use store_trajectory::models::group_baskets;
use store_trajectory::utils::heatmap::OccupancyMap;
use store_trajectory::utils::input::load_store_data;
use store_trajectory::utils::output::{save_report, save_trajectory, RunReport};
use store_trajectory::{SimulationConfig, TrajectorySimulator};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // optional config file as first argument
    let config = match env::args().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "loading configuration");
            SimulationConfig::from_file(&path)?
        }
        None => {
            info!("no configuration file given, using defaults");
            SimulationConfig::default()
        }
    };

    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let data = load_store_data(&config.inputs)?;
    let mut baskets = group_baskets(&data.tickets);
    if let Some(limit) = config.customer_limit {
        baskets.truncate(limit);
    }

    let simulator = TrajectorySimulator::with_sequencer(
        data.grid,
        data.catalog,
        data.profiles,
        config.pathfinder(),
        config.sequencer(),
    )
    .with_checkout_seconds_per_unit(config.checkout_seconds_per_unit);

    let start = Instant::now();
    let outcome = simulator.run(&baskets);
    info!(elapsed = ?start.elapsed(), "routing finished");

    save_trajectory(&config.output.trajectory, &outcome.records)?;
    info!(
        path = %config.output.trajectory.display(),
        rows = outcome.records.len(),
        "trajectory written"
    );

    if let Some(path) = &config.output.report {
        save_report(path, &RunReport::from_outcome(&outcome))?;
        info!(path = %path.display(), "run report written");
    }

    if let Some(path) = &config.output.heatmap {
        let occupancy = OccupancyMap::from_records(simulator.grid(), &outcome.records);
        occupancy.render_png(simulator.grid(), path)?;
        if let Some((cell, seconds)) = occupancy.busiest() {
            info!(cell = %cell, seconds, "busiest cell");
        }
        info!(path = %path.display(), "heatmap written");
    }

    if !outcome.failures.is_empty() {
        warn!(
            failed = outcome.failures.len(),
            "some customers could not be simulated"
        );
    }

    Ok(())
}
