// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod simulator;
pub mod utils;

// Re-exports for convenience
pub use algorithms::pathfinder::{Connectivity, Pathfinder};
pub use algorithms::RouteSequencer;
pub use config::{SequencerKind, SimulationConfig};
pub use error::{RunError, SearchFailure, SimulationError};
pub use models::{Cell, CustomerBasket, StoreGrid, TrajectoryRecord};
pub use simulator::{BatchOutcome, TrajectorySimulator};
