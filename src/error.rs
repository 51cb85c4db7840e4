use crate::models::{ArticleId, Cell, CustomerId};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single point-to-point search gave up
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    #[error("no walkable path")]
    NoPath,

    #[error("search exceeded {0} node expansions")]
    ExpansionLimit(usize),
}

/// Failure that abandons one customer without affecting the rest of the run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("article {article} bought by customer {customer} has no pickup location")]
    LayoutInconsistency {
        customer: CustomerId,
        article: ArticleId,
    },

    #[error("article {article} has no pick-time table")]
    MissingPickTime { article: ArticleId },

    #[error("customer {customer} has no movement profile")]
    MissingProfile { customer: CustomerId },

    #[error("stop {to} is unreachable from {from}: {reason}")]
    UnreachableStop {
        from: Cell,
        to: Cell,
        reason: SearchFailure,
    },

    #[error("no feasible route through {pickups} pickups for any of {exits} exits")]
    InfeasibleRoute { pickups: usize, exits: usize },
}

/// Failure that aborts the whole run: unusable source data or output
#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input in {file} line {line}: {reason}")]
    MalformedInput {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("invalid store layout: {0}")]
    InvalidLayout(String),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("heatmap rendering error: {0}")]
    Render(String),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
pub type RunResult<T> = Result<T, RunError>;
