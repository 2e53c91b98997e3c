//! Error - Setup and engine error types
//!
//! Configuration problems are rejected before the first lap runs.

use thiserror::Error;

/// Errors raised while loading or validating a race configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed race config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown tire compound `{0}` (expected soft, medium or hard)")]
    UnknownCompound(String),
    #[error("race must have at least one lap")]
    NoLaps,
    #[error("lap count {0} is out of range")]
    LapsOutOfRange(i64),
    #[error("base lap time must be positive (got {0:.3})")]
    NonPositiveBaseLapTime(f64),
    #[error("race needs at least one car")]
    EmptyField,
    #[error("car name `{0}` appears more than once")]
    DuplicateCar(String),
    #[error("driver `{driver}` ability must be in (0, 1] (got {value:.3})")]
    AbilityOutOfRange { driver: String, value: f64 },
    #[error("car `{car}` fuel capacity must be positive (got {value:.3})")]
    NonPositiveFuelCapacity { car: String, value: f64 },
    #[error("pit probability must be in [0, 1] (got {0:.3})")]
    PitProbabilityOutOfRange(f64),
}

/// Errors raised by the running engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RaceError {
    #[error("race not finished: lap {current_lap} of {lap_count}")]
    NotFinished { current_lap: u32, lap_count: u32 },
    #[error("no race initialized")]
    NoRace,
}
