//! Race Server Module
//!
//! Lap-by-lap race simulation: tire wear, fuel load, driver skill and
//! pit strategy, driven by a single seeded random source.

pub mod car;
pub mod conditions;
pub mod config;
pub mod driver;
pub mod error;
pub mod pit_stop;
pub mod race;
pub mod simulation;
pub mod tire;

pub use car::{Car, CarState};
pub use conditions::{TrackConditions, Weather};
pub use config::{RaceDocument, RaceSetup};
pub use driver::Driver;
pub use error::{ConfigError, RaceError};
pub use pit_stop::{CompoundChoice, NeverPit, PitDecision, PitStopPolicy, WearThresholdPolicy};
pub use race::{LapEntry, LapSnapshot, RaceConfig, RaceEngine, RaceResult, RaceStatus};
pub use simulation::{RaceServer, ServerState};
pub use tire::{Tire, TireCompound};

/// The one random source threaded through a race
pub type RaceRng = rand_chacha::ChaCha8Rng;
