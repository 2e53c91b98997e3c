//! Pit Stop - Strategy deciding when to box and which tires to fit
//!
//! Policies only decide. Applying the stop is left to the engine.

use std::fmt::Debug;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::race_server::car::Car;
use crate::race_server::error::ConfigError;
use crate::race_server::tire::{TireCompound, FAILURE_THRESHOLD};
use crate::race_server::RaceRng;

/// Outcome of a pit decision for one lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitDecision {
    Stay,
    Pit(TireCompound),
}

/// Decides, lap by lap, whether a car pits.
///
/// Any randomness must come from the `rng` passed in so races replay
/// exactly from a seed.
pub trait PitStopPolicy: Debug + Send {
    fn decide(&self, car: &Car, rng: &mut RaceRng) -> PitDecision;
}

/// How a fresh compound is chosen at a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundChoice {
    Fixed(TireCompound),
    Random,
}

impl CompoundChoice {
    fn pick(self, rng: &mut RaceRng) -> TireCompound {
        match self {
            Self::Fixed(compound) => compound,
            Self::Random => *TireCompound::ALL
                .choose(rng)
                .unwrap_or(&TireCompound::Medium),
        }
    }
}

/// Pit with a fixed probability once wear crosses a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearThresholdPolicy {
    /// Wear above which a stop is considered
    pub wear_threshold: f64,
    /// Chance of stopping on any lap above the threshold
    pub pit_probability: f64,
    pub compound: CompoundChoice,
}

impl WearThresholdPolicy {
    pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.7;
    pub const DEFAULT_PIT_PROBABILITY: f64 = 0.5;

    /// Build a policy, rejecting a probability outside `[0, 1]`
    pub fn new(
        wear_threshold: f64,
        pit_probability: f64,
        compound: CompoundChoice,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&pit_probability) {
            return Err(ConfigError::PitProbabilityOutOfRange(pit_probability));
        }
        Ok(Self {
            wear_threshold,
            pit_probability,
            compound,
        })
    }

    /// Probability safe to hand to the RNG; NaN never pits
    fn effective_probability(&self) -> f64 {
        if self.pit_probability.is_nan() {
            return 0.0;
        }
        self.pit_probability.clamp(0.0, 1.0)
    }
}

impl Default for WearThresholdPolicy {
    fn default() -> Self {
        Self {
            wear_threshold: Self::DEFAULT_THRESHOLD_RATIO * FAILURE_THRESHOLD,
            pit_probability: Self::DEFAULT_PIT_PROBABILITY,
            compound: CompoundChoice::Fixed(TireCompound::Medium),
        }
    }
}

impl PitStopPolicy for WearThresholdPolicy {
    fn decide(&self, car: &Car, rng: &mut RaceRng) -> PitDecision {
        if car.tire().wear() <= self.wear_threshold {
            return PitDecision::Stay;
        }
        if rng.gen_bool(self.effective_probability()) {
            PitDecision::Pit(self.compound.pick(rng))
        } else {
            PitDecision::Stay
        }
    }
}

/// Never stops; tires run until the flag
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverPit;

impl PitStopPolicy for NeverPit {
    fn decide(&self, _car: &Car, _rng: &mut RaceRng) -> PitDecision {
        PitDecision::Stay
    }
}
