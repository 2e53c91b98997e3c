//! Tire - Compound catalog and wear model
//!
//! Wear grows linearly with a small seeded jitter. Below the failure
//! threshold the lap-time penalty scales with wear; at or above it the
//! tire has failed and costs a fixed, much larger penalty.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::race_server::error::ConfigError;
use crate::race_server::RaceRng;

/// Seconds added per unit of wear while the tire is still healthy.
pub const WEAR_PENALTY_COEFFICIENT: f64 = 2.0;
/// Wear at which the tire is considered failed.
pub const FAILURE_THRESHOLD: f64 = 1.0;
/// Upper clamp for accumulated wear.
pub const WEAR_CEILING: f64 = 1.0;
/// Fixed time penalty for running on a failed tire.
pub const FAILURE_PENALTY: f64 = 15.0;
/// Wear of a freshly fitted tire.
pub const FRESH_WEAR: f64 = 0.0;
/// Relative jitter applied to each lap's wear increment.
pub const WEAR_JITTER: f64 = 0.1;

/// Static per-compound characteristics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundSpec {
    /// Wear added per lap
    pub wear_rate: f64,
    /// Lap time offset on a fresh tire (negative = faster)
    pub base_performance: f64,
}

/// Tire compounds available in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TireCompound {
    Soft,
    Medium,
    Hard,
}

impl TireCompound {
    pub const ALL: [TireCompound; 3] = [Self::Soft, Self::Medium, Self::Hard];

    const SOFT: CompoundSpec = CompoundSpec {
        wear_rate: 0.03,
        base_performance: -0.5,
    };
    const MEDIUM: CompoundSpec = CompoundSpec {
        wear_rate: 0.02,
        base_performance: 0.0,
    };
    const HARD: CompoundSpec = CompoundSpec {
        wear_rate: 0.01,
        base_performance: 0.5,
    };

    /// Catalog entry for this compound
    pub const fn spec(self) -> CompoundSpec {
        match self {
            Self::Soft => Self::SOFT,
            Self::Medium => Self::MEDIUM,
            Self::Hard => Self::HARD,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for TireCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TireCompound {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigError::UnknownCompound(s.to_string())),
        }
    }
}

/// A set of tires fitted to one car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tire {
    compound: TireCompound,
    wear: f64,
}

impl Tire {
    /// Fresh tire of the given compound
    pub fn new(compound: TireCompound) -> Self {
        Self {
            compound,
            wear: FRESH_WEAR,
        }
    }

    /// Tire with a preset wear level, clamped into `[0, WEAR_CEILING]`
    pub fn with_wear(compound: TireCompound, wear: f64) -> Self {
        Self {
            compound,
            wear: clamp_wear(wear),
        }
    }

    pub fn compound(&self) -> TireCompound {
        self.compound
    }

    pub fn wear(&self) -> f64 {
        self.wear
    }

    pub fn has_failed(&self) -> bool {
        self.wear >= FAILURE_THRESHOLD
    }

    /// Accumulate one lap of wear.
    ///
    /// `thermal_factor` comes from the track conditions and is expected to
    /// be positive; the increment itself is never negative.
    pub fn wear_one_lap(&mut self, thermal_factor: f64, rng: &mut RaceRng) {
        let jitter = rng.gen_range(-WEAR_JITTER..=WEAR_JITTER);
        let increment = (self.compound.spec().wear_rate * thermal_factor * (1.0 + jitter)).max(0.0);
        self.wear = clamp_wear(self.wear + increment);
    }

    /// Lap time offset from compound and wear
    pub fn performance_modifier(&self) -> f64 {
        if self.has_failed() {
            return FAILURE_PENALTY;
        }
        self.compound.spec().base_performance + self.wear * WEAR_PENALTY_COEFFICIENT
    }
}

fn clamp_wear(wear: f64) -> f64 {
    if wear.is_nan() {
        return WEAR_CEILING;
    }
    wear.clamp(0.0, WEAR_CEILING)
}
