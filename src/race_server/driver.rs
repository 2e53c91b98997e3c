//! Driver - Skill coefficient behind the wheel

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::race_server::error::ConfigError;
use crate::race_server::RaceRng;

/// Lowest ability handed out when a config omits it
pub const MIN_RANDOM_ABILITY: f64 = 0.1;
/// Seconds per lap gained by a driver of ability 1.0
pub const ABILITY_BONUS_SCALE: f64 = 1.0;

/// A driver with a fixed skill level.
///
/// Ability lies in `(0, 1]`, 1.0 being the best. It is set once and never
/// changes during a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    name: String,
    ability: f64,
}

impl Driver {
    /// Create a driver, rejecting an `ability` outside `(0, 1]`.
    pub fn new(name: impl Into<String>, ability: f64) -> Result<Self, ConfigError> {
        let name = name.into();
        if !(ability > 0.0 && ability <= 1.0) {
            return Err(ConfigError::AbilityOutOfRange {
                driver: name,
                value: ability,
            });
        }
        Ok(Self { name, ability })
    }

    /// Create a driver with an ability drawn from the race RNG
    pub fn with_random_ability(name: impl Into<String>, rng: &mut RaceRng) -> Self {
        Self {
            name: name.into(),
            ability: rng.gen_range(MIN_RANDOM_ABILITY..=1.0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ability(&self) -> f64 {
        self.ability
    }

    /// Time gained per lap thanks to skill
    pub fn ability_bonus(&self) -> f64 {
        self.ability * ABILITY_BONUS_SCALE
    }
}
