//! Car - Individual car state and lap behavior
//!
//! Each car owns its tire set and driver, burns fuel and wears tires every
//! lap it runs, and accumulates its total race time. The engine drives one
//! call per car per lap: either a racing lap or a pit stop, never both.

use serde::{Deserialize, Serialize};

use crate::race_server::conditions::TrackConditions;
use crate::race_server::driver::Driver;
use crate::race_server::error::ConfigError;
use crate::race_server::tire::{Tire, TireCompound};
use crate::race_server::RaceRng;

/// Complete state for a single car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    /// Car name, unique within a race
    name: String,
    driver: Driver,
    tire: Tire,
    /// Fuel remaining, in the same units as `fuel_capacity`
    fuel: f64,
    fuel_capacity: f64,
    /// 1-based starting slot, used to break ties
    grid_position: u32,
    /// Racing laps completed (pit ticks are not counted)
    lap_number: u32,
    /// Accumulated lap times plus pit penalties
    total_time: f64,
    pit_stop_count: u32,
    /// Dense 1..N rank from the latest lap
    position: u32,
    /// Time of the latest racing lap
    last_lap_time: Option<f64>,
    out_of_fuel: bool,
}

impl Car {
    /// Fuel capacity used when a config leaves it out
    pub const DEFAULT_FUEL_CAPACITY: f64 = 100.0;
    /// Fuel burned per racing lap
    pub const FUEL_PER_LAP: f64 = 1.5;
    /// Seconds lost per lap with a full tank
    pub const FUEL_EFFECT_FULL_TANK: f64 = 0.03;
    /// Seconds lost driving through the pit lane
    pub const PIT_LANE_TIME: f64 = 22.0;

    /// Create a car on the grid with a full tank and fresh tires
    pub fn new(
        name: impl Into<String>,
        driver: Driver,
        compound: TireCompound,
        fuel_capacity: f64,
        grid_position: u32,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if !(fuel_capacity > 0.0 && fuel_capacity.is_finite()) {
            return Err(ConfigError::NonPositiveFuelCapacity {
                car: name,
                value: fuel_capacity,
            });
        }

        Ok(Self {
            name,
            driver,
            tire: Tire::new(compound),
            fuel: fuel_capacity,
            fuel_capacity,
            grid_position,
            lap_number: 0,
            total_time: 0.0,
            pit_stop_count: 0,
            position: grid_position,
            last_lap_time: None,
            out_of_fuel: false,
        })
    }

    /// Replace the fitted tire set, e.g. to start on used tires
    pub fn with_tire(mut self, tire: Tire) -> Self {
        self.tire = tire;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn tire(&self) -> &Tire {
        &self.tire
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn fuel_capacity(&self) -> f64 {
        self.fuel_capacity
    }

    pub fn grid_position(&self) -> u32 {
        self.grid_position
    }

    pub fn lap_number(&self) -> u32 {
        self.lap_number
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn pit_stop_count(&self) -> u32 {
        self.pit_stop_count
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn last_lap_time(&self) -> Option<f64> {
        self.last_lap_time
    }

    /// Time lost to the current fuel load
    pub fn fuel_effect(&self) -> f64 {
        Self::FUEL_EFFECT_FULL_TANK * (self.fuel / self.fuel_capacity)
    }

    /// Run one racing lap and return its time.
    ///
    /// The lap is timed on the tire and fuel state from before the lap;
    /// wear and fuel burn are applied afterwards.
    pub fn compute_lap_time(
        &mut self,
        base_lap_time: f64,
        conditions: &TrackConditions,
        rng: &mut RaceRng,
    ) -> f64 {
        if self.tire.has_failed() {
            log::warn!("{} is running on a failed {} tire", self.name, self.tire.compound());
        }

        let lap_time = (base_lap_time
            + conditions.lap_time_offset()
            + self.tire.performance_modifier()
            + self.fuel_effect()
            - self.driver.ability_bonus())
        .max(0.0);

        self.last_lap_time = Some(lap_time);
        self.total_time += lap_time;
        self.lap_number += 1;
        self.tire.wear_one_lap(conditions.thermal_factor(), rng);
        self.consume_fuel();
        lap_time
    }

    fn consume_fuel(&mut self) {
        self.fuel = (self.fuel - Self::FUEL_PER_LAP).clamp(0.0, self.fuel_capacity);
        if self.fuel == 0.0 && !self.out_of_fuel {
            self.out_of_fuel = true;
            log::warn!("{} has run out of fuel after lap {}", self.name, self.lap_number);
        }
    }

    /// Fit fresh tires and return the time lost in the pit lane
    pub fn pit(&mut self, compound: TireCompound) -> f64 {
        self.tire = Tire::new(compound);
        self.pit_stop_count += 1;
        self.total_time += Self::PIT_LANE_TIME;
        Self::PIT_LANE_TIME
    }

    pub(crate) fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    /// Read-only projection for reporting
    pub fn get_state(&self) -> CarState {
        CarState::from(self)
    }
}

/// Compact car state for reporting and plotting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub name: String,
    pub driver: String,
    pub lap: u32,
    pub tire_compound: TireCompound,
    pub tire_wear: f64,
    pub fuel: f64,
    pub total_time: f64,
    pub pit_stops: u32,
    pub position: u32,
}

impl From<&Car> for CarState {
    fn from(car: &Car) -> Self {
        Self {
            name: car.name.clone(),
            driver: car.driver.name().to_string(),
            lap: car.lap_number,
            tire_compound: car.tire.compound(),
            tire_wear: car.tire.wear(),
            fuel: car.fuel,
            total_time: car.total_time,
            pit_stops: car.pit_stop_count,
            position: car.position,
        }
    }
}
