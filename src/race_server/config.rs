//! Config - Race definition document
//!
//! A JSON document with a `race` section and an ordered `cars` list. Every
//! problem is reported before the engine is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::race_server::car::Car;
use crate::race_server::conditions::{TrackConditions, Weather};
use crate::race_server::driver::Driver;
use crate::race_server::error::ConfigError;
use crate::race_server::race::RaceConfig;
use crate::race_server::tire::TireCompound;
use crate::race_server::RaceRng;

/// Driver name used when a car entry has none
pub const UNKNOWN_DRIVER: &str = "Unknown";

/// Top-level race document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceDocument {
    pub race: RaceSection,
    pub cars: Vec<CarEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSection {
    pub name: String,
    pub laps: i64,
    pub base_lap_time: f64,
    #[serde(default)]
    pub track_temperature: Option<f64>,
    #[serde(default)]
    pub weather: Option<Weather>,
    /// Seed used when the caller does not supply one
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarEntry {
    pub name: String,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub ability: Option<f64>,
    pub tire: String,
    #[serde(default)]
    pub fuel_capacity: Option<f64>,
}

/// Validated race parameters and grid, ready for the engine
#[derive(Debug, Clone)]
pub struct RaceSetup {
    pub config: RaceConfig,
    pub cars: Vec<Car>,
}

impl RaceDocument {
    /// Read and parse a document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate the document and build the grid.
    ///
    /// Missing abilities are drawn from `rng` in grid order, one per car.
    pub fn into_setup(self, rng: &mut RaceRng) -> Result<RaceSetup, ConfigError> {
        let race = self.race;
        if race.laps <= 0 {
            return Err(ConfigError::NoLaps);
        }
        let lap_count =
            u32::try_from(race.laps).map_err(|_| ConfigError::LapsOutOfRange(race.laps))?;
        if !(race.base_lap_time > 0.0 && race.base_lap_time.is_finite()) {
            return Err(ConfigError::NonPositiveBaseLapTime(race.base_lap_time));
        }
        if self.cars.is_empty() {
            return Err(ConfigError::EmptyField);
        }

        let config = RaceConfig {
            name: race.name,
            lap_count,
            base_lap_time: race.base_lap_time,
            conditions: TrackConditions {
                temperature: race.track_temperature,
                weather: race.weather.unwrap_or_default(),
            },
        };

        let mut cars = Vec::with_capacity(self.cars.len());
        for (index, entry) in self.cars.into_iter().enumerate() {
            let compound: TireCompound = entry.tire.parse()?;
            let driver_name = entry.driver.unwrap_or_else(|| UNKNOWN_DRIVER.to_string());
            let driver = match entry.ability {
                Some(value) => Driver::new(driver_name, value)?,
                None => Driver::with_random_ability(driver_name, rng),
            };
            let grid_position = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let fuel_capacity = entry.fuel_capacity.unwrap_or(Car::DEFAULT_FUEL_CAPACITY);
            cars.push(Car::new(entry.name, driver, compound, fuel_capacity, grid_position)?);
        }

        Ok(RaceSetup { config, cars })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const SAMPLE: &str = r#"{
        "race": { "name": "Test GP", "laps": 5, "base_lap_time": 90.0, "weather": "rain" },
        "cars": [
            { "name": "Red", "driver": "Alice", "ability": 0.9, "tire": "soft" },
            { "name": "Blue", "tire": "Hard", "fuel_capacity": 80.0 }
        ]
    }"#;

    fn setup(text: &str) -> Result<RaceSetup, ConfigError> {
        let mut rng = RaceRng::seed_from_u64(1);
        RaceDocument::from_json(text)?.into_setup(&mut rng)
    }

    #[test]
    fn builds_grid_in_document_order() {
        let setup = setup(SAMPLE).unwrap();
        assert_eq!(setup.config.lap_count, 5);
        assert_eq!(setup.config.conditions.weather, Weather::Wet);
        assert_eq!(setup.cars.len(), 2);

        let red = &setup.cars[0];
        assert_eq!(red.name(), "Red");
        assert_eq!(red.driver().name(), "Alice");
        assert_eq!(red.driver().ability(), 0.9);
        assert_eq!(red.grid_position(), 1);
        assert_eq!(red.fuel_capacity(), Car::DEFAULT_FUEL_CAPACITY);

        let blue = &setup.cars[1];
        assert_eq!(blue.driver().name(), UNKNOWN_DRIVER);
        assert!(blue.driver().ability() > 0.0 && blue.driver().ability() <= 1.0);
        assert_eq!(blue.tire().compound(), TireCompound::Hard);
        assert_eq!(blue.fuel(), 80.0);
    }

    #[test]
    fn rejects_unknown_compound() {
        let text = SAMPLE.replace("\"soft\"", "\"wet\"");
        assert!(matches!(setup(&text), Err(ConfigError::UnknownCompound(_))));
    }

    #[test]
    fn rejects_bad_race_parameters() {
        let text = SAMPLE.replace("\"laps\": 5", "\"laps\": 0");
        assert!(matches!(setup(&text), Err(ConfigError::NoLaps)));

        let text = SAMPLE.replace("\"laps\": 5", "\"laps\": 5000000000");
        assert!(matches!(
            setup(&text),
            Err(ConfigError::LapsOutOfRange(5_000_000_000))
        ));

        let text = SAMPLE.replace("\"base_lap_time\": 90.0", "\"base_lap_time\": -1.0");
        assert!(matches!(setup(&text), Err(ConfigError::NonPositiveBaseLapTime(_))));
    }

    #[test]
    fn rejects_empty_grid_and_bad_cars() {
        let text = r#"{ "race": { "name": "X", "laps": 3, "base_lap_time": 80.0 }, "cars": [] }"#;
        assert!(matches!(setup(text), Err(ConfigError::EmptyField)));

        let text = SAMPLE.replace("\"ability\": 0.9", "\"ability\": 1.5");
        assert!(matches!(
            setup(&text),
            Err(ConfigError::AbilityOutOfRange { driver, .. }) if driver == "Alice"
        ));

        let text = SAMPLE.replace("80.0", "0.0");
        assert!(matches!(setup(&text), Err(ConfigError::NonPositiveFuelCapacity { .. })));
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let text = r#"{ "race": { "name": "X", "base_lap_time": 80.0 }, "cars": [] }"#;
        assert!(matches!(setup(text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RaceDocument::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
