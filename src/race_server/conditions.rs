//! Conditions - Track temperature and weather
//!
//! Weather shifts every lap time by a constant; temperature scales tire wear.

use serde::{Deserialize, Serialize};

/// Seconds added to every lap on a wet track
pub const WET_TIME_LOSS: f64 = 4.0;
/// Temperature at which tires wear at their catalog rate
pub const REFERENCE_TEMPERATURE: f64 = 25.0;
/// Relative wear change per degree above or below the reference
pub const WEAR_PER_DEGREE: f64 = 0.02;

const MIN_THERMAL_FACTOR: f64 = 0.5;
const MAX_THERMAL_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    #[serde(alias = "sunny", alias = "clear")]
    Dry,
    #[serde(alias = "rain", alias = "rainy")]
    Wet,
}

/// Conditions shared by every car for the whole race
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackConditions {
    /// Track surface temperature in °C, if known
    pub temperature: Option<f64>,
    pub weather: Weather,
}

impl TrackConditions {
    /// Lap time offset applied to every car
    pub fn lap_time_offset(&self) -> f64 {
        match self.weather {
            Weather::Dry => 0.0,
            Weather::Wet => WET_TIME_LOSS,
        }
    }

    /// Multiplier on per-lap tire wear
    pub fn thermal_factor(&self) -> f64 {
        match self.temperature {
            Some(t) if t.is_finite() => (1.0 + WEAR_PER_DEGREE * (t - REFERENCE_TEMPERATURE))
                .clamp(MIN_THERMAL_FACTOR, MAX_THERMAL_FACTOR),
            _ => 1.0,
        }
    }
}
