//! Race - Race parameters, lap loop and classification
//!
//! The engine advances the whole field one lap at a time, ranks the lap,
//! records a snapshot and detects the finish.

use std::collections::{BTreeMap, HashSet};

use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::race_server::car::{Car, CarState};
use crate::race_server::conditions::TrackConditions;
use crate::race_server::config::RaceDocument;
use crate::race_server::error::{ConfigError, RaceError};
use crate::race_server::pit_stop::{PitDecision, PitStopPolicy, WearThresholdPolicy};
use crate::race_server::RaceRng;

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Event name, used for reporting only
    pub name: String,
    /// Number of laps to run
    pub lap_count: u32,
    /// Reference lap time in seconds before tire, fuel and driver effects
    pub base_lap_time: f64,
    pub conditions: TrackConditions,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            name: "Grand Prix".to_string(),
            lap_count: 50,
            base_lap_time: 90.0,
            conditions: TrackConditions::default(),
        }
    }
}

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// One car's time on one lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapEntry {
    pub name: String,
    /// Lap time, or the pit lane time if the car pitted
    pub time: f64,
    pub pitted: bool,
}

/// Finishing order of a single lap, fastest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSnapshot {
    /// 1-based lap number
    pub lap: u32,
    pub entries: Vec<LapEntry>,
}

/// Classification line for one car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub position: u32,
    pub name: String,
    pub driver: String,
    pub total_time: f64,
    pub gap_to_leader: f64,
    pub pit_stops: u32,
}

/// Lap-by-lap race engine
#[derive(Debug)]
pub struct RaceEngine {
    config: RaceConfig,
    /// Cars in grid order; never reordered
    cars: Vec<Car>,
    current_lap: u32,
    history: Vec<LapSnapshot>,
    policy: Box<dyn PitStopPolicy>,
    rng: RaceRng,
}

impl RaceEngine {
    /// Create an engine, rejecting invalid parameters before any lap runs
    pub fn new(
        config: RaceConfig,
        cars: Vec<Car>,
        policy: Box<dyn PitStopPolicy>,
        rng: RaceRng,
    ) -> Result<Self, ConfigError> {
        if config.lap_count == 0 {
            return Err(ConfigError::NoLaps);
        }
        if !(config.base_lap_time > 0.0 && config.base_lap_time.is_finite()) {
            return Err(ConfigError::NonPositiveBaseLapTime(config.base_lap_time));
        }
        if cars.is_empty() {
            return Err(ConfigError::EmptyField);
        }
        let mut seen = HashSet::new();
        for car in &cars {
            if !seen.insert(car.name()) {
                return Err(ConfigError::DuplicateCar(car.name().to_string()));
            }
        }

        log::info!(
            "Race '{}' set up: {} cars, {} laps, base lap {:.3}s",
            config.name,
            cars.len(),
            config.lap_count,
            config.base_lap_time
        );

        Ok(Self {
            config,
            cars,
            current_lap: 0,
            history: Vec::new(),
            policy,
            rng,
        })
    }

    /// Build an engine from a race document with the default pit policy.
    ///
    /// `seed` overrides the document's own seed; with neither, seed 0 is used.
    pub fn from_document(document: RaceDocument, seed: Option<u64>) -> Result<Self, ConfigError> {
        let seed = seed.or(document.race.seed).unwrap_or_default();
        let mut rng = RaceRng::seed_from_u64(seed);
        let setup = document.into_setup(&mut rng)?;
        Self::new(
            setup.config,
            setup.cars,
            Box::new(WearThresholdPolicy::default()),
            rng,
        )
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    pub fn lap_count(&self) -> u32 {
        self.config.lap_count
    }

    pub fn status(&self) -> RaceStatus {
        match self.current_lap {
            0 => RaceStatus::NotStarted,
            lap if lap >= self.config.lap_count => RaceStatus::Finished,
            _ => RaceStatus::InProgress,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status() == RaceStatus::Finished
    }

    /// Cars in grid order
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Get car by name
    pub fn get_car(&self, name: &str) -> Option<&Car> {
        self.cars.iter().find(|c| c.name() == name)
    }

    /// Car with the lowest total time so far
    pub fn get_leader(&self) -> Option<&Car> {
        self.cars
            .iter()
            .min_by(|a, b| {
                a.total_time()
                    .total_cmp(&b.total_time())
                    .then(a.grid_position().cmp(&b.grid_position()))
            })
    }

    pub fn car_states(&self) -> Vec<CarState> {
        self.cars.iter().map(CarState::from).collect()
    }

    /// Completed laps, one snapshot per lap
    pub fn history(&self) -> &[LapSnapshot] {
        &self.history
    }

    /// Run one lap for the whole field.
    ///
    /// Each car either pits or races. The lap is ranked on the times just
    /// produced, with pitted cars ranked by their pit lane time. Returns
    /// `None` once the race is finished.
    pub fn advance_lap(&mut self) -> Option<&LapSnapshot> {
        if self.is_finished() {
            return None;
        }
        let lap = self.current_lap + 1;

        let mut lap_times = Vec::with_capacity(self.cars.len());
        for (index, car) in self.cars.iter_mut().enumerate() {
            let (time, pitted) = match self.policy.decide(car, &mut self.rng) {
                PitDecision::Pit(compound) => {
                    let worn = car.tire().compound();
                    let wear = car.tire().wear();
                    let penalty = car.pit(compound);
                    log::info!(
                        "Lap {lap}: {} pits, {worn} ({wear:.2} wear) -> {compound}",
                        car.name()
                    );
                    (penalty, true)
                }
                PitDecision::Stay => {
                    let time = car.compute_lap_time(
                        self.config.base_lap_time,
                        &self.config.conditions,
                        &mut self.rng,
                    );
                    (time, false)
                }
            };
            lap_times.push((index, time, pitted));
        }

        // Equal times fall back to grid order
        let cars = &self.cars;
        lap_times.sort_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then(cars[a.0].grid_position().cmp(&cars[b.0].grid_position()))
        });

        let mut entries = Vec::with_capacity(lap_times.len());
        for (rank, (index, time, pitted)) in lap_times.into_iter().enumerate() {
            let car = &mut self.cars[index];
            car.set_position(u32::try_from(rank + 1).unwrap_or(u32::MAX));
            entries.push(LapEntry {
                name: car.name().to_string(),
                time,
                pitted,
            });
        }
        debug_assert!(positions_are_dense(&self.cars));

        if let Some(fastest) = entries.first() {
            log::debug!(
                "Lap {lap}/{}: fastest {} {:.3}s",
                self.config.lap_count,
                fastest.name,
                fastest.time
            );
        }

        self.history.push(LapSnapshot { lap, entries });
        self.current_lap = lap;

        if self.is_finished() {
            if let Some(leader) = self.get_leader() {
                log::info!(
                    "Race '{}' finished after {lap} laps, winner {} in {:.3}s",
                    self.config.name,
                    leader.name(),
                    leader.total_time()
                );
            }
        }

        self.history.last()
    }

    /// Current order by total time, ties broken by grid position
    pub fn standings(&self) -> Vec<RaceResult> {
        let mut order: Vec<&Car> = self.cars.iter().collect();
        order.sort_by(|a, b| {
            a.total_time()
                .total_cmp(&b.total_time())
                .then(a.grid_position().cmp(&b.grid_position()))
        });

        let leader_time = order.first().map(|c| c.total_time()).unwrap_or_default();
        order
            .into_iter()
            .enumerate()
            .map(|(i, car)| RaceResult {
                position: u32::try_from(i + 1).unwrap_or(u32::MAX),
                name: car.name().to_string(),
                driver: car.driver().name().to_string(),
                total_time: car.total_time(),
                gap_to_leader: car.total_time() - leader_time,
                pit_stops: car.pit_stop_count(),
            })
            .collect()
    }

    /// Final results, available once the race is finished
    pub fn results(&self) -> Result<Vec<RaceResult>, RaceError> {
        if !self.is_finished() {
            return Err(RaceError::NotFinished {
                current_lap: self.current_lap,
                lap_count: self.config.lap_count,
            });
        }
        Ok(self.standings())
    }

    /// Car names ordered by total race time
    pub fn final_classification(&self) -> Result<Vec<String>, RaceError> {
        Ok(self.results()?.into_iter().map(|r| r.name).collect())
    }

    /// Per-car lap time series built from the history, keyed by car name
    pub fn lap_time_series(&self) -> BTreeMap<String, Vec<f64>> {
        let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for snapshot in &self.history {
            for entry in &snapshot.entries {
                series.entry(entry.name.clone()).or_default().push(entry.time);
            }
        }
        series
    }
}

fn positions_are_dense(cars: &[Car]) -> bool {
    let mut positions: Vec<u32> = cars.iter().map(Car::position).collect();
    positions.sort_unstable();
    positions.iter().zip(1..).all(|(&p, expected)| p == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_server::driver::Driver;
    use crate::race_server::pit_stop::NeverPit;
    use crate::race_server::tire::TireCompound;

    fn grid(specs: &[(&str, TireCompound, f64)]) -> Vec<Car> {
        specs
            .iter()
            .enumerate()
            .map(|(i, (name, compound, ability))| {
                let driver = Driver::new(format!("{name} driver"), *ability).unwrap();
                let grid_position = i as u32 + 1;
                Car::new(*name, driver, *compound, Car::DEFAULT_FUEL_CAPACITY, grid_position)
                    .unwrap()
            })
            .collect()
    }

    fn seeded(config: RaceConfig, cars: Vec<Car>) -> Result<RaceEngine, ConfigError> {
        RaceEngine::new(config, cars, Box::new(NeverPit), RaceRng::seed_from_u64(1))
    }

    fn engine(laps: u32, cars: Vec<Car>) -> RaceEngine {
        let config = RaceConfig {
            lap_count: laps,
            ..RaceConfig::default()
        };
        RaceEngine::new(config, cars, Box::new(NeverPit), RaceRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn rejects_invalid_setup() {
        let cars = grid(&[("A", TireCompound::Soft, 0.5)]);
        let config = RaceConfig {
            lap_count: 0,
            ..RaceConfig::default()
        };
        assert!(matches!(seeded(config, cars), Err(ConfigError::NoLaps)));

        let err = seeded(RaceConfig::default(), Vec::new());
        assert!(matches!(err, Err(ConfigError::EmptyField)));

        let dupes = grid(&[("A", TireCompound::Soft, 0.5), ("A", TireCompound::Hard, 0.5)]);
        let err = seeded(RaceConfig::default(), dupes);
        assert!(matches!(err, Err(ConfigError::DuplicateCar(name)) if name == "A"));
    }

    #[test]
    fn status_moves_through_lifecycle() {
        let mut race = engine(2, grid(&[("A", TireCompound::Soft, 0.5)]));
        assert_eq!(race.status(), RaceStatus::NotStarted);
        assert!(race.advance_lap().is_some());
        assert_eq!(race.status(), RaceStatus::InProgress);
        assert!(race.advance_lap().is_some());
        assert_eq!(race.status(), RaceStatus::Finished);
        assert!(race.advance_lap().is_none());
        assert_eq!(race.current_lap(), 2);
        assert_eq!(race.history().len(), 2);
    }

    #[test]
    fn positions_are_dense_after_every_lap() {
        let mut race = engine(
            10,
            grid(&[
                ("A", TireCompound::Soft, 0.3),
                ("B", TireCompound::Medium, 0.6),
                ("C", TireCompound::Hard, 0.9),
            ]),
        );
        while race.advance_lap().is_some() {
            assert!(positions_are_dense(race.cars()));
            let snapshot = race.history().last().unwrap();
            assert!(snapshot.entries.windows(2).all(|w| w[0].time <= w[1].time));
            for (rank, entry) in snapshot.entries.iter().enumerate() {
                assert_eq!(race.get_car(&entry.name).unwrap().position(), rank as u32 + 1);
            }
        }
    }

    #[test]
    fn classification_requires_finish() {
        let mut race = engine(3, grid(&[("A", TireCompound::Soft, 0.5)]));
        race.advance_lap();
        assert_eq!(
            race.final_classification(),
            Err(RaceError::NotFinished {
                current_lap: 1,
                lap_count: 3
            })
        );
    }

    #[test]
    fn ties_keep_grid_order() {
        let mut race = engine(
            4,
            grid(&[("B", TireCompound::Medium, 0.5), ("A", TireCompound::Medium, 0.5)]),
        );
        race.advance_lap();
        let first = &race.history()[0];
        // identical cars on fresh tires post identical first laps
        assert_eq!(first.entries[0].time, first.entries[1].time);
        assert_eq!(first.entries[0].name, "B");
    }

    #[test]
    fn tied_totals_follow_grid_position_not_list_order() {
        let driver = |name: &str| Driver::new(name, 0.5).unwrap();
        let fuel = Car::DEFAULT_FUEL_CAPACITY;
        let cars = vec![
            Car::new("A", driver("a"), TireCompound::Medium, fuel, 2).unwrap(),
            Car::new("B", driver("b"), TireCompound::Medium, fuel, 1).unwrap(),
        ];
        let mut race = engine(1, cars);
        race.advance_lap();

        assert_eq!(
            race.get_car("A").unwrap().total_time(),
            race.get_car("B").unwrap().total_time()
        );
        assert_eq!(race.history()[0].entries[0].name, "B");
        assert_eq!(race.get_car("B").unwrap().position(), 1);
        assert_eq!(race.final_classification().unwrap(), vec!["B", "A"]);
        assert_eq!(race.get_leader().unwrap().name(), "B");
    }

    #[test]
    fn standings_report_gaps() {
        let mut race = engine(
            5,
            grid(&[("Slow", TireCompound::Hard, 0.2), ("Fast", TireCompound::Soft, 1.0)]),
        );
        while race.advance_lap().is_some() {}
        let results = race.results().unwrap();
        assert_eq!(results[0].name, "Fast");
        assert_eq!(results[0].gap_to_leader, 0.0);
        assert!(results[1].gap_to_leader > 0.0);
        assert_eq!(race.get_leader().unwrap().name(), "Fast");
    }

    #[test]
    fn lap_series_has_one_point_per_lap() {
        let mut race = engine(
            6,
            grid(&[("A", TireCompound::Soft, 0.5), ("B", TireCompound::Hard, 0.5)]),
        );
        while race.advance_lap().is_some() {}
        let series = race.lap_time_series();
        assert_eq!(series.len(), 2);
        assert!(series.values().all(|times| times.len() == 6));
    }
}
