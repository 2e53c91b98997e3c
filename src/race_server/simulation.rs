//! Simulation - Race session and driving loop
//!
//! Wraps one race engine in a session with a coarse lifecycle and hands
//! out lap snapshots and results to reporting code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::race_server::config::RaceDocument;
use crate::race_server::error::{ConfigError, RaceError};
use crate::race_server::race::{LapSnapshot, RaceEngine, RaceResult};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerState {
    Idle,
    Ready,
    Racing,
    Results,
}

/// Owns the active race and drives it lap by lap
#[derive(Debug)]
pub struct RaceServer {
    state: ServerState,
    race: Option<RaceEngine>,
}

impl RaceServer {
    pub fn new() -> Self {
        Self {
            state: ServerState::Idle,
            race: None,
        }
    }

    /// Install a ready-built engine
    pub fn init_race(&mut self, race: RaceEngine) {
        self.race = Some(race);
        self.state = ServerState::Ready;
    }

    /// Load a race document from disk and install the resulting engine
    pub fn load_race(
        &mut self,
        path: impl AsRef<Path>,
        seed: Option<u64>,
    ) -> Result<(), ConfigError> {
        let document = RaceDocument::load(path)?;
        let race = RaceEngine::from_document(document, seed)?;
        self.init_race(race);
        Ok(())
    }

    pub fn start_race(&mut self) {
        if self.race.is_some() && self.state == ServerState::Ready {
            self.state = ServerState::Racing;
        }
    }

    /// Advance one lap and return its snapshot.
    ///
    /// Returns `None` before a race is started or after it has finished.
    pub fn tick(&mut self) -> Option<LapSnapshot> {
        if self.state != ServerState::Racing {
            return None;
        }
        let race = self.race.as_mut()?;
        let snapshot = race.advance_lap().cloned();
        if race.is_finished() {
            self.state = ServerState::Results;
        }
        snapshot
    }

    /// Start the race if needed and run every remaining lap
    pub fn run_to_finish(&mut self) -> Result<Vec<RaceResult>, RaceError> {
        if self.race.is_none() {
            return Err(RaceError::NoRace);
        }
        self.start_race();
        while self.tick().is_some() {}
        self.race.as_ref().ok_or(RaceError::NoRace)?.results()
    }

    pub fn race(&self) -> Option<&RaceEngine> {
        self.race.as_ref()
    }

    /// Final results, once the race has finished
    pub fn get_results(&self) -> Option<Vec<RaceResult>> {
        self.race.as_ref().and_then(|r| r.results().ok())
    }

    pub fn get_state(&self) -> ServerState {
        self.state
    }
}

impl Default for RaceServer {
    fn default() -> Self {
        Self::new()
    }
}
