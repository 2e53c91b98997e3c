//! Race Sim - Lap-by-lap motor race simulator
//!
//! Provides the race engine and a session server that drives it from a
//! JSON race document to a final classification.

pub mod race_server;

use std::path::Path;

use race_server::{RaceResult, RaceServer};

/// Errors surfaced by [`run`]
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] race_server::ConfigError),
    #[error(transparent)]
    Race(#[from] race_server::RaceError),
}

/// Load a race document, run it to the flag and return the classification
pub fn run(
    config_path: impl AsRef<Path>,
    seed: Option<u64>,
) -> Result<Vec<RaceResult>, RunError> {
    let mut server = RaceServer::new();
    server.load_race(config_path, seed)?;
    server.start_race();

    while let Some(snapshot) = server.tick() {
        if let Some(leader) = snapshot.entries.first() {
            log::info!(
                "Lap {}: fastest {} ({:.3}s){}",
                snapshot.lap,
                leader.name,
                leader.time,
                if leader.pitted { " [pit]" } else { "" }
            );
        }
    }

    let race = server.race().ok_or(race_server::RaceError::NoRace)?;
    Ok(race.results()?)
}
