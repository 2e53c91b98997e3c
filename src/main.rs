use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "race-sim", version)]
#[command(about = "Simulate a multi-lap race from a JSON race document")]
struct Args {
    /// Race document to load
    #[arg(default_value = "config/race_config.json")]
    config: PathBuf,

    /// Seed for the race RNG (overrides the document's seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the classification as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let results = race_sim::run(&args.config, args.seed)
        .with_context(|| format!("race from {} failed", args.config.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("Final classification:");
    for result in &results {
        println!(
            "P{:<3} {:<16} {:<16} {:>10.3}s  +{:.3}s  pits {}",
            result.position,
            result.name,
            result.driver,
            result.total_time,
            result.gap_to_leader,
            result.pit_stops
        );
    }
    Ok(())
}
