#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Rampart session.

mod placement;

use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rampart_core::{Event, GameConfig, LevelStyleId};
use rampart_simulation::Simulation;
use rampart_world::query;

use crate::placement::TowerPlacement;

/// Tables used when no `--config` file is given.
const DEFAULT_CONFIG: &str = include_str!("../../../assets/default_config.toml");

#[derive(Debug, Parser)]
#[command(name = "rampart", about = "Runs a headless Rampart tower-defence session")]
struct CliArgs {
    /// TOML file with tower, enemy, wave, difficulty and level style tables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Level style to generate.
    #[arg(long, default_value = "meadow")]
    style: String,
    /// Seed for level generation and wave composition.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 6_000)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long = "dt-ms", default_value_t = 50)]
    dt_ms: u64,
    /// Tower to build before the first tick, as `kind@column,row`.
    #[arg(long = "tower", value_name = "KIND@COL,ROW")]
    towers: Vec<TowerPlacement>,
}

/// Running totals printed once the run ends.
#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    leaks: u32,
    earned: u32,
    waves_cleared: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { wave, enemies } => {
                    println!("wave {wave}: {enemies} enemies");
                }
                Event::WaveCleared { wave } => {
                    self.waves_cleared += 1;
                    println!("wave {wave}: cleared");
                }
                Event::EnemyKilled { reward, .. } => {
                    self.kills += 1;
                    self.earned += reward;
                }
                Event::EnemyReachedBase { .. } => self.leaks += 1,
                Event::BaseDestroyed => println!("base destroyed"),
                _ => {}
            }
        }
    }
}

/// Entry point for the Rampart command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let config = load_config(args.config.as_deref())?;
    let mut simulation = Simulation::new(config, args.seed);
    simulation
        .start_session(&LevelStyleId::from(args.style.as_str()))
        .with_context(|| format!("could not start a session on style `{}`", args.style))?;

    if let Some(world) = simulation.world() {
        let level = query::level(world);
        println!(
            "session {} (seed {}): {}x{} grid, {} route(s), difficulty {}, currency {}",
            args.style,
            args.seed,
            level.grid.columns(),
            level.grid.rows(),
            level.routes.len(),
            level.difficulty,
            query::currency(world)
        );
    }

    for placement in &args.towers {
        match simulation.place_tower(placement.kind.clone(), placement.tile) {
            Ok(tower) => println!("placed {placement} as {tower}"),
            Err(reason) => println!("skipped {placement}: {reason}"),
        }
    }

    let dt = Duration::from_millis(args.dt_ms);
    let mut tally = Tally::default();
    for _ in 0..args.ticks {
        tally.record(&simulation.advance(dt));
        if !simulation.is_active() {
            break;
        }
    }

    if let Some(snapshot) = simulation.snapshot() {
        info!("run finished after {} ticks", snapshot.ticks);
        println!(
            "summary: wave {} ({} cleared), kills {}, leaks {}, earned {}, currency {}, base health {}",
            snapshot.wave,
            tally.waves_cleared,
            tally.kills,
            tally.leaks,
            tally.earned,
            snapshot.currency,
            snapshot.base_health
        );
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return GameConfig::from_toml_str(DEFAULT_CONFIG)
            .context("built-in configuration is invalid");
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    GameConfig::from_toml_str(&contents)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}
