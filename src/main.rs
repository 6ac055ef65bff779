//! Neon Run headless runner
//!
//! Plays one seeded run with the autopilot at a fixed 60 Hz frame cadence,
//! then banks the result into the progression record on disk.
//!
//! Environment:
//! - `NEON_RUN_SEED` run seed (default: current time)
//! - `NEON_RUN_DIFFICULTY` easy | normal | hard
//! - `NEON_RUN_CONFIG` path to a JSON `SimConfig` (overrides difficulty)
//! - `NEON_RUN_RECORD` progression record path (default `neon-run-record.json`)
//! - `RUST_LOG` log filter

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use neon_run::persistence::{JsonFileStore, ProgressionStore};
use neon_run::sim::{Autopilot, Simulation, TickOutcome};
use neon_run::{Difficulty, SimConfig};

const FRAME: f64 = 1.0 / 60.0;
/// Hard stop for a run that never ends (ten simulated minutes)
const MAX_FRAMES: u64 = 60 * 60 * 10;

struct RunnerConfig {
    seed: u64,
    sim: SimConfig,
    record_path: PathBuf,
}

impl RunnerConfig {
    fn from_env() -> Result<Self> {
        let seed = match std::env::var("NEON_RUN_SEED") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("NEON_RUN_SEED is not a number: {raw}"))?,
            Err(_) => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        let sim = if let Ok(path) = std::env::var("NEON_RUN_CONFIG") {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            SimConfig::from_json(&json).with_context(|| format!("config {path}"))?
        } else {
            let difficulty = match std::env::var("NEON_RUN_DIFFICULTY") {
                Ok(raw) => Difficulty::from_str(&raw).unwrap_or_else(|| {
                    log::warn!("Unknown difficulty '{}', using Normal", raw);
                    Difficulty::Normal
                }),
                Err(_) => Difficulty::Normal,
            };
            SimConfig::from_difficulty(difficulty)
        };

        let record_path = std::env::var_os("NEON_RUN_RECORD")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("neon-run-record.json"));

        Ok(Self {
            seed,
            sim,
            record_path,
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = RunnerConfig::from_env()?;
    log::info!(
        "Neon Run (headless) starting: seed {}, difficulty {}",
        config.seed,
        config.sim.difficulty.as_str()
    );

    let mut store = JsonFileStore::new(&config.record_path);
    let record = store.load();

    let mut sim = Simulation::new(config.sim, config.seed)?;
    let mut pilot = Autopilot::default();
    let mut now = 0.0;
    sim.start_run(record, now)?;

    for _ in 0..MAX_FRAMES {
        now += FRAME;
        let input = pilot.input(&sim);
        match sim.advance(now, &input) {
            TickOutcome::LevelUp { offer } => {
                let Some(&choice) = offer.first() else {
                    anyhow::bail!("level-up offered no abilities");
                };
                sim.choose_ability(choice, now)?;
            }
            TickOutcome::Continue | TickOutcome::Skipped => {}
            TickOutcome::Extracted | TickOutcome::Died { .. } => break,
        }
    }

    match sim.summary() {
        Some(summary) => log::info!(
            "Result: {:?} | level {} | currency {} | {} hostiles | {:.1}s",
            summary.outcome,
            summary.level,
            summary.currency,
            summary.hostiles_defeated,
            summary.elapsed
        ),
        None => log::warn!("Run still active after {} frames, abandoning", MAX_FRAMES),
    }

    if let Some(updated) = sim.take_record_update() {
        store.save(&updated)?;
        log::info!(
            "Bank: {} currency, loadout {:?}",
            updated.currency,
            updated.equipped
        );
    }
    Ok(())
}
