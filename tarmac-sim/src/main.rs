use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tarmac_core::packets::Packet;
use tarmac_core::player::choices::{CarKind, Difficulty, Driver, Entrant};
use tarmac_core::SimSettings;
use tarmac_sim::track::MAX_START_SLOTS;
use tarmac_sim::{GameLoop, IntentBatch, Simulation, Track};

#[derive(Debug, Parser)]
#[clap(
    name = "tarmac-sim",
    version,
    about = "Runs a headless AI-only race on an authored track"
)]
struct Args {
    /// Path to the track json
    #[clap(short, long)]
    track: PathBuf,

    /// Optional yaml settings file; TARMAC_* environment variables apply on top
    #[clap(short, long)]
    config: Option<String>,

    /// Override the configured lap count
    #[clap(short, long)]
    laps: Option<u8>,

    /// How many cars to put on the grid (at most one per start slot)
    #[clap(short = 'n', long, default_value = "4")]
    cars: usize,

    /// Sleep between frames and feed measured wall time instead of 1/60s
    #[clap(long)]
    realtime: bool,

    /// Write a length-prefixed snapshot per frame to this file
    #[clap(long)]
    snapshots: Option<PathBuf>,

    /// Print the effective settings as yaml and exit
    #[clap(long)]
    print_config: bool,
}

// mix of cars and skill levels so a default run has something to watch
fn grid(count: usize) -> Vec<Entrant> {
    let difficulties = [Difficulty::Hard, Difficulty::Medium, Difficulty::Easy];
    (0..count)
        .map(|slot| {
            Entrant::ai(
                CarKind::ALL[slot % CarKind::ALL.len()],
                difficulties[slot % difficulties.len()],
            )
        })
        .collect()
}

fn driver_label(driver: Driver) -> &'static str {
    match driver {
        Driver::Ai(difficulty) => difficulty.as_str(),
        Driver::Human => "Human",
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut settings =
        SimSettings::load(args.config.as_deref()).context("could not load settings")?;
    if let Some(laps) = args.laps {
        settings.lap_count = laps;
    }
    if args.print_config {
        print!("{}", settings.to_yaml()?);
        return Ok(());
    }
    if args.cars == 0 || args.cars > MAX_START_SLOTS {
        bail!("--cars must be between 1 and {}", MAX_START_SLOTS);
    }

    let track_path = args.track.to_string_lossy().to_string();
    let track = Track::load(&track_path)
        .with_context(|| format!("could not load track from {}", track_path))?;
    let track = Arc::new(track);

    let simulation = Simulation::new(track, &grid(args.cars), &settings)?;
    let mut game = GameLoop::new(simulation, &settings);

    let mut snapshots = match &args.snapshots {
        Some(path) => Some(BufWriter::new(File::create(path).with_context(|| {
            format!("could not create snapshot file {}", path.display())
        })?)),
        None => None,
    };

    // nobody is holding a controller
    let intents = IntentBatch::new();
    let frame = Duration::from_secs_f64(settings.step_seconds());
    let mut last_frame = Instant::now();

    while !game.simulation().is_finished() {
        let wall_delta = if args.realtime {
            let now = Instant::now();
            let delta = now.duration_since(last_frame).as_secs_f64();
            last_frame = now;
            delta
        } else {
            settings.step_seconds()
        };

        game.advance(wall_delta, &intents);

        if let Some(writer) = snapshots.as_mut() {
            game.snapshot()
                .write_packet(&mut *writer)
                .context("could not write snapshot")?;
        }

        if args.realtime {
            // wait out whatever is left of this frame
            if let Some(remaining) = frame.checked_sub(last_frame.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    if let Some(mut writer) = snapshots {
        writer.flush()?;
    }

    let simulation = game.simulation();
    let state = simulation.race_state();
    info!("race over after {:.2}s of racing", state.elapsed);
    for (index, &id) in state.standings.iter().enumerate() {
        let car = &simulation.cars()[id];
        let result = match state.finish_times[id] {
            Some(time) => format!("{:.3}s", time),
            None => "DNF".to_string(),
        };
        let best_lap = car
            .lap_info
            .best_lap()
            .map_or_else(|| "-".to_string(), |time| format!("{:.3}s", time));
        info!(
            "P{} car {} ({}): {} laps, {}, best lap {}",
            index + 1,
            id,
            simulation.driver(id).map_or("?", driver_label),
            car.lap_info.lap,
            result,
            best_lap
        );
    }

    let records = simulation.record_candidates();
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
