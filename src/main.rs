use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fuchsia_sim::clock::{Clock, ManualClock, SystemClock};
use fuchsia_sim::config::SimConfig;
use fuchsia_sim::render::raster::RasterCanvas;
use fuchsia_sim::sensor::SensorHandle;
use fuchsia_sim::simulate::{Command, SimulationState};

#[derive(Parser)]
#[command(name = "fuchsia-sim")]
#[command(about = "Sensor-driven fuchsia growth simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a number of frames
    Run(RunArgs),
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

#[derive(Args)]
struct RunArgs {
    /// Path to config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// File of sensor lines; lines starting with ':' are commands
    #[arg(long)]
    feed: Option<PathBuf>,

    /// Consume one feed line every this many frames
    #[arg(long, default_value_t = 1)]
    feed_every: u64,

    /// Also read sensor lines and ':' commands from stdin
    #[arg(long)]
    stdin: bool,

    /// Directory holding fuchsia_branch.png, fuchsia_leaf.png, fuchsia_flower.png
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Write the last frame to this PNG
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write one CSV row per frame
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Use the wall clock and pace frames in real time
    #[arg(long)]
    realtime: bool,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,
}

/// A line from a feed: either a sensor reading or a command.
enum FeedLine {
    Sensor(String),
    Command(Command),
}

fn parse_feed_line(line: &str) -> Option<FeedLine> {
    let line = line.trim();
    if let Some(name) = line.strip_prefix(':') {
        match name.parse::<Command>() {
            Ok(command) => Some(FeedLine::Command(command)),
            Err(err) => {
                warn!(%err, "ignoring feed line");
                None
            }
        }
    } else {
        Some(FeedLine::Sensor(line.to_string()))
    }
}

fn load_feed(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Reads stdin on its own thread. Sensor lines go straight to the shared
/// sensor state; commands are queued for the frame loop.
fn spawn_stdin_reader(sensors: SensorHandle) -> Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_feed_line(&line) {
                Some(FeedLine::Sensor(raw)) => sensors.ingest(&raw, OffsetDateTime::now_utc()),
                Some(FeedLine::Command(command)) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => {}
            }
        }
    });
    rx
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if !(args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }
    let feed_every = args.feed_every.max(1);

    let manual = ManualClock::new(OffsetDateTime::now_utc());
    let clock: Box<dyn Clock> = if args.realtime {
        Box::new(SystemClock)
    } else {
        Box::new(manual.clone())
    };
    let frame_time = Duration::from_secs_f64(1.0 / args.fps);
    let frame_step = time::Duration::seconds_f64(1.0 / args.fps);

    let mut sim = SimulationState::new(config, clock);
    let feed = match &args.feed {
        Some(path) => load_feed(path)?,
        None => Vec::new(),
    };
    let mut feed = feed.into_iter();
    let stdin_commands = args.stdin.then(|| spawn_stdin_reader(sim.sensor_handle()));

    let mut stats = match &args.stats {
        Some(path) => Some(
            csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => None,
    };

    info!(frames = args.frames, fps = args.fps, realtime = args.realtime, "starting run");
    let overlay_every = (args.fps.round() as u64).max(1);
    for _ in 0..args.frames {
        let started = Instant::now();

        if sim.frame_index() % feed_every == 0 {
            if let Some(line) = feed.next() {
                match parse_feed_line(&line) {
                    Some(FeedLine::Sensor(raw)) => sim.ingest(&raw),
                    Some(FeedLine::Command(command)) => sim.apply(command),
                    None => {}
                }
            }
        }
        if let Some(rx) = &stdin_commands {
            while let Ok(command) = rx.try_recv() {
                sim.apply(command);
            }
        }

        let report = sim.tick();
        if let Some(writer) = stats.as_mut() {
            writer.serialize(&report)?;
        }
        if sim.control().show_debug && report.frame % overlay_every == 0 {
            info!("{}", sim.debug_lines().join(" | "));
        }

        if args.realtime {
            let elapsed = started.elapsed();
            if elapsed < frame_time {
                thread::sleep(frame_time - elapsed);
            }
        } else {
            manual.advance(frame_step);
        }
    }
    if let Some(mut writer) = stats {
        writer.flush()?;
    }

    let plant = sim.plant();
    info!(
        segments = plant.segment_count(),
        leaves = plant.leaf_count(),
        flowers = plant.flower_count(),
        age_days = sim.age_units() / 100.0,
        "run finished"
    );

    if let Some(path) = &args.out {
        let viewport = sim.viewport();
        let mut canvas = RasterCanvas::new(
            viewport.width().round() as u32,
            viewport.height().round() as u32,
        );
        if let Some(dir) = &args.sprites {
            let loaded = canvas.load_sprites(dir);
            info!(loaded, dir = %dir.display(), "sprites loaded");
        }
        sim.draw(&mut canvas);
        canvas.save_png(path)?;
        info!(path = %path.display(), "frame written");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&SimConfig::default())?);
            Ok(())
        }
    }
}
