//! flipdot-slot — headless driver for the reel simulation
//!
//! Usage:
//!   flipdot-slot --seed 1337 --spin --ticks 200      - one reproducible spin
//!   flipdot-slot --commands cmd.txt --dump snap.json - drive from a command file
//!   flipdot-slot --config machine.yaml --debug       - periodic snapshots

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fd_reels::{
    FileCommandSource, FileSnapshotSink, FrameClock, Grid, PixelFrame, RenderFrame, Renderer,
    SimConfig, SimulationContext, TickLoop,
};

#[derive(Parser)]
#[command(name = "flipdot-slot", about = "Flip-dot slot machine reel simulation")]
struct Args {
    /// Config file (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named preset used when no config file is given (default, demo, turbo)
    #[arg(short, long, default_value = "default")]
    preset: String,

    /// Use the seeded symbol RNG
    #[arg(short, long)]
    seed: Option<u32>,

    /// Command file polled once per tick
    #[arg(long)]
    commands: Option<PathBuf>,

    /// Snapshot output file
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Override the target frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Stop after this many ticks
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Advance by a fixed dt (ms) per tick without sleeping
    #[arg(long)]
    fixed_dt: Option<f64>,

    /// Start with periodic snapshots enabled
    #[arg(short, long)]
    debug: bool,

    /// Start a spin on the first tick
    #[arg(long)]
    spin: bool,
}

/// Logs the settled grid whenever it changes. Draws nothing.
#[derive(Default)]
struct GridLogRenderer {
    last: Option<Grid>,
}

impl Renderer for GridLogRenderer {
    fn render(&mut self, frame: &RenderFrame) -> Option<PixelFrame> {
        if frame.offsets.iter().any(|o| *o != 0.0) || self.last.as_ref() == Some(&frame.grid) {
            return None;
        }
        log::info!("Grid:\n{}", frame.grid.to_text());
        self.last = Some(frame.grid.clone());
        None
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::preset(&args.preset)
            .with_context(|| format!("Unknown preset '{}'", args.preset))?,
    };

    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(fps) = args.fps {
        config.looping.target_fps = fps;
    }
    if args.debug {
        config.debug.enabled = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut clock = FrameClock::new(config.looping.target_fps, config.looping.max_dt_ms);

    let panel = config.panel;
    let ctx = SimulationContext::new(config).context("Invalid simulation config")?;
    log::info!("Panel {}x{} dots", panel.width, panel.height);
    let mut runner = TickLoop::new(ctx).with_renderer(GridLogRenderer::default());
    if let Some(path) = &args.commands {
        log::info!("Polling commands from {}", path.display());
        runner = runner.with_commands(FileCommandSource::new(path));
    }
    if let Some(path) = &args.dump {
        runner = runner.with_snapshots(FileSnapshotSink::new(path));
    }
    if args.spin {
        runner.context_mut().start_spin();
    }

    clock.tick();
    let mut ticks = 0u64;
    while args.ticks.is_none_or(|max| ticks < max) {
        let dt = match args.fixed_dt {
            Some(dt) => dt,
            None => {
                std::thread::sleep(clock.remaining());
                clock.tick()
            }
        };
        let report = runner.step(dt);
        if let Some(done) = &report.completion {
            log::info!(
                "{} finished with {} winning line(s): {:?}",
                done.spin_id,
                done.winning_lines.len(),
                done.winning_lines
            );
        }
        ticks += 1;
    }

    runner.write_snapshot();
    let ctx = runner.context();
    log::info!(
        "Stopped after {} ticks ({:.1} ms simulated, {} spin(s))",
        ctx.tick_count(),
        ctx.time_ms(),
        ctx.chain().spin_count()
    );
    Ok(())
}
