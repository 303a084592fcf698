//! Garage demo application
//!
//! Loads the car and stage lights, then orbits the camera around them while
//! the light circles overhead. Runs on the headless device, so `--frames`
//! decides how long the demo lasts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use garage_renderer::foundation::logging;
use garage_renderer::prelude::*;

/// Car-in-a-garage demo
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file (TOML or RON); defaults are used when it is missing
    #[arg(short, long, default_value = "garage.toml")]
    config: PathBuf,

    /// Number of frames to render before the window closes
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Simulated seconds per frame
    #[arg(short, long, default_value_t = 1.0 / 60.0)]
    timestep: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = DemoConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting {}...", config.window.title);
    let mut window =
        HeadlessWindow::new(config.window.width, config.window.height, args.timestep).with_idle_frames(args.frames);

    let frames = launch(&config, HeadlessDevice::new().without_recording(), &mut window)?;
    log::info!("Rendered {} frames, exiting", frames);
    Ok(())
}
