//! Headless run of the creature against the simulated IMU and battery.
//!
//! Usage:
//!   cargo run                                   # run forever, shake every 10 s
//!   cargo run -- --frames 600                   # stop after 600 frames
//!   cargo run -- --config picobot.toml          # override tunables
//!   cargo run -- --jolt-every 0                 # never shake; stays asleep

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use picobot_rs::cli::ConfigArgs;
use picobot_rs::prelude::*;

/// Frames each simulated shake lasts.
const JOLT_FRAMES: u32 = 5;

#[derive(Parser, Debug)]
#[command(name = "picobot", version, about = "Run the creature headless against a simulated IMU")]
struct Cli {
    /// Stop after this many frames (default: run forever)
    #[arg(long)]
    frames: Option<u64>,

    #[command(flatten)]
    engine: ConfigArgs,

    /// Shake the board every N frames; 0 never shakes
    #[arg(long, default_value_t = 200)]
    jolt_every: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ── Logging ───────────────────────────────────────────────────────────────
    // Set RUST_LOG=debug for per-frame detail, e.g.:
    //   RUST_LOG=picobot_rs=debug cargo run
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = args.engine.load().context("loading configuration")?;
    let fps = config.display.fps;
    let (width, height) = (config.display.width, config.display.height);

    let mut driver = FrameDriver::new(
        Engine::new(config)?,
        SimulatedSensor::new(fps),
        DrawList::new(width, height),
        SimulatedBattery::full(),
        LogBacklight::new(),
    );
    info!(
        "running at {fps} fps ({:?} per frame), shaking every {} frames",
        driver.frame_period(),
        args.jolt_every
    );

    // ── Frame loop ────────────────────────────────────────────────────────────
    let mut frame = 0u64;
    while args.frames.map_or(true, |n| frame < n) {
        if args.jolt_every > 0 && frame > 0 && frame % args.jolt_every == 0 {
            info!("shake!");
            driver.sensor_mut().jolt(JOLT_FRAMES);
        }
        driver.run_for(1).await.context("frame loop halted")?;
        frame += 1;

        if frame % fps as u64 == 0 {
            let s = driver.engine().snapshot();
            info!(
                "t={:>4}s  {:?}  boredom={:>3}  heart={:>5.1} bpm  eyes={}/{}  {:?}",
                frame / fps as u64,
                s.state,
                s.boredom,
                s.heart_rate,
                s.left_eye,
                s.right_eye,
                s.mode
            );
        }
    }

    info!("done after {frame} frames");
    Ok(())
}
