//! # picobot-rs
//!
//! Behaviour engine for a small motion-reactive desktop creature: a round
//! 240×240 panel showing two eyes, a spinning heartbeat ring, a battery
//! gauge and live charts of a six-axis IMU.
//!
//! Every frame the engine fuses one motion sample into:
//!
//! | State | Driven by |
//! |---|---|
//! | Sleeping / Awake | activation thresholds and a boredom counter |
//! | Heart rate | tenses on activity, relaxes toward resting |
//! | Eye heights | target-seeking animation and a blink script |
//! | Sensor charts | bounded history, bars and graph alternating on a timer |
//!
//! Hardware stays behind the traits in [`hal`]; the crate ships software
//! back-ends so the whole loop runs on a desktop.
//!
//! ## Quick start
//!
//! ```no_run
//! use picobot_rs::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::default();
//!     let fps = config.display.fps;
//!     let mut driver = FrameDriver::new(
//!         Engine::new(config)?,
//!         SimulatedSensor::new(fps),
//!         DrawList::new(240, 240),
//!         SimulatedBattery::full(),
//!         LogBacklight::new(),
//!     );
//!     driver.sensor_mut().jolt(10);
//!     driver.run_for(200).await?;
//!     println!("{:?}", driver.engine().snapshot());
//!     Ok(())
//! }
//! ```
//!
//! ## Using as a library dependency
//!
//! ```toml
//! [dependencies]
//! # Full build (includes the ratatui viewer):
//! picobot-rs = "0.1"
//!
//! # Library only, skips ratatui / crossterm compilation:
//! picobot-rs = { version = "0.1", default-features = false }
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`prelude`] | One-line glob import of the most commonly needed types |
//! | [`engine`] | [`engine::Engine`]: all creature state and the per-frame update |
//! | [`driver`] | [`driver::FrameDriver`]: sample → update → render → present, paced |
//! | [`alertness`] | Sleeping/Awake state machine and boredom |
//! | [`heart`] | Heart rate model and beat ring |
//! | [`eyes`] | Eye geometry, animation and blink script |
//! | [`visualizer`] | Sensor normalisation, graph buffer, render-mode timer |
//! | [`extents`] | Per-axis running min/max |
//! | [`snooze`] | Sleeping "Z" glyph |
//! | [`battery`] | ADC conversion, level dots, simulated cell |
//! | [`sensor`] | Simulated and replayed motion sensors |
//! | [`hal`] | Collaborator traits, recording display, logging backlight |
//! | [`cli`] | `--config` flag shared by the binaries |
//! | [`config`] | [`config::EngineConfig`], TOML loading and validation |
//! | [`error`] | Error enums and the per-error policy |
//! | [`types`] | Samples, states, colours |

pub mod alertness;
pub mod battery;
pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod extents;
pub mod eyes;
pub mod hal;
pub mod heart;
pub mod sensor;
pub mod snooze;
pub mod types;
pub mod visualizer;

#[cfg(test)]
mod integration_tests;

// ── Prelude ───────────────────────────────────────────────────────────────────

/// Convenience re-exports for downstream crates.
///
/// A single glob import covers building an engine, wiring it to software
/// collaborators and running the loop.
pub mod prelude {
    // ── Engine and loop ───────────────────────────────────────────────────────
    pub use crate::driver::{FrameDriver, FrameReport};
    pub use crate::engine::{Engine, EngineSnapshot};

    // ── Configuration and errors ──────────────────────────────────────────────
    pub use crate::config::{EngineConfig, RelaxMode};
    pub use crate::error::{ConfigError, DisplayError, EngineError, SensorError};

    // ── Collaborators ─────────────────────────────────────────────────────────
    pub use crate::battery::SimulatedBattery;
    pub use crate::hal::{
        Backlight, BatteryMeter, Display, DrawCommand, DrawList, LogBacklight, MotionSensor,
    };
    pub use crate::sensor::{ReplaySensor, SimulatedSensor};

    // ── Data types ────────────────────────────────────────────────────────────
    pub use crate::types::{AlertnessState, Color, MotionSample, RenderMode};
}
