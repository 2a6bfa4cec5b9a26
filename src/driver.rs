//! The frame loop.
//!
//! A [`FrameDriver`] owns the engine and its four collaborators. One
//! [`FrameDriver::tick`] is one whole frame:
//!
//! ```text
//! read sample ─▶ Engine::update ─▶ backlight ─▶ Engine::render ─▶ present
//!      │ transient error
//!      └──────────── skip update, still render + present ──────────▶
//! ```
//!
//! [`FrameDriver::run`] and [`FrameDriver::run_for`] add best-effort pacing:
//! after each tick they sleep whatever is left of the frame period. A frame
//! that overruns is logged and the next one starts immediately; lost time is
//! never made up.

use std::time::Duration;

use log::{debug, error, warn};
use tokio::time::{sleep, Instant};

use crate::engine::Engine;
use crate::error::{EngineError, SensorError};
use crate::hal::{Backlight, BatteryMeter, Display, MotionSensor};
use crate::types::AlertnessState;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Engine frames completed so far. Unchanged by a skipped frame.
    pub frame: u64,
    pub state: AlertnessState,
    /// The transient read failure that caused this frame's update to be
    /// skipped.
    pub skipped: Option<SensorError>,
}

/// Time left to sleep after a tick that took `elapsed`, or `None` when the
/// frame overran its budget.
pub fn pacing_delay(period: Duration, elapsed: Duration) -> Option<Duration> {
    period.checked_sub(elapsed).filter(|rest| !rest.is_zero())
}

pub struct FrameDriver<S, D, B, L> {
    engine: Engine,
    sensor: S,
    display: D,
    battery: B,
    backlight: L,
    period: Duration,
}

impl<S, D, B, L> FrameDriver<S, D, B, L>
where
    S: MotionSensor,
    D: Display,
    B: BatteryMeter,
    L: Backlight,
{
    pub fn new(engine: Engine, sensor: S, display: D, battery: B, backlight: L) -> Self {
        let panel = &engine.config().display;
        if display.size() != (panel.width, panel.height) {
            warn!(
                "display is {:?} but the engine lays out a {}x{} panel",
                display.size(),
                panel.width,
                panel.height
            );
        }
        let period = Duration::from_secs(1) / panel.fps;
        Self {
            engine,
            sensor,
            display,
            battery,
            backlight,
            period,
        }
    }

    /// Target duration of one frame.
    pub fn frame_period(&self) -> Duration {
        self.period
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn backlight(&self) -> &L {
        &self.backlight
    }

    /// Run one frame to completion.
    ///
    /// Transient sensor failures are ridden out: the frame is drawn from the
    /// previous state. An unresponsive sensor or a failed present ends the
    /// loop.
    pub fn tick(&mut self) -> Result<FrameReport, EngineError> {
        let skipped = match self.sensor.read_sample() {
            Ok(sample) => {
                self.engine.update(&sample);
                None
            }
            Err(e) if e.is_transient() => {
                warn!("frame {}: {e}; keeping previous state", self.engine.frame());
                Some(e)
            }
            Err(e) => {
                error!("{e}");
                return Err(EngineError::Sensor(e));
            }
        };

        if let Some(duty) = self.engine.take_brightness_request() {
            self.backlight.set_brightness(duty);
        }

        self.engine.render(&mut self.display, &mut self.battery);
        if let Err(e) = self.display.present() {
            error!("{e}");
            return Err(e.into());
        }

        Ok(FrameReport {
            frame: self.engine.frame(),
            state: self.engine.state(),
            skipped,
        })
    }

    /// Tick, then sleep out the rest of the frame period.
    async fn paced_tick(&mut self) -> Result<FrameReport, EngineError> {
        let started = Instant::now();
        let report = self.tick()?;
        let elapsed = started.elapsed();
        match pacing_delay(self.period, elapsed) {
            Some(rest) => sleep(rest).await,
            None => debug!(
                "frame {} overran: {elapsed:?} > {:?}",
                report.frame, self.period
            ),
        }
        Ok(report)
    }

    /// Run until a fatal error.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        loop {
            self.paced_tick().await?;
        }
    }

    /// Run exactly `frames` paced ticks.
    pub async fn run_for(&mut self, frames: u64) -> Result<(), EngineError> {
        for _ in 0..frames {
            self.paced_tick().await?;
        }
        Ok(())
    }
}
