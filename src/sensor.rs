//! Software motion sensors.
//!
//! [`SimulatedSensor`] stands in for the IMU on a desktop: a creature lying
//! still on a table, plus on-demand shakes. [`ReplaySensor`] plays back a
//! fixed script of readings and failures, which is what the frame-loop tests
//! drive.

use std::collections::VecDeque;
use std::f64::consts::PI;

use log::debug;

use crate::error::SensorError;
use crate::hal::MotionSensor;
use crate::types::MotionSample;

/// A board lying flat and still: 1 g on the first accelerometer axis.
pub const AT_REST: MotionSample = MotionSample::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

// ── Simulator ─────────────────────────────────────────────────────────────────

/// One synthetic reading at time `t` (seconds).
///
/// | Axis | Signal | Peak |
/// |---|---|---|
/// | ax | 1 g gravity + 0.3 Hz sway | ±0.04 g |
/// | ay, az | 0.5 / 0.1 Hz sway | ±0.04 g |
/// | gx, gy, gz | 0.2–0.3 Hz drift + noise | ±5 °/s |
///
/// Noise is a deterministic hash of (`t`, axis) so runs are reproducible.
/// Every axis stays far inside the activation thresholds.
fn sim_axes(t: f64) -> [f32; 6] {
    let noise = |axis: usize| {
        let nx = t * 1000.7 + axis as f64 * 137.508;
        ((nx.sin() * 9973.1).fract() - 0.5) * 2.0
    };
    [
        (1.0 + 0.01 * (2.0 * PI * 0.3 * t).sin() + 0.01 * noise(0)) as f32,
        (0.01 * (2.0 * PI * 0.5 * t).cos() + 0.01 * noise(1)) as f32,
        (0.01 * (2.0 * PI * 0.1 * t).sin() + 0.01 * noise(2)) as f32,
        (2.0 * (2.0 * PI * 0.2 * t).sin() + noise(3)) as f32,
        (2.0 * (2.0 * PI * 0.3 * t).cos() + noise(4)) as f32,
        (2.0 * (2.0 * PI * 0.1 * t).sin() + noise(5)) as f32,
    ]
}

/// Quiet synthetic IMU with injectable shakes.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    t: f64,
    dt: f64,
    jolt_frames: u32,
}

impl SimulatedSensor {
    /// `fps` sets how far simulated time advances per reading.
    pub fn new(fps: u32) -> Self {
        Self {
            t: 0.0,
            dt: 1.0 / fps.max(1) as f64,
            jolt_frames: 0,
        }
    }

    /// Shake the board for the next `frames` readings.
    pub fn jolt(&mut self, frames: u32) {
        debug!("simulated jolt for {frames} frames");
        self.jolt_frames = self.jolt_frames.max(frames);
    }

    pub fn is_jolting(&self) -> bool {
        self.jolt_frames > 0
    }
}

impl MotionSensor for SimulatedSensor {
    fn read_sample(&mut self) -> Result<MotionSample, SensorError> {
        let mut axes = sim_axes(self.t);
        if self.jolt_frames > 0 {
            self.jolt_frames -= 1;
            // A hard twist: ±300 °/s about every axis plus a 1.5 g shove.
            let swing = (2.0 * PI * 4.0 * self.t).sin().signum() as f32;
            axes[1] += 1.5 * swing;
            for g in &mut axes[3..] {
                *g += 300.0 * swing;
            }
        }
        self.t += self.dt;
        Ok(MotionSample::new(axes))
    }
}

// ── Replay ────────────────────────────────────────────────────────────────────

/// Plays back scripted readings in order. Once the script runs out every
/// read returns [`AT_REST`].
#[derive(Debug, Clone, Default)]
pub struct ReplaySensor {
    script: VecDeque<Result<MotionSample, SensorError>>,
    reads: u64,
}

impl ReplaySensor {
    pub fn new(script: impl IntoIterator<Item = Result<MotionSample, SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            reads: 0,
        }
    }

    pub fn push_sample(&mut self, sample: MotionSample) {
        self.script.push_back(Ok(sample));
    }

    pub fn push_samples(&mut self, sample: MotionSample, count: usize) {
        self.script.extend(std::iter::repeat(Ok(sample)).take(count));
    }

    pub fn push_error(&mut self, err: SensorError) {
        self.script.push_back(Err(err));
    }

    /// Scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl MotionSensor for ReplaySensor {
    fn read_sample(&mut self) -> Result<MotionSample, SensorError> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Ok(AT_REST))
    }
}
