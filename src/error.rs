//! Error types for the behaviour engine and its collaborators.
//!
//! | Error | Raised by | Policy |
//! |---|---|---|
//! | [`SensorError::Transient`] | [`crate::hal::MotionSensor`] | skip the update, keep prior state, retry next frame |
//! | [`SensorError::Garbled`] | [`crate::types::MotionSample::from_slice`] | same as `Transient` |
//! | [`SensorError::Unresponsive`] | [`crate::hal::MotionSensor`] | fatal, halts the frame loop |
//! | [`DisplayError`] | [`crate::hal::Display::present`] | fatal, halts the frame loop |
//! | [`ConfigError`] | [`crate::config::EngineConfig::validate`] | fatal, engine refuses to start |

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading one motion sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// A single failed read (bus NAK, timeout). The next read may succeed.
    #[error("transient sensor read failure: {0}")]
    Transient(String),

    /// The sensor answered with the wrong number of axes.
    #[error("garbled sample: expected {expected} axes, got {got}")]
    Garbled { expected: usize, got: usize },

    /// The sensor stopped answering altogether.
    #[error("motion sensor unresponsive: {0}")]
    Unresponsive(String),
}

impl SensorError {
    /// `true` for errors the frame loop should ride out.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Garbled { .. })
    }
}

/// The panel could not be flushed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("display unresponsive: {0}")]
pub struct DisplayError(pub String);

/// Rejected engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Calibration range for an axis is empty, inverted or not finite.
    /// Normalising against it would divide by zero or flip the chart.
    #[error("axis {axis}: calibration range ({min}, {max}) must satisfy min < max")]
    Calibration { axis: usize, min: f32, max: f32 },

    /// A value that must be strictly positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must be a non-negative number")]
    Negative(&'static str),

    #[error("resting heart rate {resting} exceeds maximum {max}")]
    HeartRange { resting: f32, max: f32 },

    #[error("{rendered} rendered axes requested but samples only carry {available}")]
    RenderedAxes { rendered: usize, available: usize },

    #[error("blink cue at tick {tick} can never fire with a blink period of {period}")]
    BlinkCue { tick: u32, period: u32 },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Anything that stops the frame loop.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("sensor failed: {0}")]
    Sensor(SensorError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}
