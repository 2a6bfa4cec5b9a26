//! Engine configuration.
//!
//! Every tunable the behaviour engine reads lives in [`EngineConfig`].
//! `Default` reproduces the constants the creature ships with; a TOML file
//! only needs to name the values it changes:
//!
//! ```toml
//! [heart]
//! resting_rate = 80.0
//! relax_mode = "unclamped"
//!
//! [visualizer]
//! mode_period = 60
//! ```
//!
//! Nothing is used before [`EngineConfig::validate`] has accepted it;
//! [`crate::engine::Engine::new`] calls it and refuses to start otherwise.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{EyeSide, AXES};

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display: DisplayConfig,
    pub heart: HeartConfig,
    pub alertness: AlertnessConfig,
    pub eyes: EyeConfig,
    pub visualizer: VisualizerConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject configurations that would divide by zero, never fire, or
    /// index past the sample.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.fps == 0 {
            return Err(ConfigError::Zero("display.fps"));
        }
        if self.heart.resting_rate <= 0.0 {
            return Err(ConfigError::Zero("heart.resting_rate"));
        }
        if self.heart.resting_rate > self.heart.max_rate {
            return Err(ConfigError::HeartRange {
                resting: self.heart.resting_rate,
                max: self.heart.max_rate,
            });
        }
        let h = &self.heart;
        for (name, amount) in [
            ("heart.tension_step", h.tension_step),
            ("heart.awake_relax", h.awake_relax),
            ("heart.asleep_relax", h.asleep_relax),
        ] {
            if !(amount >= 0.0) {
                return Err(ConfigError::Negative(name));
            }
        }
        if self.eyes.step <= 0 {
            return Err(ConfigError::Zero("eyes.step"));
        }
        if self.eyes.blink_period == 0 {
            return Err(ConfigError::Zero("eyes.blink_period"));
        }
        if let Some(cue) = self
            .eyes
            .blink_script
            .iter()
            .find(|c| c.tick >= self.eyes.blink_period)
        {
            return Err(ConfigError::BlinkCue {
                tick: cue.tick,
                period: self.eyes.blink_period,
            });
        }

        let v = &self.visualizer;
        if v.rendered_axes > AXES {
            return Err(ConfigError::RenderedAxes {
                rendered: v.rendered_axes,
                available: AXES,
            });
        }
        if v.graph_width == 0 {
            return Err(ConfigError::Zero("visualizer.graph_width"));
        }
        if v.sample_every == 0 {
            return Err(ConfigError::Zero("visualizer.sample_every"));
        }
        if v.mode_period == 0 {
            return Err(ConfigError::Zero("visualizer.mode_period"));
        }
        for (axis, &(min, max)) in v.calibration.iter().enumerate().take(v.rendered_axes) {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(ConfigError::Calibration { axis, min, max });
            }
        }
        Ok(())
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: i32,
    pub height: i32,
    /// Target frame rate. Also the time base of the heart beat.
    pub fps: u32,
    /// Backlight PWM duty while awake.
    pub bright: u16,
    /// Backlight PWM duty while sleeping.
    pub dim: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            fps: 20,
            bright: 65535,
            dim: 3000,
        }
    }
}

impl DisplayConfig {
    /// Panel centre. Every centred element (eyes, heart ring, battery
    /// gauge) is placed from this point.
    pub fn center(&self) -> (i32, i32) {
        (self.width / 2, self.height / 2)
    }
}

// ── Heart ─────────────────────────────────────────────────────────────────────

/// What [`crate::heart::HeartRateModel::relax`] does when the pull toward
/// the resting rate is larger than the remaining gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelaxMode {
    /// Stop at the resting rate.
    #[default]
    Clamped,
    /// Subtract the full amount, then climb back one unit per frame.
    Unclamped,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeartConfig {
    pub resting_rate: f32,
    pub max_rate: f32,
    /// Added per frame of detected activity.
    pub tension_step: f32,
    /// Relax amount per awake frame.
    pub awake_relax: f32,
    /// Relax amount per sleeping frame.
    pub asleep_relax: f32,
    pub relax_mode: RelaxMode,
    /// Ring radii drawn for the beat indicator.
    pub ring_radii: [i32; 3],
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            resting_rate: 100.0,
            max_rate: 300.0,
            tension_step: 5.0,
            awake_relax: 1.0,
            asleep_relax: 5.0,
            relax_mode: RelaxMode::Clamped,
            ring_radii: [118, 119, 120],
        }
    }
}

// ── Alertness ─────────────────────────────────────────────────────────────────

/// Activation limit for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AxisThreshold {
    pub limit: f32,
    /// Compare `|value|` instead of the signed value.
    #[serde(default)]
    pub magnitude: bool,
}

impl AxisThreshold {
    pub const fn signed(limit: f32) -> Self {
        Self { limit, magnitude: false }
    }

    pub const fn magnitude(limit: f32) -> Self {
        Self { limit, magnitude: true }
    }

    #[inline]
    pub fn exceeded_by(&self, value: f32) -> bool {
        if self.magnitude {
            value.abs() > self.limit
        } else {
            value > self.limit
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertnessConfig {
    /// Awake frames without activity tolerated before dozing off.
    pub boredom_max: u32,
    pub thresholds: [AxisThreshold; AXES],
    /// Added to every raw sample before anything else reads it.
    pub axis_offsets: [f32; AXES],
}

impl Default for AlertnessConfig {
    fn default() -> Self {
        Self {
            boredom_max: 100,
            thresholds: [
                AxisThreshold::signed(0.8),
                AxisThreshold::signed(1.0),
                AxisThreshold::signed(0.8),
                AxisThreshold::magnitude(50.0),
                AxisThreshold::magnitude(50.0),
                AxisThreshold::magnitude(50.0),
            ],
            axis_offsets: [-1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        }
    }
}

// ── Eyes ──────────────────────────────────────────────────────────────────────

/// One row of the blink script.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BlinkCue {
    /// Value of the time-awake counter at which the cue fires.
    pub tick: u32,
    pub eye: EyeSide,
    /// Target height assigned to that eye.
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    pub top: i32,
    pub width: i32,
    /// Fully open height.
    pub height: i32,
    pub closed_height: i32,
    pub spacing: i32,
    pub ball_width: i32,
    pub ball_height: i32,
    /// Height change per frame while animating.
    pub step: i32,
    /// The time-awake counter wraps to zero on reaching this value.
    pub blink_period: u32,
    pub blink_script: Vec<BlinkCue>,
}

impl Default for EyeConfig {
    fn default() -> Self {
        let cue = |tick, eye, height| BlinkCue { tick, eye, height };
        Self {
            top: 75,
            width: 50,
            height: 40,
            closed_height: 3,
            spacing: 10,
            ball_width: 15,
            ball_height: 15,
            step: 8,
            blink_period: 130,
            blink_script: vec![
                cue(100, EyeSide::Left, 3),
                cue(105, EyeSide::Left, 40),
                cue(115, EyeSide::Left, 10),
                cue(119, EyeSide::Right, 3),
                cue(120, EyeSide::Left, 40),
                cue(125, EyeSide::Right, 40),
            ],
        }
    }
}

// ── Visualizer ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Leading axes drawn; the rest of the sample is ignored.
    pub rendered_axes: usize,
    /// Pixel height a full calibration range maps onto.
    pub render_height: i32,
    /// Top edge of the bar gauges.
    pub top: i32,
    /// Horizontal distance between bar gauges.
    pub bar_spacing: i32,
    /// Vertical offset between stacked graph traces.
    pub trace_spacing: i32,
    /// Expected (min, max) per axis.
    pub calibration: [(f32, f32); AXES],
    /// Graph buffer capacity in snapshots.
    pub graph_width: usize,
    /// Append a snapshot every this many frames.
    pub sample_every: u64,
    /// Awake frames between render-mode flips.
    pub mode_period: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            rendered_axes: 5,
            render_height: 50,
            top: 130,
            bar_spacing: 25,
            trace_spacing: 10,
            calibration: [
                (-0.78, 1.47),
                (-0.77, 2.2),
                (-3.06, 2.26),
                (-512.0, 495.0),
                (-403.0, 437.0),
                (-10.0, 10.0),
            ],
            graph_width: 24,
            sample_every: 2,
            mode_period: 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_degenerate_calibration_rejected() {
        let mut config = EngineConfig::default();
        config.visualizer.calibration[3] = (1.0, 1.0);
        match config.validate() {
            Err(ConfigError::Calibration { axis, .. }) => assert_eq!(axis, 3),
            other => panic!("expected calibration error, got {other:?}"),
        }
    }

    #[test]
    fn test_unrendered_axis_calibration_ignored() {
        let mut config = EngineConfig::default();
        config.visualizer.calibration[5] = (0.0, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_center_is_half_the_panel() {
        let mut display = DisplayConfig::default();
        assert_eq!(display.center(), (120, 120));
        display.width = 321;
        assert_eq!(display.center(), (160, 120));
    }

    #[test]
    fn test_zero_fps_rejected() {
        let mut config = EngineConfig::default();
        config.display.fps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Zero("display.fps"))));
    }

    #[test]
    fn test_negative_heart_amounts_rejected() {
        let err = EngineConfig::from_toml_str("[heart]\nawake_relax = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Negative("heart.awake_relax")));

        let mut config = EngineConfig::default();
        config.heart.tension_step = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative("heart.tension_step"))
        ));

        config.heart.tension_step = 0.0;
        config.heart.asleep_relax = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative("heart.asleep_relax"))
        ));
    }

    #[test]
    fn test_blink_cue_outside_period_rejected() {
        let mut config = EngineConfig::default();
        config.eyes.blink_period = 110;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BlinkCue { tick: 115, period: 110 })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [heart]
            resting_rate = 80.0
            relax_mode = "unclamped"

            [visualizer]
            mode_period = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.heart.resting_rate, 80.0);
        assert_eq!(config.heart.max_rate, 300.0);
        assert_eq!(config.heart.relax_mode, RelaxMode::Unclamped);
        assert_eq!(config.visualizer.mode_period, 60);
        assert_eq!(config.visualizer.graph_width, 24);
        assert_eq!(config.eyes, EyeConfig::default());
    }

    #[test]
    fn test_toml_blink_script_and_thresholds() {
        let config = EngineConfig::from_toml_str(
            r#"
            [alertness]
            thresholds = [
                { limit = 0.5 }, { limit = 0.5 }, { limit = 0.5 },
                { limit = 20.0, magnitude = true },
                { limit = 20.0, magnitude = true },
                { limit = 20.0, magnitude = true },
            ]

            [eyes]
            blink_script = [{ tick = 10, eye = "right", height = 3 }]
            "#,
        )
        .unwrap();
        assert!(config.alertness.thresholds[3].exceeded_by(-21.0));
        assert!(!config.alertness.thresholds[0].exceeded_by(-0.9));
        assert_eq!(config.eyes.blink_script.len(), 1);
        assert_eq!(config.eyes.blink_script[0].eye, EyeSide::Right);
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        let err = EngineConfig::from_toml_str("[visualizer]\ngraph_width = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Zero("visualizer.graph_width")));

        let err = EngineConfig::from_toml_str("[heart]\nresting_rate = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
