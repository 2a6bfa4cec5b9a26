//! The behaviour engine: every piece of creature state, advanced one frame
//! at a time.
//!
//! [`Engine::update`] runs the per-frame fusion in a fixed order:
//!
//! | Step | What |
//! |---|---|
//! | 1 | remove gravity (`axis_offsets`); widen the raw extents if already awake |
//! | 2 | evaluate alertness; tension the heart on activity |
//! | 3 | apply wake / sleep side effects (eyes, extents, backlight) |
//! | 4 | relax the heart by the per-state amount |
//! | 5 | advance the blink script (awake only), step both eyes |
//! | 6 | update the visualizer (awake) or the snooze glyph (asleep) |
//! | 7 | advance the heart beat phase |
//!
//! [`Engine::render`] is read-only apart from the battery reading, so a
//! frame whose sensor read failed can still be drawn from unchanged state.

use log::debug;

use crate::alertness::{AlertnessStateMachine, Transition};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::extents::ExtentsTracker;
use crate::eyes::EyeAnimator;
use crate::hal::{BatteryMeter, Display};
use crate::heart::HeartRateModel;
use crate::snooze::SnoozeIndicator;
use crate::types::{AlertnessState, MotionSample, RenderMode, AXES};
use crate::visualizer::SensorVisualizer;

/// Point-in-time summary for status lines and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSnapshot {
    pub state: AlertnessState,
    pub boredom: u32,
    pub heart_rate: f32,
    pub on_beat: bool,
    pub left_eye: i32,
    pub right_eye: i32,
    pub mode: RenderMode,
    pub time_awake: u32,
    /// Frames fed through [`Engine::update`] so far.
    pub frame: u64,
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    alertness: AlertnessStateMachine,
    heart: HeartRateModel,
    eyes: EyeAnimator,
    visualizer: SensorVisualizer,
    snooze: SnoozeIndicator,
    raw_extents: ExtentsTracker<f32, AXES>,
    frame: u64,
    /// Backlight duty the driver has not applied yet.
    brightness: Option<u16>,
}

impl Engine {
    /// Build an engine in the Sleeping state with eyes closed.
    ///
    /// Fails if `config` does not pass [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let display = &config.display;
        Ok(Self {
            alertness: AlertnessStateMachine::new(&config.alertness),
            heart: HeartRateModel::new(&config.heart, display.fps),
            eyes: EyeAnimator::new(&config.eyes, display.center().0),
            visualizer: SensorVisualizer::new(&config.visualizer, display.width),
            snooze: SnoozeIndicator::new(config.eyes.top),
            raw_extents: ExtentsTracker::new(),
            frame: 0,
            brightness: Some(display.dim),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> AlertnessState {
        self.alertness.state()
    }

    pub fn alertness(&self) -> &AlertnessStateMachine {
        &self.alertness
    }

    pub fn heart(&self) -> &HeartRateModel {
        &self.heart
    }

    pub fn eyes(&self) -> &EyeAnimator {
        &self.eyes
    }

    pub fn visualizer(&self) -> &SensorVisualizer {
        &self.visualizer
    }

    pub fn snooze(&self) -> &SnoozeIndicator {
        &self.snooze
    }

    /// Offset-corrected sensor extents since the last wake.
    pub fn raw_extents(&self) -> &ExtentsTracker<f32, AXES> {
        &self.raw_extents
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Hand over a pending backlight change, if any.
    ///
    /// A fresh engine asks for the dim level once; after that a request is
    /// raised only on wake and on falling asleep.
    pub fn take_brightness_request(&mut self) -> Option<u16> {
        self.brightness.take()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.alertness.state(),
            boredom: self.alertness.boredom(),
            heart_rate: self.heart.rate(),
            on_beat: self.heart.is_on_beat(),
            left_eye: self.eyes.left().height,
            right_eye: self.eyes.right().height,
            mode: self.visualizer.mode(),
            time_awake: self.eyes.time_awake(),
            frame: self.frame,
        }
    }

    /// Fold one raw sensor reading into the creature state.
    pub fn update(&mut self, raw: &MotionSample) {
        let sample = raw.offset_by(&self.config.alertness.axis_offsets);
        if self.alertness.state().is_awake() {
            self.raw_extents.observe(&sample.axes);
        }

        let eval = self.alertness.evaluate(&sample, self.heart.is_rested());
        if eval.active {
            self.heart.tension(self.config.heart.tension_step);
        }
        match eval.transition {
            Some(Transition::Woke) => {
                self.raw_extents.reset();
                self.visualizer.reset();
                self.eyes.open();
                self.brightness = Some(self.config.display.bright);
            }
            Some(Transition::FellAsleep) => {
                self.eyes.close();
                self.brightness = Some(self.config.display.dim);
            }
            None => {}
        }

        let awake = self.alertness.state().is_awake();
        let relax = if awake {
            self.config.heart.awake_relax
        } else {
            self.config.heart.asleep_relax
        };
        self.heart.relax(relax);

        if awake {
            self.eyes.advance_awake();
        }
        self.eyes.step();

        if awake {
            self.visualizer.update(&sample, self.frame);
        } else {
            self.snooze.advance();
        }

        if self.heart.beat() {
            debug!("beat at {:.0} bpm", self.heart.rate());
        }
        self.frame += 1;
    }

    /// Draw the current state. Nothing is flushed; the caller presents.
    ///
    /// Positions come from `display` in the configuration, not from the
    /// surface's own size.
    pub fn render(&self, display: &mut dyn Display, battery: &mut dyn BatteryMeter) {
        display.clear();
        if self.alertness.state().is_awake() {
            self.visualizer.render(display);
        } else {
            self.snooze.render(display);
        }
        let center = self.config.display.center();
        self.heart.render(display, center.0, center.1);
        battery.render(display, center);
        self.eyes.render(display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::SimulatedBattery;
    use crate::error::ConfigError;
    use crate::hal::{DrawCommand, DrawList};
    use crate::sensor::AT_REST;

    const SHAKE: MotionSample = MotionSample::new([1.0, 0.0, 0.0, 400.0, 0.0, 0.0]);

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_degenerate_calibration_refuses_to_start() {
        let mut config = EngineConfig::default();
        config.visualizer.calibration[0] = (2.0, 2.0);
        match Engine::new(config) {
            Err(EngineError::Config(ConfigError::Calibration { axis: 0, .. })) => {}
            other => panic!("expected calibration error, got {other:?}"),
        }
    }

    #[test]
    fn test_fresh_engine_sleeps_and_requests_dim() {
        let mut e = engine();
        let s = e.snapshot();
        assert_eq!(s.state, AlertnessState::Sleeping);
        assert_eq!((s.left_eye, s.right_eye), (3, 3));
        assert_eq!(e.take_brightness_request(), Some(3000));
        assert_eq!(e.take_brightness_request(), None);
    }

    #[test]
    fn test_gravity_is_removed_before_thresholds() {
        let mut e = engine();
        for _ in 0..50 {
            e.update(&AT_REST);
        }
        assert_eq!(e.state(), AlertnessState::Sleeping);
        assert!(e.raw_extents().is_pristine());

        e.update(&MotionSample::new([1.9, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(e.state(), AlertnessState::Awake);
    }

    #[test]
    fn test_wake_resets_extents_and_opens_eyes() {
        let mut e = engine();
        e.update(&AT_REST);
        e.take_brightness_request();

        e.update(&SHAKE);
        assert_eq!(e.state(), AlertnessState::Awake);
        assert_eq!(e.alertness().boredom(), 0);
        assert!(e.raw_extents().is_pristine());
        assert_eq!(e.eyes().left().target, Some(40));
        assert_eq!(e.eyes().right().target, Some(40));
        assert_eq!(e.take_brightness_request(), Some(65535));
        // Tensed by 5, then relaxed by the awake amount.
        assert_eq!(e.heart().rate(), 104.0);
    }

    #[test]
    fn test_extents_ignore_samples_while_sleeping() {
        let mut e = engine();
        let restless = MotionSample::new([1.5, 0.5, 0.7, 40.0, -40.0, 30.0]);
        e.update(&restless);
        e.update(&AT_REST);
        assert_eq!(e.state(), AlertnessState::Sleeping);
        assert!(e.raw_extents().is_pristine());

        e.update(&SHAKE);
        for _ in 0..101 {
            e.update(&AT_REST);
        }
        assert_eq!(e.state(), AlertnessState::Sleeping);
        let before = e.raw_extents().clone();
        e.update(&restless);
        assert_eq!(e.state(), AlertnessState::Sleeping);
        assert_eq!(e.raw_extents(), &before);
        // Only the quiet awake frames were recorded.
        assert_eq!(e.raw_extents().get(3), Some((0.0, 0.0)));
        assert_eq!(e.raw_extents().get(0), Some((0.0, 0.0)));
    }

    #[test]
    fn test_render_centres_on_configured_panel() {
        let mut config = EngineConfig::default();
        config.display.width = 200;
        config.display.height = 200;
        let mut e = Engine::new(config).unwrap();
        e.update(&AT_REST);
        assert_eq!((e.eyes().left().x, e.eyes().right().x), (70, 130));

        // A surface of another size does not move anything.
        let mut d = DrawList::new(240, 240);
        let mut b = SimulatedBattery::full();
        e.render(&mut d, &mut b);
        d.present().unwrap();
        let ring_centres: Vec<(i32, i32)> = d
            .frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Ellipse { x, y, quadrant_mask: Some(_), .. } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(ring_centres, [(100, 100); 3]);
    }

    #[test]
    fn test_falls_asleep_after_quiet_spell() {
        let mut e = engine();
        e.update(&SHAKE);
        e.take_brightness_request();
        for i in 1..=100 {
            e.update(&AT_REST);
            assert_eq!(e.state(), AlertnessState::Awake, "slept early at {i}");
        }
        assert!(e.heart().is_rested());
        e.update(&AT_REST);
        assert_eq!(e.state(), AlertnessState::Sleeping);
        assert_eq!(e.eyes().left().target, Some(3));
        assert_eq!(e.take_brightness_request(), Some(3000));
    }

    #[test]
    fn test_eyes_open_over_following_frames() {
        let mut e = engine();
        e.update(&SHAKE);
        for _ in 0..5 {
            e.update(&AT_REST);
        }
        let s = e.snapshot();
        assert_eq!((s.left_eye, s.right_eye), (40, 40));
        assert!(e.eyes().left().is_idle());
        assert_eq!(s.time_awake, 6);
        assert_eq!(s.frame, 6);
    }

    #[test]
    fn test_sleeping_render_shows_snooze_not_visualizer() {
        let mut e = engine();
        e.update(&AT_REST);
        let mut d = DrawList::new(240, 240);
        let mut b = SimulatedBattery::full();
        e.render(&mut d, &mut b);
        d.present().unwrap();
        let texts: Vec<&str> = d.texts().collect();
        assert_eq!(texts, ["Z", "4.15v"]);
    }

    #[test]
    fn test_awake_render_draws_graph_instead_of_snooze() {
        let mut e = engine();
        e.update(&SHAKE);
        e.update(&AT_REST);
        let mut d = DrawList::new(240, 240);
        let mut b = SimulatedBattery::full();
        e.render(&mut d, &mut b);
        d.present().unwrap();
        assert!(!d.texts().any(|t| t == "Z"));
        assert_eq!(e.visualizer().mode(), RenderMode::Graph);
        assert_eq!(e.visualizer().graph().len(), 2);
    }
}
