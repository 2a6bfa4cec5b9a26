//! Whole-loop scenarios: scripted sensor in, recorded frames out.

use crate::battery::SimulatedBattery;
use crate::config::EngineConfig;
use crate::driver::FrameDriver;
use crate::engine::Engine;
use crate::error::{EngineError, SensorError};
use crate::hal::{DrawCommand, DrawList, LogBacklight};
use crate::sensor::{ReplaySensor, AT_REST};
use crate::types::{AlertnessState, MotionSample, RenderMode};

const SHAKE: MotionSample = MotionSample::new([1.0, 0.0, 0.0, 0.0, 0.0, 120.0]);

type TestDriver = FrameDriver<ReplaySensor, DrawList, SimulatedBattery, LogBacklight>;

fn driver(sensor: ReplaySensor) -> TestDriver {
    FrameDriver::new(
        Engine::new(EngineConfig::default()).unwrap(),
        sensor,
        DrawList::new(240, 240),
        SimulatedBattery::full(),
        LogBacklight::new(),
    )
}

/// Tick until the script is used up, returning the frame numbers at which
/// the alertness state changed.
fn run_script(d: &mut TestDriver) -> Vec<(u64, AlertnessState)> {
    let mut changes = vec![];
    let mut last = d.engine().state();
    while d.sensor_mut().remaining() > 0 {
        let report = d.tick().unwrap();
        if report.state != last {
            changes.push((report.frame, report.state));
            last = report.state;
        }
    }
    changes
}

#[test]
fn test_wake_then_doze_off_lifecycle() {
    let mut sensor = ReplaySensor::default();
    sensor.push_samples(AT_REST, 10);
    sensor.push_sample(SHAKE);
    sensor.push_samples(AT_REST, 150);
    let mut d = driver(sensor);

    d.tick().unwrap();
    assert_eq!(d.backlight().duty(), Some(3000));

    let changes = run_script(&mut d);
    // Woke on the 11th frame; bored after 101 quiet frames.
    assert_eq!(
        changes,
        [(11, AlertnessState::Awake), (112, AlertnessState::Sleeping)]
    );
    assert_eq!(d.backlight().duty(), Some(3000));
    assert_eq!(d.engine().heart().rate(), 100.0);
}

#[test]
fn test_racing_heart_delays_sleep() {
    let mut sensor = ReplaySensor::default();
    sensor.push_samples(SHAKE, 60);
    let mut d = driver(sensor);
    run_script(&mut d);
    // +5 tension, -1 relax per frame until the 300 bpm cap.
    assert_eq!(d.engine().heart().rate(), 299.0);

    d.sensor_mut().push_samples(AT_REST, 250);
    let changes = run_script(&mut d);
    assert_eq!(changes, [(60 + 200, AlertnessState::Sleeping)]);
}

#[test]
fn test_transient_failures_are_ridden_out() {
    let garbled = MotionSample::from_slice(&[0.0; 3]).unwrap_err();
    assert!(matches!(garbled, SensorError::Garbled { expected: 6, got: 3 }));

    let mut sensor = ReplaySensor::default();
    sensor.push_sample(SHAKE);
    sensor.push_error(SensorError::Transient("timeout".into()));
    sensor.push_error(garbled);
    sensor.push_sample(AT_REST);
    let mut d = driver(sensor);

    let frames: Vec<(u64, bool)> = (0..4)
        .map(|_| {
            let r = d.tick().unwrap();
            (r.frame, r.skipped.is_some())
        })
        .collect();
    assert_eq!(frames, [(1, false), (1, true), (1, true), (2, false)]);
    assert_eq!(d.display().presented(), 4);
    assert_eq!(d.engine().state(), AlertnessState::Awake);
}

#[test]
fn test_fatal_sensor_error_stops_after_last_good_frame() {
    let mut sensor = ReplaySensor::default();
    sensor.push_samples(AT_REST, 3);
    sensor.push_error(SensorError::Unresponsive("no ack".into()));
    let mut d = driver(sensor);
    for _ in 0..3 {
        d.tick().unwrap();
    }
    let err = d.tick().unwrap_err();
    assert!(matches!(err, EngineError::Sensor(SensorError::Unresponsive(_))));
    assert_eq!(d.display().presented(), 3);
}

#[test]
fn test_graph_stays_bounded_and_modes_alternate() {
    let mut sensor = ReplaySensor::default();
    for _ in 0..20 {
        sensor.push_sample(SHAKE);
        sensor.push_samples(AT_REST, 19);
    }
    let mut d = driver(sensor);

    let mut flips = vec![];
    let mut mode = d.engine().visualizer().mode();
    while d.sensor_mut().remaining() > 0 {
        let report = d.tick().unwrap();
        assert_eq!(report.state, AlertnessState::Awake);
        assert!(d.engine().visualizer().graph().len() <= 24);
        if d.engine().visualizer().mode() != mode {
            mode = d.engine().visualizer().mode();
            flips.push(report.frame);
        }
    }
    assert_eq!(flips, [150, 300]);
    assert_eq!(mode, RenderMode::Graph);
    assert_eq!(d.engine().visualizer().graph().len(), 24);
}

#[test]
fn test_sleeping_frame_contents() {
    let mut d = driver(ReplaySensor::default());
    d.tick().unwrap();
    let frame = d.display().frame();

    let rings = frame
        .iter()
        .filter(|c| matches!(c, DrawCommand::Ellipse { filled: false, quadrant_mask: Some(_), .. }))
        .count();
    let eyes = frame
        .iter()
        .filter(|c| matches!(c, DrawCommand::Rect { h: 3, .. }))
        .count();
    assert_eq!(rings, 3);
    assert_eq!(eyes, 2);
    assert_eq!(d.display().texts().next(), Some("Z"));
    assert!(!frame.iter().any(|c| matches!(c, DrawCommand::Line { .. })));
}
