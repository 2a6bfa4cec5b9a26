//! Rolling visualisation of the motion channels.
//!
//! Each rendered axis is normalised into a pixel offset against a fixed
//! calibration range:
//!
//! ```text
//! position = trunc(|(value − min) / (max − min) × render_height|)
//! ```
//!
//! Positions feed two things: per-axis min/max ticks (reset on every wake)
//! and a bounded FIFO of snapshots for the scrolling graph. The two render
//! modes alternate on a fixed timer:
//!
//! | Mode | Per axis |
//! |---|---|
//! | [`RenderMode::Bars`] | vertical guide, min/max ticks, dot at the current position |
//! | [`RenderMode::Graph`] | polyline across the buffer, stacked by axis index |

use std::collections::VecDeque;

use log::debug;

use crate::config::VisualizerConfig;
use crate::extents::ExtentsTracker;
use crate::hal::Display;
use crate::types::{Color, MotionSample, RenderMode, AXES};

/// Pixel positions for every axis in one frame. Only the leading
/// `rendered_axes` entries are meaningful.
pub type Snapshot = [i32; AXES];

/// Graph traces are drawn this many pixels above the bar gauges' top edge.
const GRAPH_LIFT: i32 = 20;

/// Half-width of the min/max tick marks.
const TICK_HALF: i32 = 2;

// ── Graph buffer ──────────────────────────────────────────────────────────────

/// Bounded FIFO of snapshots. Never holds more than `capacity` entries.
#[derive(Debug, Clone)]
pub struct GraphBuffer {
    capacity: usize,
    entries: VecDeque<Snapshot>,
}

impl GraphBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append `snapshot`, evicting the oldest entries past capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}

// ── Mode timer ────────────────────────────────────────────────────────────────

/// Flips the render mode every `period` ticks.
#[derive(Debug, Clone)]
pub struct ModeTimer {
    period: u32,
    counter: u32,
    mode: RenderMode,
}

impl ModeTimer {
    pub fn new(period: u32, initial: RenderMode) -> Self {
        Self {
            period,
            counter: 0,
            mode: initial,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Count one frame. Returns `true` on the frame the mode flips.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            self.mode = self.mode.toggled();
            return true;
        }
        false
    }
}

// ── Visualizer ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SensorVisualizer {
    rendered_axes: usize,
    render_height: i32,
    top: i32,
    bar_spacing: i32,
    trace_spacing: i32,
    calibration: [(f32, f32); AXES],
    sample_every: u64,
    screen_width: i32,
    extents: ExtentsTracker<i32, AXES>,
    graph: GraphBuffer,
    timer: ModeTimer,
    current: Snapshot,
}

impl SensorVisualizer {
    /// The graph starts with a single all-zero snapshot so the first frame
    /// already has a baseline to draw from.
    pub fn new(config: &VisualizerConfig, screen_width: i32) -> Self {
        let mut graph = GraphBuffer::new(config.graph_width);
        graph.push([0; AXES]);
        Self {
            rendered_axes: config.rendered_axes,
            render_height: config.render_height,
            top: config.top,
            bar_spacing: config.bar_spacing,
            trace_spacing: config.trace_spacing,
            calibration: config.calibration,
            sample_every: config.sample_every,
            screen_width,
            extents: ExtentsTracker::new(),
            graph,
            timer: ModeTimer::new(config.mode_period, RenderMode::Graph),
            current: [0; AXES],
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.timer.mode()
    }

    pub fn graph(&self) -> &GraphBuffer {
        &self.graph
    }

    pub fn extents(&self) -> &ExtentsTracker<i32, AXES> {
        &self.extents
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Map one axis value onto `0..=render_height` pixels.
    pub fn normalize(&self, axis: usize, value: f32) -> i32 {
        let (min, max) = self.calibration[axis];
        let (min, max) = (min as f64, max as f64);
        // Divide first so the calibration endpoints land exactly on 0 and
        // render_height.
        let fraction = (value as f64 - min) / (max - min);
        (fraction * self.render_height as f64).abs() as i32
    }

    /// Forget the min/max ticks. Called on every wake.
    pub fn reset(&mut self) {
        self.extents.reset();
    }

    /// Fold one awake frame into the visualisation.
    ///
    /// `frame` is the engine's global frame number; a snapshot is appended
    /// to the graph only when it is a multiple of `sample_every`.
    pub fn update(&mut self, sample: &MotionSample, frame: u64) {
        let mut snapshot = [0; AXES];
        for (axis, slot) in snapshot.iter_mut().enumerate().take(self.rendered_axes) {
            *slot = self.normalize(axis, sample.axis(axis));
        }
        self.current = snapshot;
        self.extents.observe(&snapshot[..self.rendered_axes]);

        if frame % self.sample_every == 0 {
            self.graph.push(snapshot);
        }
        if self.timer.tick() {
            debug!("visualizer mode -> {:?}", self.timer.mode());
        }
    }

    pub fn render(&self, display: &mut dyn Display) {
        match self.timer.mode() {
            RenderMode::Bars => self.render_bars(display),
            RenderMode::Graph => self.render_graph(display),
        }
    }

    fn render_bars(&self, display: &mut dyn Display) {
        let gaps = self.rendered_axes.saturating_sub(1) as i32;
        let start = (self.screen_width - self.bar_spacing * gaps) / 2;
        let color = Color::WHITE;
        for axis in 0..self.rendered_axes {
            let x = start + self.bar_spacing * axis as i32;
            display.draw_line(x, self.top, x, self.top + self.render_height, color);

            if let Some((min, max)) = self.extents.get(axis) {
                for y in [self.top + min, self.top + max] {
                    display.draw_line(x - TICK_HALF, y, x + TICK_HALF, y, color);
                }
            }

            display.draw_ellipse(x, self.top + self.current[axis], 5, 2, color, true, None);
        }
    }

    fn render_graph(&self, display: &mut dyn Display) {
        let step = self.screen_width / self.graph.capacity() as i32;
        let points: Vec<&Snapshot> = self.graph.iter().collect();
        for axis in 0..self.rendered_axes {
            let base = self.top + axis as i32 * self.trace_spacing - GRAPH_LIFT;
            for (x, pair) in points.windows(2).enumerate() {
                let x = x as i32;
                display.draw_line(
                    x * step,
                    base + pair[0][axis],
                    (x + 1) * step,
                    base + pair[1][axis],
                    Color::WHITE,
                );
            }
        }
    }
}
