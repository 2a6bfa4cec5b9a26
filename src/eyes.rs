//! Eye geometry, target-seeking animation and the blink script.
//!
//! Each eye is a rectangle outline whose height animates toward a target
//! height in fixed steps. Opening, closing and blinking are all just target
//! assignments:
//!
//! | Trigger | Left | Right |
//! |---|---|---|
//! | wake | open | open |
//! | fall asleep | closed | closed |
//! | blink script cue | per cue | per cue |
//!
//! The blink script is a table keyed by the time-awake counter, which counts
//! awake frames and wraps to zero every `blink_period` frames.

use log::debug;

use crate::config::{BlinkCue, EyeConfig};
use crate::hal::Display;
use crate::types::{Color, EyeSide};

// ── Eye ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Eye {
    /// Centre of the eye.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Height being animated toward, cleared once reached.
    pub target: Option<i32>,
}

/// The pupil, derived from its eye at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeBall {
    pub x: i32,
    pub y: i32,
    pub rx: i32,
    pub ry: i32,
}

impl Eye {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            target: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.target.is_none()
    }

    /// Move one step toward the target.
    ///
    /// A step that would pass the target lands on it. The target is cleared
    /// on the frame the heights match.
    pub fn step(&mut self, step: i32) {
        let Some(target) = self.target else {
            return;
        };
        if self.height > target {
            self.height = (self.height - step).max(target);
        } else if self.height < target {
            self.height = (self.height + step).min(target);
        }
        if self.height == target {
            self.target = None;
        }
    }

    /// The pupil is centred in the eye and never taller or wider than the
    /// eye's inner area.
    pub fn ball(&self, ball_width: i32, ball_height: i32) -> EyeBall {
        EyeBall {
            x: self.x,
            y: self.y,
            rx: (ball_width / 2).min(self.width / 2 - 1).max(0),
            ry: (ball_height / 2).min(self.height / 2 - 1).max(0),
        }
    }

    fn render(&self, display: &mut dyn Display, ball_width: i32, ball_height: i32) {
        let left = (self.x as f32 - self.width as f32 / 2.0) as i32;
        let top = (self.y as f32 - self.height as f32 / 2.0) as i32;
        display.draw_rect(left, top, self.width, self.height, Color::WHITE);

        let ball = self.ball(ball_width, ball_height);
        display.draw_ellipse(ball.x, ball.y, ball.rx, ball.ry, Color::WHITE, true, None);
    }
}

// ── Animator ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EyeAnimator {
    left: Eye,
    right: Eye,
    step: i32,
    open_height: i32,
    closed_height: i32,
    ball_width: i32,
    ball_height: i32,
    blink_period: u32,
    script: Vec<BlinkCue>,
    time_awake: u32,
}

impl EyeAnimator {
    /// Both eyes start closed, centred horizontally around `mid_x`.
    pub fn new(config: &EyeConfig, mid_x: i32) -> Self {
        let left_x = mid_x - (config.width + config.spacing) / 2;
        let right_x = left_x + config.width + config.spacing;
        let mut script = config.blink_script.clone();
        script.sort_by_key(|c| c.tick);
        Self {
            left: Eye::new(left_x, config.top, config.width, config.closed_height),
            right: Eye::new(right_x, config.top, config.width, config.closed_height),
            step: config.step,
            open_height: config.height,
            closed_height: config.closed_height,
            ball_width: config.ball_width,
            ball_height: config.ball_height,
            blink_period: config.blink_period,
            script,
            time_awake: 0,
        }
    }

    pub fn left(&self) -> &Eye {
        &self.left
    }

    pub fn right(&self) -> &Eye {
        &self.right
    }

    pub fn eye(&self, side: EyeSide) -> &Eye {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    pub fn time_awake(&self) -> u32 {
        self.time_awake
    }

    pub fn set_target(&mut self, side: EyeSide, height: i32) {
        match side {
            EyeSide::Left => self.left.target = Some(height),
            EyeSide::Right => self.right.target = Some(height),
        }
    }

    /// Target both eyes at the open height.
    pub fn open(&mut self) {
        self.set_target(EyeSide::Left, self.open_height);
        self.set_target(EyeSide::Right, self.open_height);
    }

    /// Target both eyes at the closed height.
    pub fn close(&mut self) {
        self.set_target(EyeSide::Left, self.closed_height);
        self.set_target(EyeSide::Right, self.closed_height);
    }

    /// Count one awake frame and fire any blink cues scheduled for it.
    pub fn advance_awake(&mut self) {
        self.time_awake += 1;
        if self.time_awake >= self.blink_period {
            self.time_awake = 0;
        }
        let now = self.time_awake;
        let start = self.script.partition_point(|c| c.tick < now);
        let end = start + self.script[start..].iter().take_while(|c| c.tick == now).count();
        for i in start..end {
            let cue = self.script[i];
            debug!("blink cue at {now}: {:?} -> {}", cue.eye, cue.height);
            self.set_target(cue.eye, cue.height);
        }
    }

    /// Animate both eyes by one frame.
    pub fn step(&mut self) {
        self.left.step(self.step);
        self.right.step(self.step);
    }

    pub fn render(&self, display: &mut dyn Display) {
        self.left.render(display, self.ball_width, self.ball_height);
        self.right.render(display, self.ball_width, self.ball_height);
    }
}
