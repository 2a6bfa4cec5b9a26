//! The drifting "Z" drawn above the right eye while the creature sleeps.
//!
//! The glyph climbs through three positions, five frames each, then starts
//! over at the bottom:
//!
//! | Steps | Position (relative to the eye line) |
//! |---|---|
//! | 0–4 | (150, top − 20) |
//! | 5–9 | (155, top − 30) |
//! | 10–14 | (160, top − 40) |

use crate::hal::Display;
use crate::types::Color;

/// Frames spent at each position.
const STEPS_PER_POSITION: u32 = 5;

/// `(x, rise above the eye line)` for each position, bottom first.
const POSITIONS: [(i32, i32); 3] = [(150, 20), (155, 30), (160, 40)];

const PHASES: u32 = STEPS_PER_POSITION * POSITIONS.len() as u32;

#[derive(Debug, Clone)]
pub struct SnoozeIndicator {
    eye_top: i32,
    phase: u32,
}

impl SnoozeIndicator {
    pub fn new(eye_top: i32) -> Self {
        Self { eye_top, phase: 0 }
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Advance one sleeping frame.
    pub fn advance(&mut self) {
        self.phase = (self.phase + 1) % PHASES;
    }

    /// Where the glyph sits for the current phase.
    pub fn position(&self) -> (i32, i32) {
        let (x, rise) = POSITIONS[(self.phase / STEPS_PER_POSITION) as usize];
        (x, self.eye_top - rise)
    }

    pub fn render(&self, display: &mut dyn Display) {
        let (x, y) = self.position();
        display.draw_text("Z", x, y, Color::WHITE);
    }
}
