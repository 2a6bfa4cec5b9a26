//! Simulated heartbeat: a bounded rate that tenses on activity and relaxes
//! toward a resting baseline, plus the on/off beat phase it drives.
//!
//! The beat indicator is three concentric ring outlines around the screen
//! centre. On each beat the ring lights up and the set of drawn quadrants
//! rotates (8 → 4 → 2 → 1 → 8), so the ring appears to spin rather than pulse.

use crate::config::{HeartConfig, RelaxMode};
use crate::hal::Display;
use crate::types::Color;

/// Counter value after a beat starts; the ring stays lit while negative.
const LEAD_IN: i32 = -3;

/// First (and wrap-around) quadrant mask.
const FULL_QUADRANT: u8 = 8;

/// What the renderer needs to draw one frame of the heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartView {
    pub color: Color,
    pub quadrant_mask: u8,
    pub radii: [i32; 3],
}

#[derive(Debug, Clone)]
pub struct HeartRateModel {
    resting_rate: f32,
    max_rate: f32,
    fps: f32,
    relax_mode: RelaxMode,
    radii: [i32; 3],
    rate: f32,
    counter: i32,
    quadrant: u8,
    on_beat: bool,
}

impl HeartRateModel {
    pub fn new(config: &HeartConfig, fps: u32) -> Self {
        Self {
            resting_rate: config.resting_rate,
            max_rate: config.max_rate,
            fps: fps as f32,
            relax_mode: config.relax_mode,
            radii: config.ring_radii,
            rate: config.resting_rate,
            counter: 0,
            quadrant: FULL_QUADRANT,
            on_beat: false,
        }
    }

    /// Current rate in beats per minute.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn resting_rate(&self) -> f32 {
        self.resting_rate
    }

    /// `true` once the rate has come back down to (or below) resting.
    pub fn is_rested(&self) -> bool {
        self.rate <= self.resting_rate
    }

    pub fn is_on_beat(&self) -> bool {
        self.on_beat
    }

    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    /// Raise the rate by `amount`, never past the maximum.
    pub fn tension(&mut self, amount: f32) {
        self.rate = (self.rate + amount).min(self.max_rate);
    }

    /// Pull the rate toward resting.
    ///
    /// Above resting the rate drops by `amount`; below it, it climbs by one.
    /// In [`RelaxMode::Clamped`] neither direction crosses the resting rate.
    /// In [`RelaxMode::Unclamped`] a drop larger than the remaining gap
    /// overshoots below resting and is then recovered one unit per call.
    pub fn relax(&mut self, amount: f32) {
        if self.rate > self.resting_rate {
            self.rate -= amount;
            if self.relax_mode == RelaxMode::Clamped {
                self.rate = self.rate.max(self.resting_rate);
            }
        } else if self.rate < self.resting_rate {
            self.rate += 1.0;
            if self.relax_mode == RelaxMode::Clamped {
                self.rate = self.rate.min(self.resting_rate);
            }
        }
    }

    /// Advance the beat counter by one frame and recompute the phase.
    ///
    /// The ring is lit while the counter is negative (the lead-in after a
    /// beat) or once more than one beat period (`60 / rate` seconds) has
    /// elapsed. Entering a beat from a positive count restarts the lead-in
    /// and rotates the quadrant mask.
    pub fn beat(&mut self) -> bool {
        self.counter += 1;
        let period_secs = 60.0 / self.rate;
        self.on_beat = self.counter < 0 || self.counter as f32 / self.fps > period_secs;
        if self.on_beat && self.counter > 0 {
            self.quadrant /= 2;
            if self.quadrant < 1 {
                self.quadrant = FULL_QUADRANT;
            }
            self.counter = LEAD_IN;
        }
        self.on_beat
    }

    pub fn view(&self) -> HeartView {
        HeartView {
            color: if self.on_beat { Color::WHITE } else { Color::HEART_DIM },
            quadrant_mask: self.quadrant,
            radii: self.radii,
        }
    }

    /// Draw the ring around (`cx`, `cy`).
    pub fn render(&self, display: &mut dyn Display, cx: i32, cy: i32) {
        let view = self.view();
        for r in view.radii {
            display.draw_ellipse(cx, cy, r, r, view.color, false, Some(view.quadrant_mask));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{DrawCommand, DrawList};

    fn heart(mode: RelaxMode) -> HeartRateModel {
        let config = HeartConfig {
            relax_mode: mode,
            ..HeartConfig::default()
        };
        HeartRateModel::new(&config, 20)
    }

    #[test]
    fn test_tension_adds_amount() {
        let mut h = heart(RelaxMode::Clamped);
        h.tension(5.0);
        assert_eq!(h.rate(), 105.0);
    }

    #[test]
    fn test_tension_clamps_at_max() {
        let mut h = heart(RelaxMode::Clamped);
        h.tension(198.0);
        assert_eq!(h.rate(), 298.0);
        h.tension(5.0);
        assert_eq!(h.rate(), 300.0);
    }

    #[test]
    fn test_clamped_relax_stops_at_resting() {
        let mut h = heart(RelaxMode::Clamped);
        h.tension(3.0);
        h.relax(5.0);
        assert_eq!(h.rate(), 100.0);
        h.relax(5.0);
        assert_eq!(h.rate(), 100.0);
        assert!(h.is_rested());
    }

    #[test]
    fn test_unclamped_relax_overshoots_then_climbs() {
        let mut h = heart(RelaxMode::Unclamped);
        h.tension(3.0);
        h.relax(5.0);
        assert_eq!(h.rate(), 98.0);
        assert!(h.is_rested());
        h.relax(5.0);
        assert_eq!(h.rate(), 99.0);
        h.relax(5.0);
        assert_eq!(h.rate(), 100.0);
        h.relax(5.0);
        assert_eq!(h.rate(), 100.0);
    }

    #[test]
    fn test_clamped_rate_stays_in_bounds() {
        let mut h = heart(RelaxMode::Clamped);
        // Deterministic LCG so the mix of calls is reproducible.
        let mut seed: u32 = 0x2545_F491;
        for _ in 0..10_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let amount = (seed >> 24) as f32 / 16.0;
            if seed & 1 == 0 {
                h.tension(amount);
            } else {
                h.relax(amount);
            }
            assert!((100.0..=300.0).contains(&h.rate()), "rate {} escaped", h.rate());
        }
    }

    #[test]
    fn test_beat_period_at_resting_rate() {
        // 100 bpm at 20 fps: a beat lights once the counter passes 12.
        let mut h = heart(RelaxMode::Clamped);
        let phases: Vec<bool> = (0..17).map(|_| h.beat()).collect();
        assert!(phases[..12].iter().all(|&on| !on));
        assert!(phases[12]);
        // Lead-in keeps the ring lit for two more frames, then it goes dark.
        assert!(phases[13] && phases[14]);
        assert!(!phases[15] && !phases[16]);
    }

    #[test]
    fn test_faster_rate_beats_more_often() {
        let count = |extra: f32| {
            let mut h = heart(RelaxMode::Clamped);
            h.tension(extra);
            let mut beats = 0;
            let mut was_on = false;
            for _ in 0..160 {
                let on = h.beat();
                if on && !was_on {
                    beats += 1;
                }
                was_on = on;
            }
            beats
        };
        assert_eq!(count(0.0), 10);
        assert_eq!(count(200.0), 20);
    }

    #[test]
    fn test_quadrant_rotates_each_beat() {
        let mut h = heart(RelaxMode::Clamped);
        let mut masks = vec![];
        for _ in 0..80 {
            let was = h.quadrant();
            h.beat();
            if h.quadrant() != was {
                masks.push(h.quadrant());
            }
        }
        assert_eq!(masks, [4, 2, 1, 8, 4]);
    }

    #[test]
    fn test_render_draws_three_masked_rings() {
        let mut h = heart(RelaxMode::Clamped);
        for _ in 0..13 {
            h.beat();
        }
        let mut d = DrawList::new(240, 240);
        h.render(&mut d, 120, 120);
        d.present().unwrap();
        let rings: Vec<_> = d
            .frame()
            .iter()
            .map(|c| match c {
                DrawCommand::Ellipse { rx, color, quadrant_mask, filled, .. } => {
                    assert!(!filled);
                    (*rx, *color, *quadrant_mask)
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            rings,
            [
                (118, Color::WHITE, Some(4)),
                (119, Color::WHITE, Some(4)),
                (120, Color::WHITE, Some(4)),
            ]
        );
    }
}
