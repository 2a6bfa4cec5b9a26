//! Battery gauge: ADC conversion, the five-dot level ring, and a simulated
//! cell for desktop runs.
//!
//! The dots sit on the lower arc of the round panel, spanning 160° to 200°
//! clockwise from 12 o'clock:
//!
//! | Dot | Lights above | Angle slot (of 36) |
//! |---|---|---|
//! | 0 | 3.50 V | 16 |
//! | 1 | 3.65 V | 17 |
//! | 2 | 3.80 V | 18 |
//! | 3 | 3.95 V | 19 |
//! | 4 | 4.05 V | 20 |
//!
//! All dots share one colour picked from the reading: green above 3.95 V,
//! yellow above 3.65 V, red otherwise.

use std::f64::consts::PI;

use log::debug;

use crate::hal::{BatteryMeter, Display};
use crate::types::Color;

/// Voltage each dot stands for, lowest first.
pub const BATTERY_LEVELS: [f32; 5] = [3.5, 3.65, 3.8, 3.95, 4.05];

/// ADC reference voltage.
const ADC_VREF: f32 = 3.3;

/// The sense divider halves VSYS before it reaches the ADC pin.
const DIVIDER: f32 = 2.0;

/// Angular resolution of the dot ring.
const INTERVALS: f64 = 36.0;

/// First angular slot used.
const FIRST_SLOT: usize = 16;

/// Ring radius from the panel centre.
const DISTANCE: f64 = 113.0;

const MASK_RADIUS: i32 = 20;
const DOT_RADIUS: i32 = 5;

/// Top-left corner of the voltage label.
const LABEL_POS: (i32, i32) = (100, 210);

/// Convert a 16-bit ADC reading of the sense pin into cell volts.
pub fn adc_to_voltage(raw: u16) -> f32 {
    raw as f32 * ADC_VREF / u16::MAX as f32 * DIVIDER
}

fn voltage_to_adc(volts: f32) -> u16 {
    (volts / DIVIDER / ADC_VREF * u16::MAX as f32).clamp(0.0, u16::MAX as f32) as u16
}

/// Colour shared by every dot for a reading of `volts`.
pub fn level_color(volts: f32) -> Color {
    if volts > BATTERY_LEVELS[3] {
        Color::BATTERY_HIGH
    } else if volts > BATTERY_LEVELS[1] {
        Color::BATTERY_MID
    } else {
        Color::BATTERY_LOW
    }
}

/// Centre of dot `index` on a panel whose centre is (`cx`, `cy`).
fn dot_center(cx: i32, cy: i32, index: usize) -> (i32, i32) {
    let slot = (FIRST_SLOT + index) as f64;
    let angle = 2.0 * PI * (slot / INTERVALS) - PI / 2.0;
    (
        (cx as f64 + angle.cos() * DISTANCE) as i32,
        (cy as f64 + angle.sin() * DISTANCE) as i32,
    )
}

/// Draw the gauge for `volts` on the arc around (`cx`, `cy`).
///
/// Black discs go down first so the heart rings never show through a dot.
pub fn draw_gauge(display: &mut dyn Display, (cx, cy): (i32, i32), volts: f32) {
    let color = level_color(volts);

    for index in 0..BATTERY_LEVELS.len() {
        let (x, y) = dot_center(cx, cy, index);
        display.draw_ellipse(x, y, MASK_RADIUS, MASK_RADIUS, Color::BLACK, true, None);
    }
    for (index, &level) in BATTERY_LEVELS.iter().enumerate() {
        let (x, y) = dot_center(cx, cy, index);
        display.draw_ellipse(x, y, DOT_RADIUS, DOT_RADIUS, color, level < volts, None);
    }

    display.draw_text(&format!("{volts:.2}v"), LABEL_POS.0, LABEL_POS.1, Color::WHITE);
}

// ── Simulated cell ────────────────────────────────────────────────────────────

/// A cell that drains linearly with every reading, down to a floor.
///
/// Readings go through the same 16-bit ADC quantisation as the board, so
/// the gauge sees realistic values like `4.09v` rather than exact decimals.
#[derive(Debug, Clone)]
pub struct SimulatedBattery {
    volts: f32,
    drain_per_read: f32,
    floor: f32,
}

impl SimulatedBattery {
    pub fn new(volts: f32, drain_per_read: f32) -> Self {
        Self {
            volts,
            drain_per_read,
            floor: 3.3,
        }
    }

    /// A fresh cell that takes roughly an hour of 20 fps frames to go flat.
    pub fn full() -> Self {
        Self::new(4.15, 0.85 / (20.0 * 3600.0))
    }
}

impl Default for SimulatedBattery {
    fn default() -> Self {
        Self::full()
    }
}

impl BatteryMeter for SimulatedBattery {
    fn read_voltage(&mut self) -> f32 {
        let raw = voltage_to_adc(self.volts);
        self.volts = (self.volts - self.drain_per_read).max(self.floor);
        let volts = adc_to_voltage(raw);
        debug!("battery adc {raw} -> {volts:.3} V");
        volts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{DrawCommand, DrawList};

    #[test]
    fn test_adc_conversion_uses_divider() {
        assert_eq!(adc_to_voltage(0), 0.0);
        assert!((adc_to_voltage(u16::MAX) - 6.6).abs() < 1e-4);
        assert!((adc_to_voltage(32768) - 3.3).abs() < 1e-3);
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(level_color(4.2), Color::BATTERY_HIGH);
        assert_eq!(level_color(3.95), Color::BATTERY_MID);
        assert_eq!(level_color(3.7), Color::BATTERY_MID);
        assert_eq!(level_color(3.65), Color::BATTERY_LOW);
        assert_eq!(level_color(3.0), Color::BATTERY_LOW);
    }

    #[test]
    fn test_dot_positions_on_lower_arc() {
        assert_eq!(dot_center(120, 120, 0), (158, 226));
        assert_eq!(dot_center(120, 120, 2), (120, 233));
        assert_eq!(dot_center(120, 120, 4), (81, 226));
    }

    #[test]
    fn test_gauge_masks_then_fills_by_level() {
        let mut d = DrawList::new(240, 240);
        draw_gauge(&mut d, (120, 120), 4.0);
        d.present().unwrap();

        let ellipses: Vec<(i32, Color, bool)> = d
            .frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Ellipse { rx, color, filled, .. } => Some((*rx, *color, *filled)),
                _ => None,
            })
            .collect();
        assert_eq!(ellipses.len(), 10);
        assert!(ellipses[..5].iter().all(|&e| e == (20, Color::BLACK, true)));
        let fills: Vec<bool> = ellipses[5..].iter().map(|e| e.2).collect();
        assert_eq!(fills, [true, true, true, true, false]);
        assert!(ellipses[5..].iter().all(|e| e.1 == Color::BATTERY_HIGH));
        assert_eq!(d.texts().collect::<Vec<_>>(), ["4.00v"]);
    }

    #[test]
    fn test_simulated_battery_drains_to_floor() {
        let mut b = SimulatedBattery::new(3.4, 0.05);
        let first = b.read_voltage();
        assert!((first - 3.4).abs() < 1e-3);
        let second = b.read_voltage();
        assert!(second < first);
        for _ in 0..10 {
            b.read_voltage();
        }
        assert!((b.read_voltage() - 3.3).abs() < 1e-3);
    }

    #[test]
    fn test_default_render_reads_and_draws() {
        let mut b = SimulatedBattery::full();
        let mut d = DrawList::new(240, 240);
        b.render(&mut d, (120, 120));
        d.present().unwrap();
        assert_eq!(d.texts().collect::<Vec<_>>(), ["4.15v"]);
    }
}
