//! Collaborator interfaces and their software implementations.
//!
//! The engine never touches hardware. It talks to four traits:
//!
//! | Trait | Firmware back-end | Desktop back-end here |
//! |---|---|---|
//! | [`Display`] | GC9A01 frame buffer over SPI | [`DrawList`] |
//! | [`MotionSensor`] | QMI8658 over I²C | [`crate::sensor::SimulatedSensor`], [`crate::sensor::ReplaySensor`] |
//! | [`BatteryMeter`] | ADC on the VSYS divider | [`crate::battery::SimulatedBattery`] |
//! | [`Backlight`] | PWM on the BL pin | [`LogBacklight`] |
//!
//! All calls are synchronous and unbudgeted: a collaborator that hangs
//! stalls the whole frame loop.

use log::info;

use crate::error::{DisplayError, SensorError};
use crate::types::{Color, MotionSample};

// ── Traits ────────────────────────────────────────────────────────────────────

/// A pixel surface with a handful of primitives.
///
/// Drawing goes to an off-screen buffer; nothing is visible until
/// [`Display::present`] succeeds.
pub trait Display {
    /// Panel size in pixels.
    fn size(&self) -> (i32, i32);

    /// Fill the buffer with black.
    fn clear(&mut self);

    /// Rectangle outline with its top-left corner at (`x`, `y`).
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);

    /// Ellipse centred on (`x`, `y`).
    ///
    /// `quadrant_mask` selects which quarters of the outline are drawn:
    /// bit 0 = upper right, bit 1 = upper left, bit 2 = lower left,
    /// bit 3 = lower right. `None` draws all four.
    #[allow(clippy::too_many_arguments)]
    fn draw_ellipse(
        &mut self,
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Color,
        filled: bool,
        quadrant_mask: Option<u8>,
    );

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);

    /// 8×8 bitmap text with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color);

    /// Flush the buffer to the panel.
    fn present(&mut self) -> Result<(), DisplayError>;
}

/// Source of one six-axis reading per frame.
pub trait MotionSensor {
    fn read_sample(&mut self) -> Result<MotionSample, SensorError>;
}

/// Battery voltage source that knows how to draw its own gauge.
pub trait BatteryMeter {
    /// Cell voltage in volts.
    fn read_voltage(&mut self) -> f32;

    /// Draw the gauge around the panel `center`. The default reads the
    /// voltage and draws the ring of level dots from
    /// [`crate::battery::draw_gauge`].
    fn render(&mut self, display: &mut dyn Display, center: (i32, i32)) {
        let volts = self.read_voltage();
        crate::battery::draw_gauge(display, center, volts);
    }
}

/// Panel backlight.
pub trait Backlight {
    /// PWM duty, 0 (off) to 65535 (full).
    fn set_brightness(&mut self, duty: u16);
}

// ── Recording display ─────────────────────────────────────────────────────────

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { x: i32, y: i32, w: i32, h: i32, color: Color },
    Ellipse {
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Color,
        filled: bool,
        quadrant_mask: Option<u8>,
    },
    Line { x0: i32, y0: i32, x1: i32, y1: i32, color: Color },
    Text { text: String, x: i32, y: i32, color: Color },
}

/// A [`Display`] that records draw calls instead of rasterising them.
///
/// Commands accumulate in a back buffer; [`Display::present`] swaps it into
/// [`DrawList::frame`] so a reader never sees a half-drawn frame.
#[derive(Debug, Clone)]
pub struct DrawList {
    width: i32,
    height: i32,
    pending: Vec<DrawCommand>,
    frame: Vec<DrawCommand>,
    presented: u64,
    /// When set, `present` fails with this message.
    fail_with: Option<String>,
}

impl DrawList {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            pending: Vec::with_capacity(128),
            frame: Vec::with_capacity(128),
            presented: 0,
            fail_with: None,
        }
    }

    /// The last successfully presented frame.
    pub fn frame(&self) -> &[DrawCommand] {
        &self.frame
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Make every later `present` fail, simulating a dead panel.
    pub fn fail_presents(&mut self, reason: impl Into<String>) {
        self.fail_with = Some(reason.into());
    }

    /// Text strings in the last presented frame.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.frame.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Display for DrawList {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.pending.push(DrawCommand::Rect { x, y, w, h, color });
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_ellipse(
        &mut self,
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Color,
        filled: bool,
        quadrant_mask: Option<u8>,
    ) {
        self.pending.push(DrawCommand::Ellipse {
            x,
            y,
            rx,
            ry,
            color,
            filled,
            quadrant_mask,
        });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.pending.push(DrawCommand::Line { x0, y0, x1, y1, color });
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        self.pending.push(DrawCommand::Text {
            text: text.to_owned(),
            x,
            y,
            color,
        });
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if let Some(reason) = &self.fail_with {
            return Err(DisplayError(reason.clone()));
        }
        std::mem::swap(&mut self.frame, &mut self.pending);
        self.pending.clear();
        self.presented += 1;
        Ok(())
    }
}

// ── Backlight ─────────────────────────────────────────────────────────────────

/// A [`Backlight`] that logs duty changes and remembers the last one.
#[derive(Debug, Default)]
pub struct LogBacklight {
    duty: Option<u16>,
}

impl LogBacklight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duty(&self) -> Option<u16> {
        self.duty
    }
}

impl Backlight for LogBacklight {
    fn set_brightness(&mut self, duty: u16) {
        if self.duty != Some(duty) {
            info!("backlight duty {duty}");
        }
        self.duty = Some(duty);
    }
}
