use crate::error::SensorError;

/// Number of axes in one fused motion reading.
pub const AXES: usize = 6;

/// Axis labels in [`MotionSample::axes`] order.
pub const AXIS_NAMES: [&str; AXES] = ["ax", "ay", "az", "gx", "gy", "gz"];

/// One fused six-axis reading, produced fresh every frame.
///
/// | Index | Axis | Unit |
/// |---|---|---|
/// | 0–2 | accelerometer x/y/z | g |
/// | 3–5 | gyroscope x/y/z | °/s |
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    pub axes: [f32; AXES],
}

impl MotionSample {
    pub const fn new(axes: [f32; AXES]) -> Self {
        Self { axes }
    }

    /// Build a sample from a driver-provided slice.
    ///
    /// A slice of any length other than [`AXES`] is a garbled read and is
    /// reported as [`SensorError::Garbled`], which the frame loop treats as
    /// transient.
    pub fn from_slice(values: &[f32]) -> Result<Self, SensorError> {
        let axes: [f32; AXES] = values.try_into().map_err(|_| SensorError::Garbled {
            expected: AXES,
            got: values.len(),
        })?;
        Ok(Self { axes })
    }

    /// Return a copy with `offsets` added axis by axis.
    ///
    /// Used to remove the 1 g gravity component from the first accelerometer
    /// axis before any threshold test.
    pub fn offset_by(&self, offsets: &[f32; AXES]) -> Self {
        let mut axes = self.axes;
        for (v, o) in axes.iter_mut().zip(offsets) {
            *v += o;
        }
        Self { axes }
    }

    #[inline]
    pub fn axis(&self, i: usize) -> f32 {
        self.axes[i]
    }
}

/// Discrete alertness of the creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertnessState {
    #[default]
    Sleeping,
    Awake,
}

impl AlertnessState {
    pub fn is_awake(self) -> bool {
        self == Self::Awake
    }
}

/// Which of the two sensor visualisations is drawn while awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Vertical gauge per axis with min/max ticks and a current-value dot.
    Bars,
    /// Scrolling polyline per axis.
    Graph,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Bars => Self::Graph,
            Self::Graph => Self::Bars,
        }
    }
}

/// Left or right eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    Left,
    Right,
}

/// A panel colour in the panel's native 16-bit encoding.
///
/// The round 240×240 panel takes RGB565 with the two bytes swapped, which is
/// why the palette constants look scrambled: `RED` is `0x07E0`, not `0xF800`.
/// [`Color::rgb`] undoes the swap for desktop back-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u16);

impl Color {
    pub const BLACK: Color = Color(0x0000);
    pub const WHITE: Color = Color(0xFFFF);
    pub const RED: Color = Color(0x07E0);
    pub const GREEN: Color = Color(0x001F);
    pub const BLUE: Color = Color(0xF800);
    pub const YELLOW: Color = Color(0x00FF);
    pub const PURPLE: Color = Color(0xFFE0);
    pub const GREY: Color = Color(0x9999);

    /// Heart ring between beats.
    pub const HEART_DIM: Color = Color(0x0030);

    /// Battery gauge levels.
    pub const BATTERY_LOW: Color = Color(0x00F0);
    pub const BATTERY_MID: Color = Color(0x00FF);
    pub const BATTERY_HIGH: Color = Color(0x000F);

    /// Decode to 8-bit-per-channel RGB.
    pub fn rgb(self) -> (u8, u8, u8) {
        let v = self.0.swap_bytes();
        let r5 = (v >> 11) & 0x1F;
        let g6 = (v >> 5) & 0x3F;
        let b5 = v & 0x1F;
        (
            ((r5 << 3) | (r5 >> 2)) as u8,
            ((g6 << 2) | (g6 >> 4)) as u8,
            ((b5 << 3) | (b5 >> 2)) as u8,
        )
    }
}
