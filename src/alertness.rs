//! Sleeping/Awake state machine.
//!
//! ```text
//!            any axis over its threshold
//!   Sleeping ───────────────────────────▶ Awake
//!      ▲                                   │
//!      └───────────────────────────────────┘
//!       boredom > boredom_max and heart rested
//! ```
//!
//! Boredom counts awake frames without activity. Any active frame zeroes it,
//! whatever the state. The machine only decides; the engine applies the side
//! effects (eyes, extents, backlight, heart tension).

use log::info;

use crate::config::{AlertnessConfig, AxisThreshold};
use crate::types::{AlertnessState, MotionSample, AXES};

/// A state change produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Woke,
    FellAsleep,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// The sample crossed at least one activation threshold.
    pub active: bool,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone)]
pub struct AlertnessStateMachine {
    state: AlertnessState,
    boredom: u32,
    boredom_max: u32,
    thresholds: [AxisThreshold; AXES],
}

impl AlertnessStateMachine {
    pub fn new(config: &AlertnessConfig) -> Self {
        Self {
            state: AlertnessState::Sleeping,
            boredom: 0,
            boredom_max: config.boredom_max,
            thresholds: config.thresholds,
        }
    }

    pub fn state(&self) -> AlertnessState {
        self.state
    }

    pub fn boredom(&self) -> u32 {
        self.boredom
    }

    /// `true` when any axis of `sample` exceeds its threshold.
    pub fn is_active(&self, sample: &MotionSample) -> bool {
        self.thresholds
            .iter()
            .zip(sample.axes)
            .any(|(t, v)| t.exceeded_by(v))
    }

    /// Advance one frame.
    ///
    /// `heart_rested` is whether the heart rate has returned to resting;
    /// the creature will not doze off with a racing heart.
    pub fn evaluate(&mut self, sample: &MotionSample, heart_rested: bool) -> Evaluation {
        if self.state.is_awake() {
            self.boredom += 1;
        }

        let active = self.is_active(sample);
        let mut transition = None;
        if active {
            if self.state == AlertnessState::Sleeping {
                info!("woke up: {:?}", sample.axes);
                self.state = AlertnessState::Awake;
                transition = Some(Transition::Woke);
            }
            self.boredom = 0;
        }

        if self.boredom > self.boredom_max && heart_rested {
            info!("bored after {} quiet frames, going to sleep", self.boredom);
            self.state = AlertnessState::Sleeping;
            self.boredom = 0;
            transition = Some(Transition::FellAsleep);
        }

        Evaluation { active, transition }
    }

    #[cfg(test)]
    pub(crate) fn force(&mut self, state: AlertnessState, boredom: u32) {
        self.state = state;
        self.boredom = boredom;
    }
}
