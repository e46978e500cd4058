//! Noise gate latch.
//!
//! A two-state hysteresis latch on the envelope level. The gate closes when the
//! level falls below the onset threshold and opens again only once it rises above
//! the offset threshold, which sits marginally higher so a level parked on one
//! boundary cannot chatter. While closed the target gain is scaled by the
//! attenuation factor; the gain ramp turns that into a smooth fade.
//!
//! # Parameters
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | Onset | 0.1 | Level below which the gate closes |
//! | Offset | 0.1001 | Level above which the gate opens |
//! | Attenuation | 0.5 | Gain multiplier while closed (-6 dB) |

use vocalis_core::db6_to_linear;

/// Gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Signal present, no attenuation.
    #[default]
    Open,
    /// Below threshold, attenuating.
    Closed,
}

/// Noise gate hysteresis latch.
#[derive(Debug, Clone)]
pub struct NoiseGate {
    onset: f32,
    offset: f32,
    attenuation: f32,
    state: GateState,
}

impl NoiseGate {
    /// Gate with the default thresholds.
    pub fn new() -> Self {
        Self {
            onset: 0.1,
            offset: 0.1001,
            attenuation: 0.5,
            state: GateState::Open,
        }
    }

    /// Place the thresholds 1 dB either side of `threshold_db` (6 dB/doubling scale).
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.onset = db6_to_linear(threshold_db - 1.0);
        self.offset = db6_to_linear(threshold_db + 1.0);
    }

    /// Set explicit linear thresholds; `offset` is raised to `onset` if lower.
    pub fn set_thresholds(&mut self, onset: f32, offset: f32) {
        self.onset = onset;
        self.offset = offset.max(onset);
    }

    /// Set the closed-gate attenuation in dB (6 dB/doubling scale).
    pub fn set_attenuation_db(&mut self, db: f32) {
        self.attenuation = db6_to_linear(db);
    }

    /// Feed the current level and return the gain multiplier.
    #[inline]
    pub fn update(&mut self, level: f32) -> f32 {
        if level < self.onset {
            self.state = GateState::Closed;
        }
        if level > self.offset {
            self.state = GateState::Open;
        }
        self.multiplier()
    }

    /// Gain multiplier for the current state.
    #[inline]
    pub fn multiplier(&self) -> f32 {
        match self.state {
            GateState::Open => 1.0,
            GateState::Closed => self.attenuation,
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Onset (closing) threshold, linear.
    pub fn onset(&self) -> f32 {
        self.onset
    }

    /// Offset (opening) threshold, linear.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Attenuation while closed, linear.
    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self::new()
    }
}
