//! De-esser: sidechain band splitter plus a hysteresis latch.
//!
//! The pre-delay signal is split by a resonant RC filter at 1 kHz into a low and
//! a high band; each band gets its own round-robin peak tracker. Sibilance shows
//! up as high-band energy dominating the low band:
//!
//! ```text
//! inactive ─► active    when high·bias > low·4/3
//! active   ─► inactive  when high·bias < low·3/4
//! ```
//!
//! The gap between 4/3 and 3/4 keeps the latch from toggling on every sibilant
//! transition. While active the target gain is scaled by the attenuation factor.
//!
//! # Parameters
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | Bias | 0.35 | Weight applied to the high band |
//! | Attenuation | 0.5 | Gain multiplier while active (-6 dB) |

use vocalis_core::{RcCoefficients, RcState, RoundRobinPeak, db6_to_linear};

const SIDECHAIN_HZ: f32 = 1000.0;
const SIDECHAIN_Q: f32 = 1.0;
const ENGAGE_RATIO: f32 = 1.333_333_3;
const RELEASE_RATIO: f32 = 0.75;

/// De-esser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeEsserState {
    /// No sibilance detected.
    #[default]
    Inactive,
    /// Attenuating sibilance.
    Active,
}

/// Sibilance detector and latch.
#[derive(Debug, Clone)]
pub struct DeEsser {
    bias: f32,
    attenuation: f32,
    sidechain_coeffs: RcCoefficients,
    sidechain: RcState,
    high: RoundRobinPeak,
    low: RoundRobinPeak,
    state: DeEsserState,
}

impl DeEsser {
    /// De-esser with the default sidechain and thresholds.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            bias: 0.35,
            attenuation: 0.5,
            sidechain_coeffs: RcCoefficients::new(SIDECHAIN_HZ, SIDECHAIN_Q, sample_rate),
            sidechain: RcState::default(),
            high: RoundRobinPeak::default(),
            low: RoundRobinPeak::default(),
            state: DeEsserState::Inactive,
        }
    }

    /// Set the high-band bias (linear, not negative).
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias.max(0.0);
    }

    /// Set the attenuation in dB (6 dB/doubling scale).
    pub fn set_attenuation_db(&mut self, db: f32) {
        self.attenuation = db6_to_linear(db);
    }

    /// Split `input`, track both bands with the shared reset pattern and
    /// return the gain multiplier.
    #[inline]
    pub fn update(&mut self, due: [bool; 4], input: f32) -> f32 {
        let (low, high) = self.sidechain.band_split(&self.sidechain_coeffs, input);
        let high = self.high.process(due, high);
        let low = self.low.process(due, low);
        self.latch(high, low)
    }

    /// Update the latch from band levels (`high` before bias) and return the
    /// gain multiplier. Inside the hysteresis band the state is held.
    #[inline]
    pub fn latch(&mut self, high: f32, low: f32) -> f32 {
        let high = high * self.bias;
        if high > low * ENGAGE_RATIO {
            self.state = DeEsserState::Active;
        }
        if high < low * RELEASE_RATIO {
            self.state = DeEsserState::Inactive;
        }
        self.multiplier()
    }

    /// Gain multiplier for the current state.
    #[inline]
    pub fn multiplier(&self) -> f32 {
        match self.state {
            DeEsserState::Inactive => 1.0,
            DeEsserState::Active => self.attenuation,
        }
    }

    /// Current state.
    pub fn state(&self) -> DeEsserState {
        self.state
    }

    /// High-band bias.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Attenuation while active, linear.
    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }

    /// Latest (high, low) band levels, before bias.
    pub fn band_levels(&self) -> (f32, f32) {
        (self.high.level(), self.low.level())
    }
}
