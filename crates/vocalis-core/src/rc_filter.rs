//! Analog RC filter emulation: one coefficient set, several topologies.
//!
//! Every filter in the AGC path is built from the same one-pole RC pair. For a
//! cutoff `f`, sample period `dt = 1/sample_rate` and `RC = 1/(2πf)`:
//!
//! ```text
//! a = 1 - dt / (RC + dt)      leaky integrator feedback
//! b = 1 - a                   leaky integrator input
//! c = RC / (RC + dt)          differentiator (complementary highpass)
//! ```
//!
//! The integrator (`lp = a·lp + b·x`) is the lowpass, the differentiator
//! (`hp = c·(hp + x - x[n-1])`) is the highpass, and feeding the band-pass
//! integrator back into the input gives the resonant 12 dB/oct section.
//!
//! Coefficients live in [`RcCoefficients`] and are recomputed only when a
//! parameter changes. Running accumulators live in [`RcState`], one per filter
//! instance; a state never reads another filter's accumulators.
//!
//! # Topologies
//!
//! | Method | Slope | Output |
//! |--------|-------|--------|
//! | [`RcState::highpass_12db`] | 12 dB/oct | resonant highpass |
//! | [`RcState::highpass_6db`] | 6 dB/oct | `x + detail·hp` (shelf) |
//! | [`RcState::lowpass_6db`] | 6 dB/oct | `x + detail·lp` (shelf) |
//! | [`RcState::phase_rotate`] | allpass-like | `lp - hp` |
//! | [`RcState::band_split`] | 6 dB/oct | `(low, high)` detector pair |
//!
//! # Usage
//!
//! ```rust
//! use vocalis_core::{RcCoefficients, RcState};
//!
//! let coeffs = RcCoefficients::new(100.0, 0.375, 48000.0);
//! let mut hp = RcState::default();
//!
//! // DC is removed by the highpass
//! let mut out = 0.0;
//! for _ in 0..48000 {
//!     out = hp.highpass_12db(&coeffs, 1.0);
//! }
//! assert!(out.abs() < 1e-3);
//! ```

use crate::flush_denormal;
use core::f32::consts::TAU;

/// Lowest cutoff accepted by [`RcCoefficients::new`], in Hz.
pub const MIN_CUTOFF_HZ: f32 = 1.0;

/// Coefficient set for one RC filter.
///
/// # Invariants
///
/// - `a` and `c` are in (0, 1); `a + b == 1`
/// - `freq` is clamped to `[MIN_CUTOFF_HZ, sample_rate / 2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcCoefficients {
    a: f32,
    b: f32,
    c: f32,
    q: f32,
    freq: f32,
}

impl RcCoefficients {
    /// Derive coefficients from a cutoff frequency, a resonance and the sample rate.
    ///
    /// # Arguments
    ///
    /// * `freq_hz` - Cutoff in Hz, clamped to `[1, sample_rate / 2]`
    /// * `q` - Band-pass feedback amount; only the resonant topologies use it
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(freq_hz: f32, q: f32, sample_rate: f32) -> Self {
        let nyquist = (sample_rate * 0.5).max(MIN_CUTOFF_HZ);
        let freq = if freq_hz.is_finite() {
            freq_hz.clamp(MIN_CUTOFF_HZ, nyquist)
        } else {
            nyquist
        };
        let q = if q.is_finite() { q } else { 0.0 };

        let rc = 1.0 / (TAU * freq);
        let dt = 1.0 / sample_rate;
        let a = 1.0 - dt / (rc + dt);

        Self {
            a,
            b: 1.0 - a,
            c: rc / (rc + dt),
            q,
            freq,
        }
    }

    /// Integrator feedback coefficient.
    #[inline]
    pub fn a(&self) -> f32 {
        self.a
    }

    /// Integrator input coefficient (`1 - a`).
    #[inline]
    pub fn b(&self) -> f32 {
        self.b
    }

    /// Differentiator coefficient.
    #[inline]
    pub fn c(&self) -> f32 {
        self.c
    }

    /// Resonance feedback amount.
    #[inline]
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Cutoff frequency after clamping, in Hz.
    #[inline]
    pub fn freq(&self) -> f32 {
        self.freq
    }
}

/// Running accumulators of one RC filter instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RcState {
    last_in: f32,
    lp: f32,
    bp: f32,
    hp: f32,
}

impl RcState {
    /// Resonant 12 dB/oct highpass section.
    ///
    /// The band-pass integrator is fed back into the input scaled by `q`,
    /// then the differentiator and integrator run in series.
    #[inline]
    pub fn highpass_12db(&mut self, k: &RcCoefficients, input: f32) -> f32 {
        let x = input + k.q * self.bp;
        self.hp = flush_denormal(k.c * (self.hp + x - self.last_in));
        self.bp = flush_denormal(self.bp * k.a + self.hp * k.b);
        self.last_in = x;
        self.hp
    }

    /// 6 dB/oct highpass mixed onto the dry signal: `x + detail·hp`.
    #[inline]
    pub fn highpass_6db(&mut self, k: &RcCoefficients, input: f32, detail: f32) -> f32 {
        self.hp = flush_denormal(k.c * (self.hp + input - self.last_in));
        self.last_in = input;
        input + self.hp * detail
    }

    /// 6 dB/oct lowpass mixed onto the dry signal: `x + detail·lp`.
    #[inline]
    pub fn lowpass_6db(&mut self, k: &RcCoefficients, input: f32, detail: f32) -> f32 {
        self.lp = flush_denormal(self.lp * k.a + input * k.b);
        input + self.lp * detail
    }

    /// One phase-rotator section: lowpass minus highpass of the same RC pair.
    ///
    /// Magnitude stays close to flat while the phase turns through 180° around
    /// the cutoff, which spreads asymmetric vocal peaks before limiting.
    #[inline]
    pub fn phase_rotate(&mut self, k: &RcCoefficients, input: f32) -> f32 {
        self.hp = flush_denormal(k.c * (self.hp + input - self.last_in));
        self.lp = flush_denormal(self.lp * k.a + input * k.b);
        self.last_in = input;
        self.lp - self.hp
    }

    /// Resonant band splitter for sibilance detection. Returns `(low, high)`.
    ///
    /// The lowpass sees the resonance-boosted input while the highpass
    /// differentiates the raw input against the previous boosted value. Only
    /// the relative energy of the two bands matters to the detector.
    #[inline]
    pub fn band_split(&mut self, k: &RcCoefficients, input: f32) -> (f32, f32) {
        let boosted = input + k.q * self.bp;
        self.lp = flush_denormal(self.lp * k.a + boosted * k.b);
        self.hp = flush_denormal(k.c * (self.hp + input - self.last_in));
        self.bp = flush_denormal(self.bp * k.a + self.hp * k.b);
        self.last_in = boosted;
        (self.lp, self.hp)
    }

    /// Reset all accumulators to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
