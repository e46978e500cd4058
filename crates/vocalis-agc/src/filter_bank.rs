//! Main-path filter chain: subsonic bank, detail shelves, phase rotator.
//!
//! Settings and running state are split. [`FilterSettings`] holds the
//! coefficient sets and switches, and is the part a stereo host lends to its
//! delegated partner. [`FilterBank`] holds the accumulators and always belongs to
//! the channel whose audio flows through it.
//!
//! Per sample, in order:
//!
//! ```text
//! x ─► subsonic HP ×stages ─► HF detail ─► LF detail ─► rotator ×4 (optional) ─► y
//! ```

use vocalis_core::{RcCoefficients, RcState};

/// Maximum number of 12 dB/oct subsonic sections.
pub const MAX_SUBSONIC_STAGES: usize = 4;

/// Number of phase rotator sections.
pub const ROTATOR_STAGES: usize = 4;

const SUBSONIC_Q: f32 = 0.375;
const DETAIL_Q: f32 = 0.375;
const ROTATOR_Q: f32 = 0.0;
const ROTATOR_HZ: f32 = 300.0;

/// Coefficients and switches of the main-path filter chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    sample_rate: f32,
    subsonic: RcCoefficients,
    subsonic_stages: usize,
    hf: RcCoefficients,
    hf_detail: f32,
    lf: RcCoefficients,
    lf_detail: f32,
    rotator: RcCoefficients,
    rotator_enabled: bool,
}

impl FilterSettings {
    /// Default chain: 100 Hz ×4 subsonic, 2 kHz ×4 HF detail, 150 Hz ×4 LF
    /// detail, 300 Hz rotator on.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            subsonic: RcCoefficients::new(100.0, SUBSONIC_Q, sample_rate),
            subsonic_stages: MAX_SUBSONIC_STAGES,
            hf: RcCoefficients::new(2000.0, DETAIL_Q, sample_rate),
            hf_detail: 4.0,
            lf: RcCoefficients::new(150.0, DETAIL_Q, sample_rate),
            lf_detail: 4.0,
            rotator: RcCoefficients::new(ROTATOR_HZ, ROTATOR_Q, sample_rate),
            rotator_enabled: true,
        }
    }

    /// Set the subsonic cutoff shared by every section.
    pub fn set_subsonic_cutoff(&mut self, freq_hz: f32) {
        self.subsonic = RcCoefficients::new(freq_hz, SUBSONIC_Q, self.sample_rate);
    }

    /// Set the number of active subsonic sections, clamped to 1..=4.
    pub fn set_subsonic_stages(&mut self, stages: usize) {
        self.subsonic_stages = stages.clamp(1, MAX_SUBSONIC_STAGES);
    }

    /// Set the HF detail amount.
    pub fn set_hf_detail(&mut self, multi: f32) {
        self.hf_detail = multi;
    }

    /// Set the HF detail cutoff.
    pub fn set_hf_cutoff(&mut self, freq_hz: f32) {
        self.hf = RcCoefficients::new(freq_hz, DETAIL_Q, self.sample_rate);
    }

    /// Set the LF detail amount.
    pub fn set_lf_detail(&mut self, multi: f32) {
        self.lf_detail = multi;
    }

    /// Set the LF detail cutoff.
    pub fn set_lf_cutoff(&mut self, freq_hz: f32) {
        self.lf = RcCoefficients::new(freq_hz, DETAIL_Q, self.sample_rate);
    }

    /// Enable or bypass the phase rotator.
    pub fn set_rotator_enabled(&mut self, enabled: bool) {
        self.rotator_enabled = enabled;
    }

    /// Subsonic cutoff in Hz.
    pub fn subsonic_cutoff(&self) -> f32 {
        self.subsonic.freq()
    }

    /// Active subsonic sections.
    pub fn subsonic_stages(&self) -> usize {
        self.subsonic_stages
    }

    /// HF detail amount.
    pub fn hf_detail(&self) -> f32 {
        self.hf_detail
    }

    /// HF detail cutoff in Hz.
    pub fn hf_cutoff(&self) -> f32 {
        self.hf.freq()
    }

    /// LF detail amount.
    pub fn lf_detail(&self) -> f32 {
        self.lf_detail
    }

    /// LF detail cutoff in Hz.
    pub fn lf_cutoff(&self) -> f32 {
        self.lf.freq()
    }

    /// Whether the phase rotator runs.
    pub fn rotator_enabled(&self) -> bool {
        self.rotator_enabled
    }
}

/// Accumulators for one channel's main-path filters.
#[derive(Debug, Clone, Default)]
pub struct FilterBank {
    subsonic: [RcState; MAX_SUBSONIC_STAGES],
    hf: RcState,
    lf: RcState,
    rotator: [RcState; ROTATOR_STAGES],
}

impl FilterBank {
    /// Run one sample through the chain described by `settings`.
    #[inline]
    pub fn process(&mut self, settings: &FilterSettings, input: f32) -> f32 {
        let mut x = input;
        for stage in &mut self.subsonic[..settings.subsonic_stages] {
            x = stage.highpass_12db(&settings.subsonic, x);
        }
        x = self.hf.highpass_6db(&settings.hf, x, settings.hf_detail);
        x = self.lf.lowpass_6db(&settings.lf, x, settings.lf_detail);
        if settings.rotator_enabled {
            for stage in &mut self.rotator {
                x = stage.phase_rotate(&settings.rotator, x);
            }
        }
        x
    }

    /// Clear every accumulator.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
