//! Background ducker.
//!
//! Derives an attenuation factor for a music bed from the same envelope the AGC
//! uses. While the microphone is live the proposed factor is
//!
//! ```text
//! proposed = max(1 - target_gain · level, 1 - limit)
//! ```
//!
//! so loud speech pulls the bed down, but never below `1 - limit`. The factor
//! engages (falls) at the attack rate, fast enough to match the gain ramp, and
//! releases (rises) at a much slower rate only after the hold timer has run out.
//! Every engage reloads the hold timer, so short gaps between words do not let
//! the music swell back in. Muted or disabled, the factor drifts back to 1.
//!
//! # Parameters
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | Enabled | off | Whether the ducker tracks speech |
//! | Attack | `1/L` per update | Engage step, one lookahead period full-scale |
//! | Release | 250 ms | Time for a full-scale release |
//! | Hold | 500 ms | Updates to wait before releasing |

/// Ducking factor generator.
#[derive(Debug, Clone)]
pub struct Ducker {
    enabled: bool,
    factor: f32,
    attack: f32,
    release: f32,
    hold: u64,
    hold_remaining: u64,
}

impl Ducker {
    /// Ducker for the given sample rate and lookahead length, disabled.
    pub fn new(sample_rate: u32, buffer_len: usize) -> Self {
        let sr = sample_rate.max(1);
        Self {
            enabled: false,
            factor: 1.0,
            attack: 1.0 / buffer_len.max(1) as f32,
            release: 1.0 / (0.25 * sr as f32),
            hold: u64::from(sr) / 2,
            hold_remaining: 0,
        }
    }

    /// Enable or disable ducking.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set the release time. `1000 / (ms · sample_rate)` per update.
    pub fn set_release_ms(&mut self, release_ms: f32, sample_rate: u32) {
        self.release = 1000.0 / (release_ms.max(1.0) * sample_rate.max(1) as f32);
    }

    /// Set the hold time in whole milliseconds; fractions are dropped.
    pub fn set_hold_ms(&mut self, hold_ms: i64, sample_rate: u32) {
        let ms = u64::try_from(hold_ms).unwrap_or(0);
        self.hold = ms.saturating_mul(u64::from(sample_rate)) / 1000;
    }

    /// Advance one control update.
    ///
    /// `target_gain` is the gain the AGC is heading for (after gate and
    /// de-esser scaling) and `level` the envelope it was derived from.
    #[inline]
    pub fn update(&mut self, mic_muted: bool, target_gain: f32, level: f32, limit: f32) -> f32 {
        if mic_muted || !self.enabled {
            self.factor = (self.factor + self.release).min(1.0);
            return self.factor;
        }

        let proposed = (1.0 - target_gain * level).max(1.0 - limit).clamp(0.0, 1.0);

        if self.factor < proposed {
            if self.hold_remaining == 0 {
                self.factor = (self.factor + self.release).min(proposed);
            } else {
                self.hold_remaining -= 1;
            }
        } else if self.factor > proposed {
            self.factor = (self.factor - self.attack).max(proposed);
            self.hold_remaining = self.hold;
        }
        self.factor
    }

    /// Current factor in `[0, 1]`; 1 means no ducking.
    #[inline]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Whether ducking is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Engage step per update.
    pub fn attack(&self) -> f32 {
        self.attack
    }

    /// Release step per update.
    pub fn release(&self) -> f32 {
        self.release
    }

    /// Hold length in updates.
    pub fn hold(&self) -> u64 {
        self.hold
    }

    /// Return to no ducking and clear the hold timer.
    pub fn reset(&mut self) {
        self.factor = 1.0;
        self.hold_remaining = 0;
    }
}
