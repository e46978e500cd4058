//! One AGC processing channel.
//!
//! A [`Channel`] owns its delay line, filter accumulators and control state. The
//! host audio callback drives it with three operations:
//!
//! | Operation | Cadence | Effect |
//! |-----------|---------|--------|
//! | [`Channel::process_stage1`] | once per input sample | filter, store, advance cursors |
//! | [`Channel::process_stage2`] | once per control update | envelope, latches, gain ramp, ducker |
//! | [`Channel::process_stage3`] | once per output sample | delayed sample × gain |
//!
//! Control updates may run less often than once per sample (e.g. once per
//! callback block) but must run at least once per lookahead window and before
//! the samples they cover are emitted. Ramp, attack, release and hold rates are
//! expressed per update, so they are calibrated for one update per sample.
//!
//! # Example
//!
//! ```rust
//! use vocalis_agc::Channel;
//!
//! let mut ch = Channel::new(48000, 0.01).unwrap();
//! assert_eq!(ch.buffer_len(), 480);
//!
//! let mut peak = 0.0f32;
//! for n in 0..4800 {
//!     let x = if n % 100 < 50 { 0.9 } else { -0.9 };
//!     ch.process_stage1(x);
//!     ch.process_stage2(false);
//!     peak = peak.max(ch.process_stage3().abs());
//! }
//! assert!(peak <= 0.707);
//! ```
//!
//! Stereo linking lives in [`ChannelRack`](crate::ChannelRack); a standalone
//! channel is always its own host.

use vocalis_core::LookaheadDelay;

use crate::control::GainControl;
use crate::error::AgcError;
use crate::filter_bank::{FilterBank, FilterSettings};
use crate::meter::MeterLevels;
use crate::params::{ParamKey, parse_flag, parse_leading_f32, parse_leading_int};

/// A single AGC channel.
#[derive(Debug, Clone)]
pub struct Channel {
    sample_rate: u32,
    delay: LookaheadDelay,
    input: f32,
    filters: FilterSettings,
    filter_state: FilterBank,
    control: GainControl,
}

impl Channel {
    /// Create a channel with `sample_rate × lookahead_seconds` samples of lookahead.
    ///
    /// The buffer length is truncated to an integer and is at least 1. The
    /// buffer is the only allocation the channel ever makes.
    pub fn new(sample_rate: u32, lookahead_seconds: f32) -> Result<Self, AgcError> {
        if sample_rate == 0 {
            return Err(AgcError::invalid("sample rate must be greater than zero"));
        }
        if !lookahead_seconds.is_finite() || lookahead_seconds <= 0.0 {
            return Err(AgcError::invalid(format!(
                "lookahead must be a positive number of seconds, got {lookahead_seconds}"
            )));
        }

        let samples = sample_rate as f32 * lookahead_seconds;
        if samples > u32::MAX as f32 {
            return Err(AgcError::invalid(format!(
                "lookahead of {lookahead_seconds} s is too long"
            )));
        }
        let len = (samples as usize).max(1);
        let delay = LookaheadDelay::try_new(len)
            .map_err(|source| AgcError::Allocation { len, source })?;

        tracing::info!(sample_rate, buffer_len = len, "AGC channel created");

        Ok(Self {
            sample_rate,
            delay,
            input: 0.0,
            filters: FilterSettings::new(sample_rate as f32),
            filter_state: FilterBank::default(),
            control: GainControl::new(sample_rate, len),
        })
    }

    /// Filter one input sample and store it in the delay line.
    #[inline]
    pub fn process_stage1(&mut self, input: f32) {
        let y = self.filter_state.process(&self.filters, input);
        self.store(y);
    }

    /// Filter with another channel's settings. Used for a delegated stereo partner.
    #[inline]
    pub(crate) fn process_stage1_with(&mut self, settings: &FilterSettings, input: f32) {
        let y = self.filter_state.process(settings, input);
        self.store(y);
    }

    #[inline]
    fn store(&mut self, filtered: f32) {
        self.input = filtered;
        self.delay.store(filtered);
    }

    /// Run one control update on this channel's own input.
    ///
    /// `mic_muted` releases the ducker; the gain still tracks the signal.
    #[inline]
    pub fn process_stage2(&mut self, mic_muted: bool) {
        let detect = self.input;
        self.update_control(detect, mic_muted);
    }

    /// Continue from another channel's gain, e.g. a former link host.
    pub(crate) fn seed_gain(&mut self, gain: f32) {
        self.control.set_gain_immediate(gain);
    }

    #[inline]
    pub(crate) fn update_control(&mut self, detect: f32, mic_muted: bool) {
        self.control.update(
            detect,
            self.delay.write_cursor(),
            self.delay.read_cursor(),
            mic_muted,
        );
    }

    /// Delayed sample scaled by this channel's gain.
    #[inline]
    pub fn process_stage3(&self) -> f32 {
        self.delay.load() * self.control.gain()
    }

    /// Delayed sample at the read cursor, before gain.
    #[inline]
    pub fn delayed_sample(&self) -> f32 {
        self.delay.load()
    }

    /// Latest filtered, pre-delay sample.
    #[inline]
    pub fn input(&self) -> f32 {
        self.input
    }

    /// Apply a textual parameter update.
    ///
    /// Values are parsed leniently (see [`params`](crate::params)) and clamped to
    /// the descriptor range. Returns `false` for an unknown key, which is
    /// otherwise ignored.
    pub fn set_parameter(&mut self, key: &str, value: &str) -> bool {
        let Some(param) = ParamKey::from_key(key) else {
            tracing::debug!(key, "ignoring unknown AGC parameter");
            return false;
        };

        match param {
            ParamKey::PhaseRotate => self.set_phase_rotate(parse_flag(value)),
            ParamKey::Gain => self.set_ratio_db(parse_leading_f32(value)),
            ParamKey::Limit => self.set_limit_db(parse_leading_f32(value)),
            ParamKey::GateThreshold => self.set_gate_threshold_db(parse_leading_f32(value)),
            ParamKey::GateGain => self.set_gate_attenuation_db(parse_leading_f32(value)),
            ParamKey::DuckEnable => self.set_ducker_enabled(parse_flag(value)),
            ParamKey::DuckRelease => self.set_duck_release_ms(parse_leading_f32(value)),
            ParamKey::DuckHold => self.set_duck_hold_ms(parse_leading_int(value)),
            ParamKey::DeEssBias => self.set_deess_bias(parse_leading_f32(value)),
            ParamKey::DeEssGain => self.set_deess_attenuation_db(parse_leading_f32(value)),
            ParamKey::HpCutoff => self.set_subsonic_cutoff(parse_leading_f32(value)),
            ParamKey::HpStages => {
                // round half up, then clamp to the valid section count
                let stages = param
                    .descriptor()
                    .clamp((parse_leading_f32(value) + 0.5).floor());
                self.set_subsonic_stages(stages as usize);
            }
            ParamKey::HfMulti => self.set_hf_detail(parse_leading_f32(value)),
            ParamKey::HfCutoff => self.set_hf_cutoff(parse_leading_f32(value)),
            ParamKey::LfMulti => self.set_lf_detail(parse_leading_f32(value)),
            ParamKey::LfCutoff => self.set_lf_cutoff(parse_leading_f32(value)),
        }

        tracing::debug!(key, value, "AGC parameter set");
        true
    }

    /// Enable or bypass the phase rotator.
    pub fn set_phase_rotate(&mut self, enabled: bool) {
        self.filters.set_rotator_enabled(enabled);
    }

    /// Set the compression ratio in dB.
    pub fn set_ratio_db(&mut self, ratio_db: f32) {
        self.control
            .set_ratio_db(ParamKey::Gain.descriptor().clamp(ratio_db));
    }

    /// Set the output ceiling in dB (6 dB/doubling).
    pub fn set_limit_db(&mut self, limit_db: f32) {
        self.control
            .set_limit_db(ParamKey::Limit.descriptor().clamp(limit_db));
    }

    /// Set the noise gate threshold in dB; onset and offset sit 1 dB either side.
    pub fn set_gate_threshold_db(&mut self, threshold_db: f32) {
        let db = ParamKey::GateThreshold.descriptor().clamp(threshold_db);
        self.control.gate_mut().set_threshold_db(db);
    }

    /// Set the noise gate attenuation in dB.
    pub fn set_gate_attenuation_db(&mut self, db: f32) {
        let db = ParamKey::GateGain.descriptor().clamp(db);
        self.control.gate_mut().set_attenuation_db(db);
    }

    /// Enable or disable ducking.
    pub fn set_ducker_enabled(&mut self, enabled: bool) {
        self.control.ducker_mut().set_enabled(enabled);
    }

    /// Set the ducker release time in milliseconds.
    pub fn set_duck_release_ms(&mut self, release_ms: f32) {
        let ms = ParamKey::DuckRelease.descriptor().clamp(release_ms);
        let sr = self.sample_rate;
        self.control.ducker_mut().set_release_ms(ms, sr);
    }

    /// Set the ducker hold time in whole milliseconds.
    pub fn set_duck_hold_ms(&mut self, hold_ms: i64) {
        let max = ParamKey::DuckHold.descriptor().max as i64;
        let sr = self.sample_rate;
        self.control
            .ducker_mut()
            .set_hold_ms(hold_ms.clamp(0, max), sr);
    }

    /// Set the de-esser band bias.
    pub fn set_deess_bias(&mut self, bias: f32) {
        let bias = ParamKey::DeEssBias.descriptor().clamp(bias);
        self.control.deesser_mut().set_bias(bias);
    }

    /// Set the de-esser attenuation in dB.
    pub fn set_deess_attenuation_db(&mut self, db: f32) {
        let db = ParamKey::DeEssGain.descriptor().clamp(db);
        self.control.deesser_mut().set_attenuation_db(db);
    }

    /// Set the subsonic cutoff in Hz.
    pub fn set_subsonic_cutoff(&mut self, freq_hz: f32) {
        self.filters
            .set_subsonic_cutoff(ParamKey::HpCutoff.descriptor().clamp(freq_hz));
    }

    /// Set the number of subsonic sections (1-4).
    pub fn set_subsonic_stages(&mut self, stages: usize) {
        self.filters.set_subsonic_stages(stages);
    }

    /// Set the HF detail amount.
    pub fn set_hf_detail(&mut self, multi: f32) {
        self.filters
            .set_hf_detail(ParamKey::HfMulti.descriptor().clamp(multi));
    }

    /// Set the HF detail cutoff in Hz.
    pub fn set_hf_cutoff(&mut self, freq_hz: f32) {
        self.filters
            .set_hf_cutoff(ParamKey::HfCutoff.descriptor().clamp(freq_hz));
    }

    /// Set the LF detail amount.
    pub fn set_lf_detail(&mut self, multi: f32) {
        self.filters
            .set_lf_detail(ParamKey::LfMulti.descriptor().clamp(multi));
    }

    /// Set the LF detail cutoff in Hz.
    pub fn set_lf_cutoff(&mut self, freq_hz: f32) {
        self.filters
            .set_lf_cutoff(ParamKey::LfCutoff.descriptor().clamp(freq_hz));
    }

    /// Meter readings in dB of attenuation.
    pub fn meter_levels(&self) -> MeterLevels {
        self.control.meters().levels()
    }

    /// Background ducking factor in `[0, 1]`.
    pub fn ducking_factor(&self) -> f32 {
        self.control.ducker().factor()
    }

    /// Reset meters to unity and release the ducker.
    pub fn reset_stats(&mut self) {
        self.control.reset_stats();
    }

    /// Applied gain.
    #[inline]
    pub fn gain(&self) -> f32 {
        self.control.gain()
    }

    /// Whether the noise gate is closed.
    pub fn gate_closed(&self) -> bool {
        self.control.gate_closed()
    }

    /// Whether the de-esser is attenuating.
    pub fn deesser_active(&self) -> bool {
        self.control.deesser_active()
    }

    /// Control state, read-only.
    pub fn control(&self) -> &GainControl {
        &self.control
    }

    /// Main-path filter settings.
    pub fn filter_settings(&self) -> &FilterSettings {
        &self.filters
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Lookahead length `L` in samples.
    pub fn buffer_len(&self) -> usize {
        self.delay.len()
    }

    /// Samples between a store and the output of that sample (`L - 1`).
    pub fn latency_samples(&self) -> usize {
        self.delay.len() - 1
    }

    /// Write cursor of the delay line.
    pub fn write_cursor(&self) -> u64 {
        self.delay.write_cursor()
    }

    /// Read cursor of the delay line.
    pub fn read_cursor(&self) -> u64 {
        self.delay.read_cursor()
    }

    /// True once `L` samples have been stored.
    pub fn is_warm(&self) -> bool {
        self.delay.is_warm()
    }

    /// True when more than `L` samples were stored since the last control update.
    ///
    /// A stale channel is still emitting audio, but its gain may no longer be
    /// adapted to what is in the delay line.
    pub fn is_control_stale(&self) -> bool {
        let since = self
            .control
            .last_update_cursor()
            .unwrap_or(self.delay.len() as u64);
        self.delay.write_cursor() - since > self.delay.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(
            Channel::new(0, 0.01),
            Err(AgcError::InvalidConfig { .. })
        ));
        for lookahead in [0.0, -0.01, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                Channel::new(48000, lookahead),
                Err(AgcError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn buffer_len_truncates_with_floor_of_one() {
        assert_eq!(Channel::new(48000, 0.01).unwrap().buffer_len(), 480);
        assert_eq!(Channel::new(44100, 0.01).unwrap().buffer_len(), 441);
        assert_eq!(Channel::new(48000, 1e-6).unwrap().buffer_len(), 1);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut ch = Channel::new(48000, 0.01).unwrap();
        let before = ch.control().clone();
        assert!(!ch.set_parameter("volume", "11"));
        assert_eq!(ch.control().ratio(), before.ratio());
        assert_eq!(ch.control().limit(), before.limit());
    }

    #[test]
    fn parameter_conversions() {
        let mut ch = Channel::new(48000, 0.01).unwrap();

        assert!(ch.set_parameter("gain", "6"));
        assert!((ch.control().ratio() - 1.99526).abs() < 1e-4);
        assert!((ch.control().gain_step() - ch.control().ratio() / 480.0).abs() < 1e-9);

        ch.set_parameter("limit", "-6");
        assert!((ch.control().limit() - 0.5).abs() < 1e-6);

        ch.set_parameter("ngthresh", "-30");
        let gate = ch.control().gate();
        assert!((gate.onset() - vocalis_core::db6_to_linear(-31.0)).abs() < 1e-9);
        assert!((gate.offset() - vocalis_core::db6_to_linear(-29.0)).abs() < 1e-9);

        ch.set_parameter("nggain", "-12");
        assert!((ch.control().gate().attenuation() - 0.25).abs() < 1e-6);

        ch.set_parameter("deessbias", "0.5");
        assert_eq!(ch.control().deesser().bias(), 0.5);
        ch.set_parameter("deessgain", "-3");
        assert!((ch.control().deesser().attenuation() - 0.70710677).abs() < 1e-5);

        ch.set_parameter("duckrelease", "500");
        assert!((ch.control().ducker().release() - 1000.0 / (500.0 * 48000.0)).abs() < 1e-9);
        ch.set_parameter("duckhold", "250.9");
        assert_eq!(ch.control().ducker().hold(), 12000);
        ch.set_parameter("duckenable", "1");
        assert!(ch.control().ducker().enabled());

        ch.set_parameter("hpstages", "2.6");
        assert_eq!(ch.filter_settings().subsonic_stages(), 3);
        ch.set_parameter("hpstages", "0");
        assert_eq!(ch.filter_settings().subsonic_stages(), 1);
        ch.set_parameter("hpcutoff", "80");
        assert_eq!(ch.filter_settings().subsonic_cutoff(), 80.0);

        ch.set_parameter("hfmulti", "2");
        ch.set_parameter("hfcutoff", "3000");
        ch.set_parameter("lfmulti", "1.5");
        ch.set_parameter("lfcutoff", "120");
        let f = ch.filter_settings();
        assert_eq!(
            (f.hf_detail(), f.hf_cutoff(), f.lf_detail(), f.lf_cutoff()),
            (2.0, 3000.0, 1.5, 120.0)
        );

        ch.set_parameter("phaserotate", "0");
        assert!(!ch.filter_settings().rotator_enabled());
    }

    #[test]
    fn malformed_values_read_as_zero() {
        let mut ch = Channel::new(48000, 0.01).unwrap();
        ch.set_parameter("gain", "loud");
        assert!((ch.control().ratio() - 1.0).abs() < 1e-6);
        // zero ms is clamped so the release rate stays finite
        ch.set_parameter("duckrelease", "?");
        assert!(ch.control().ducker().release().is_finite());
        ch.set_parameter("limit", "+99");
        assert!((ch.control().limit() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn warm_up_outputs_silence() {
        let mut ch = Channel::new(48000, 0.001).unwrap();
        for _ in 0..(ch.buffer_len() - 1) {
            ch.process_stage1(0.5);
            ch.process_stage2(false);
            assert_eq!(ch.process_stage3(), 0.0);
        }
        assert!(!ch.is_warm());
    }

    #[test]
    fn staleness_guard() {
        let mut ch = Channel::new(1000, 0.01).unwrap(); // L = 10
        for _ in 0..10 {
            ch.process_stage1(0.1);
        }
        assert!(!ch.is_control_stale());
        ch.process_stage1(0.1);
        assert!(ch.is_control_stale());
        ch.process_stage2(false);
        assert!(!ch.is_control_stale());
    }

    #[test]
    fn reset_stats_gives_unity() {
        let mut ch = Channel::new(48000, 0.01).unwrap();
        ch.set_parameter("duckenable", "1");
        for n in 0..4800 {
            ch.process_stage1(if n % 40 < 20 { 0.8 } else { -0.8 });
            ch.process_stage2(false);
        }
        assert!(ch.ducking_factor() < 1.0);
        assert_ne!(ch.meter_levels(), MeterLevels::default());
        ch.reset_stats();
        assert_eq!(ch.meter_levels(), MeterLevels::default());
        assert_eq!(ch.ducking_factor(), 1.0);
    }
}
