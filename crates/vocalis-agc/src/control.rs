//! Gain control: envelope, gate and de-esser latches, gain ramp, ducker, meters.
//!
//! One [`GainControl::update`] is one control update. It runs only on a host
//! channel; a delegated channel borrows its host's gain instead.
//!
//! # Algorithm
//!
//! 1. **Envelope**: the detection sample (own input, or the L/R average when a
//!    partner defers to this channel) feeds a round-robin peak tracker.
//! 2. **Target**: `min(limit / (level + ε), ratio)`. ε keeps silence finite.
//! 3. **Latches**: a closed noise gate and an active de-esser each scale the
//!    target by their attenuation factor.
//! 4. **Ramp**: the applied gain moves toward the target by at most
//!    `ratio / L` per update. A full-scale swing therefore takes exactly one
//!    lookahead period, which is the time a sample spends in the delay line
//!    after the envelope first sees it. The gain is always fully adapted before
//!    a peak reaches the output.
//! 5. **Ducker** and **meters** follow from the same figures.

use vocalis_core::{LinearRamp, ResetSchedule, RoundRobinPeak, db_to_linear, db6_to_linear};

use crate::deesser::{DeEsser, DeEsserState};
use crate::ducker::Ducker;
use crate::gate::{GateState, NoiseGate};
use crate::meter::Meters;

/// Added to the level before dividing.
pub const LEVEL_EPSILON: f32 = 0.0001;

/// Meters latch when the read cursor crosses a multiple of this.
pub const METER_INTERVAL: u64 = 8;

/// Default compression ratio in dB.
pub const DEFAULT_RATIO_DB: f32 = 3.0;

/// Default output ceiling, linear.
pub const DEFAULT_LIMIT: f32 = 0.707;

/// Control state owned by each channel.
#[derive(Debug, Clone)]
pub struct GainControl {
    ratio: f32,
    limit: f32,
    buffer_len: usize,
    gain: LinearRamp,
    schedule: ResetSchedule,
    level: RoundRobinPeak,
    gate: NoiseGate,
    deesser: DeEsser,
    ducker: Ducker,
    meters: Meters,
    last_update: Option<Cursors>,
}

#[derive(Debug, Clone, Copy)]
struct Cursors {
    write: u64,
    read: u64,
}

impl GainControl {
    /// Control state with default settings for `buffer_len` samples of lookahead.
    pub fn new(sample_rate: u32, buffer_len: usize) -> Self {
        let buffer_len = buffer_len.max(1);
        let ratio = db_to_linear(DEFAULT_RATIO_DB);
        Self {
            ratio,
            limit: DEFAULT_LIMIT,
            buffer_len,
            gain: LinearRamp::new(0.0, ratio / buffer_len as f32),
            schedule: ResetSchedule::new(buffer_len),
            level: RoundRobinPeak::default(),
            gate: NoiseGate::new(),
            deesser: DeEsser::new(sample_rate as f32),
            ducker: Ducker::new(sample_rate, buffer_len),
            meters: Meters::UNITY,
            last_update: None,
        }
    }

    /// Run one control update.
    ///
    /// `write` and `read` are the delay cursors after the most recent store.
    pub fn update(&mut self, detect: f32, write: u64, read: u64, mic_muted: bool) {
        let prev = self.last_update.unwrap_or(Cursors {
            write: write.saturating_sub(1),
            read: read.saturating_sub(1),
        });
        let due = self.schedule.due(prev.write, write);

        let mul_ds = self.deesser.update(due, detect);
        let level = self.level.process(due, detect);

        let unscaled = (self.limit / (level + LEVEL_EPSILON)).min(self.ratio);
        let mul_nr = self.gate.update(level);
        let target = unscaled * mul_nr * mul_ds;

        self.gain.approach(target);
        self.ducker.update(mic_muted, target, level, self.limit);

        if read > prev.read && prev.read / METER_INTERVAL != read / METER_INTERVAL {
            self.meters = Meters {
                red: unscaled / self.ratio,
                yellow: mul_ds,
                green: mul_nr,
            };
        }

        self.last_update = Some(Cursors { write, read });
    }

    /// Set the compression ratio from dB (`10^(dB/20)`); the ramp step follows.
    pub fn set_ratio_db(&mut self, ratio_db: f32) {
        self.ratio = db_to_linear(ratio_db);
        self.gain.set_step(self.ratio / self.buffer_len as f32);
    }

    /// Set the output ceiling from dB (`2^(dB/6)`).
    pub fn set_limit_db(&mut self, limit_db: f32) {
        self.limit = db6_to_linear(limit_db);
    }

    /// Applied gain.
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Jump the gain ramp to `gain`; later updates ramp from there.
    pub fn set_gain_immediate(&mut self, gain: f32) {
        self.gain.set_immediate(gain.max(0.0));
    }

    /// Maximum gain, linear.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Output ceiling, linear.
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Largest gain change per update.
    pub fn gain_step(&self) -> f32 {
        self.gain.step()
    }

    /// Latest envelope level.
    pub fn level(&self) -> f32 {
        self.level.level()
    }

    /// Shared reset schedule of the envelope trackers.
    pub fn schedule(&self) -> &ResetSchedule {
        &self.schedule
    }

    /// Noise gate latch.
    pub fn gate(&self) -> &NoiseGate {
        &self.gate
    }

    /// Noise gate latch, mutable.
    pub fn gate_mut(&mut self) -> &mut NoiseGate {
        &mut self.gate
    }

    /// De-esser.
    pub fn deesser(&self) -> &DeEsser {
        &self.deesser
    }

    /// De-esser, mutable.
    pub fn deesser_mut(&mut self) -> &mut DeEsser {
        &mut self.deesser
    }

    /// Ducker.
    pub fn ducker(&self) -> &Ducker {
        &self.ducker
    }

    /// Ducker, mutable.
    pub fn ducker_mut(&mut self) -> &mut Ducker {
        &mut self.ducker
    }

    /// Whether the gate is closed.
    pub fn gate_closed(&self) -> bool {
        self.gate.state() == GateState::Closed
    }

    /// Whether the de-esser is attenuating.
    pub fn deesser_active(&self) -> bool {
        self.deesser.state() == DeEsserState::Active
    }

    /// Latched meters.
    pub fn meters(&self) -> Meters {
        self.meters
    }

    /// Write cursor at the last update, if any.
    pub fn last_update_cursor(&self) -> Option<u64> {
        self.last_update.map(|c| c.write)
    }

    /// Meters to unity and ducker released.
    pub fn reset_stats(&mut self) {
        self.meters = Meters::UNITY;
        self.ducker.reset();
    }
}
