//! Offline AGC processing engine.
//!
//! [`AgcEngine`] plays the role of a host audio callback for whole buffers: each
//! input sample runs stage 1, a control update runs every `control_interval`
//! samples, and stage 3 produces the output. The `L - 1` sample lookahead
//! latency is compensated by flushing the delay line with silence and dropping
//! the leading warm-up samples, so output buffers line up with their input.

use vocalis_agc::{Channel, ChannelId, ChannelRack, MeterLevels};

use crate::StereoSamples;
use crate::Result;

/// Engine construction options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Lookahead in seconds.
    pub lookahead_seconds: f32,
    /// 1 for mono, 2 for stereo.
    pub channels: u16,
    /// Stereo only: the right channel delegates control to the left.
    pub linked: bool,
    /// Samples between control updates; 1 updates on every sample.
    pub control_interval: usize,
    /// Mic-muted flag passed to every control update.
    pub mic_muted: bool,
}

impl EngineConfig {
    /// Mono, 10 ms lookahead, per-sample control.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            lookahead_seconds: 0.01,
            channels: 1,
            linked: false,
            control_interval: 1,
            mic_muted: false,
        }
    }

    /// Stereo with the given link mode.
    pub fn stereo(sample_rate: u32, linked: bool) -> Self {
        Self {
            channels: 2,
            linked,
            ..Self::mono(sample_rate)
        }
    }
}

/// Per-channel running statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelStats {
    /// Largest absolute input sample.
    pub peak_in: f32,
    /// Largest absolute output sample.
    pub peak_out: f32,
    /// Control updates run (or borrowed from the host).
    pub updates: u64,
    /// Updates with the noise gate closed.
    pub gate_closed: u64,
    /// Updates with the de-esser active.
    pub deesser_active: u64,
    /// Lowest ducking factor seen.
    pub min_ducking: f32,
}

impl ChannelStats {
    fn new() -> Self {
        Self {
            min_ducking: 1.0,
            ..Self::default()
        }
    }
}

/// Drives one or two AGC channels over buffers.
#[derive(Debug)]
pub struct AgcEngine {
    rack: ChannelRack,
    ids: Vec<ChannelId>,
    stats: Vec<ChannelStats>,
    config: EngineConfig,
}

impl AgcEngine {
    /// Build the channels described by `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let mut rack = ChannelRack::new();
        let count = config.channels.clamp(1, 2);
        let mut ids = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            ids.push(rack.add_channel(config.sample_rate, config.lookahead_seconds)?);
        }
        if let [left, right] = ids[..]
            && config.linked
        {
            rack.set_as_partners(left, right)?;
            rack.set_partnered_mode(right, true)?;
        }

        tracing::info!(
            channels = count,
            linked = config.linked && count == 2,
            control_interval = config.control_interval,
            "AGC engine ready"
        );
        Ok(Self {
            stats: vec![ChannelStats::new(); ids.len()],
            rack,
            ids,
            config: EngineConfig {
                control_interval: config.control_interval.max(1),
                ..config
            },
        })
    }

    /// Apply a textual parameter to every channel. Returns `false` for an unknown key.
    pub fn set_parameter(&mut self, key: &str, value: &str) -> bool {
        let mut known = true;
        for &id in &self.ids {
            if let Some(ch) = self.rack.get_mut(id) {
                known &= ch.set_parameter(key, value);
            }
        }
        known
    }

    /// Run `f` on every channel, e.g. to apply a preset.
    pub fn for_each_channel(&mut self, mut f: impl FnMut(&mut Channel)) {
        for &id in &self.ids {
            if let Some(ch) = self.rack.get_mut(id) {
                f(ch);
            }
        }
    }

    /// Channel `index` (0 = left/mono).
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.ids.get(index).and_then(|&id| self.rack.get(id))
    }

    /// Statistics gathered since construction.
    pub fn stats(&self) -> &[ChannelStats] {
        &self.stats
    }

    /// Latched meter readings of channel `index`'s controlling channel.
    pub fn meter_levels(&self, index: usize) -> Option<MeterLevels> {
        let id = *self.ids.get(index)?;
        let host = self.rack.host_of(id)?;
        self.rack.get(host).map(Channel::meter_levels)
    }

    /// Lookahead latency compensated by the buffer methods.
    pub fn latency_samples(&self) -> usize {
        self.channel(0).map_or(0, Channel::latency_samples)
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.ids.len()
    }

    /// Process a mono buffer through channel 0. Output length equals input length.
    pub fn process_mono(&mut self, input: &[f32]) -> Vec<f32> {
        self.process_mono_with(input, |_| {})
    }

    /// [`process_mono`](Self::process_mono) with a progress callback receiving
    /// the number of input samples consumed so far.
    pub fn process_mono_with(&mut self, input: &[f32], mut progress: impl FnMut(usize)) -> Vec<f32> {
        let latency = self.latency_samples();
        let mut output = Vec::with_capacity(input.len());
        let total = input.len() + latency;

        for n in 0..total {
            let x = input.get(n).copied().unwrap_or(0.0);
            let y = self.tick(&[x], n)[0];
            if n >= latency {
                output.push(y);
            }
            if n % 4096 == 0 {
                progress(n.min(input.len()));
            }
        }
        progress(input.len());
        output
    }

    /// Process a stereo buffer. A mono engine processes the mixdown into both sides.
    pub fn process_stereo(&mut self, input: &StereoSamples) -> StereoSamples {
        self.process_stereo_with(input, |_| {})
    }

    /// [`process_stereo`](Self::process_stereo) with a progress callback.
    pub fn process_stereo_with(
        &mut self,
        input: &StereoSamples,
        mut progress: impl FnMut(usize),
    ) -> StereoSamples {
        if self.ids.len() < 2 {
            let mono = self.process_mono_with(&input.to_mono(), progress);
            return StereoSamples::from_mono(mono);
        }

        let latency = self.latency_samples();
        let frames = input.len();
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);

        for n in 0..frames + latency {
            let frame = [
                input.left.get(n).copied().unwrap_or(0.0),
                input.right.get(n).copied().unwrap_or(0.0),
            ];
            let out = self.tick(&frame, n);
            if n >= latency {
                left.push(out[0]);
                right.push(out[1]);
            }
            if n % 4096 == 0 {
                progress(n.min(frames));
            }
        }
        progress(frames);
        StereoSamples { left, right }
    }

    /// One frame through every channel: stage 1, control update on schedule, stage 3.
    fn tick(&mut self, frame: &[f32], n: usize) -> [f32; 2] {
        let mut out = [0.0f32; 2];
        let update = (n + 1) % self.config.control_interval == 0;

        // ids are created by this engine and never removed, so every stage call
        // is expected to succeed
        for (i, (&id, &x)) in self.ids.iter().zip(frame).enumerate() {
            let stored = self.rack.process_stage1(id, x);
            debug_assert!(stored.is_ok(), "stage 1 on {id}: {stored:?}");
            self.stats[i].peak_in = self.stats[i].peak_in.max(x.abs());
        }

        if update {
            for &id in &self.ids {
                let updated = self.rack.process_stage2(id, self.config.mic_muted);
                debug_assert!(updated.is_ok(), "stage 2 on {id}: {updated:?}");
            }
        }

        for (i, &id) in self.ids.iter().enumerate() {
            let produced = self.rack.process_stage3(id);
            debug_assert!(produced.is_ok(), "stage 3 on {id}: {produced:?}");
            let y = produced.unwrap_or(0.0);
            out[i] = y;

            let stats = &mut self.stats[i];
            stats.peak_out = stats.peak_out.max(y.abs());
            if update
                && let Some(host) = self.rack.host_of(id).and_then(|h| self.rack.get(h))
            {
                stats.updates += 1;
                stats.gate_closed += u64::from(host.gate_closed());
                stats.deesser_active += u64::from(host.deesser_active());
                stats.min_ducking = stats.min_ducking.min(host.ducking_factor());
            }
        }
        out
    }
}
