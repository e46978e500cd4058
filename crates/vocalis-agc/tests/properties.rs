//! Property-based tests for the AGC channel.
//!
//! Randomized input must never push the output above the ceiling, the gain
//! must respect its per-update rate limit, and the delay cursors must keep
//! their fixed offset however the stages are interleaved.

use proptest::prelude::*;
use vocalis_agc::{Channel, GateState, NoiseGate};

const SAMPLE_RATE: u32 = 48000;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Per-sample control keeps every output at or below the limit.
    #[test]
    fn output_never_exceeds_limit(
        lookahead_ms in 1.0f32..20.0f32,
        limit_db in -24.0f32..0.0f32,
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..4096),
    ) {
        let mut ch = Channel::new(SAMPLE_RATE, lookahead_ms / 1000.0).unwrap();
        ch.set_limit_db(limit_db);
        let limit = ch.control().limit();

        for &x in &input {
            ch.process_stage1(x);
            ch.process_stage2(false);
            let y = ch.process_stage3();
            prop_assert!(y.abs() <= limit, "{} exceeds {}", y, limit);
        }
    }

    /// The gain moves by at most `ratio / L` per control update.
    #[test]
    fn gain_change_is_rate_limited(
        ratio_db in 0.0f32..20.0f32,
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..2048),
    ) {
        let mut ch = Channel::new(SAMPLE_RATE, 0.005).unwrap();
        ch.set_ratio_db(ratio_db);
        let step = ch.control().gain_step();
        prop_assert!((step - ch.control().ratio() / ch.buffer_len() as f32).abs() < 1e-7);

        let mut previous = ch.gain();
        for &x in &input {
            ch.process_stage1(x);
            ch.process_stage2(false);
            let gain = ch.gain();
            prop_assert!((gain - previous).abs() <= step * 1.0001);
            previous = gain;
        }
    }

    /// Write leads read by exactly `L` whatever the control cadence.
    #[test]
    fn cursor_offset_holds(
        lookahead_ms in 0.1f32..10.0f32,
        updates in prop::collection::vec(any::<bool>(), 0..2048),
    ) {
        let mut ch = Channel::new(SAMPLE_RATE, lookahead_ms / 1000.0).unwrap();
        let len = ch.buffer_len() as u64;
        for (n, update) in updates.into_iter().enumerate() {
            ch.process_stage1((n as f32 * 0.01).sin());
            if update {
                ch.process_stage2(false);
            }
            prop_assert_eq!(ch.write_cursor() - ch.read_cursor(), len);
        }
    }

    /// Levels strictly between onset and offset never flip the gate.
    #[test]
    fn gate_holds_inside_hysteresis_band(
        threshold_db in -60.0f32..-6.0f32,
        start_open in any::<bool>(),
        fractions in prop::collection::vec(0.0f32..=1.0f32, 1..256),
    ) {
        let mut gate = NoiseGate::new();
        gate.set_threshold_db(threshold_db);
        let (onset, offset) = (gate.onset(), gate.offset());
        prop_assert!(onset < offset);

        gate.update(if start_open { offset * 2.0 } else { 0.0 });
        let initial = gate.state();
        prop_assert_eq!(initial == GateState::Open, start_open);

        for f in fractions {
            gate.update((onset + (offset - onset) * f).clamp(onset, offset));
            prop_assert_eq!(gate.state(), initial);
        }
    }

    /// Arbitrary parameter text never panics and never produces a non-finite output.
    #[test]
    fn arbitrary_parameter_text_is_harmless(
        key_index in 0usize..16,
        value in "\\PC{0,12}",
    ) {
        let mut ch = Channel::new(SAMPLE_RATE, 0.005).unwrap();
        let key = vocalis_agc::ParamKey::ALL[key_index];
        prop_assert!(ch.set_parameter(key.as_str(), &value));
        for n in 0..512 {
            ch.process_stage1(if n % 32 < 16 { 0.5 } else { -0.5 });
            ch.process_stage2(false);
            prop_assert!(ch.process_stage3().is_finite());
        }
    }
}
