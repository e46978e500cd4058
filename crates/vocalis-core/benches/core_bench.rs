//! Criterion benchmarks for vocalis-core DSP primitives
//!
//! Run with: cargo bench -p vocalis-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vocalis_core::{LinearRamp, LookaheadDelay, RcCoefficients, RcState, ResetSchedule, RoundRobinPeak};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_rc_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("RcState");
    let subsonic = RcCoefficients::new(100.0, 0.375, SAMPLE_RATE);
    let rotator = RcCoefficients::new(300.0, 0.0, SAMPLE_RATE);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("highpass_12db_x4", block_size),
            &block_size,
            |b, _| {
                let mut stages = [RcState::default(); 4];
                b.iter(|| {
                    for &sample in &input {
                        let mut x = sample;
                        for stage in &mut stages {
                            x = stage.highpass_12db(&subsonic, x);
                        }
                        black_box(x);
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("phase_rotate_x4", block_size),
            &block_size,
            |b, _| {
                let mut stages = [RcState::default(); 4];
                b.iter(|| {
                    for &sample in &input {
                        let mut x = sample;
                        for stage in &mut stages {
                            x = stage.phase_rotate(&rotator, x);
                        }
                        black_box(x);
                    }
                });
            },
        );
    }

    group.bench_function("coefficient_calc", |b| {
        b.iter(|| {
            black_box(RcCoefficients::new(
                black_box(1000.0),
                black_box(1.0),
                black_box(SAMPLE_RATE),
            ))
        });
    });

    group.finish();
}

fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("LookaheadDelay");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("store_load", block_size),
            &block_size,
            |b, _| {
                let mut delay = LookaheadDelay::try_new(480).unwrap();
                b.iter(|| {
                    for &sample in &input {
                        delay.store(black_box(sample));
                        black_box(delay.load());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_round_robin(c: &mut Criterion) {
    let mut group = c.benchmark_group("RoundRobinPeak");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let schedule = ResetSchedule::new(480);
                let mut rr = RoundRobinPeak::default();
                let mut cursor = 480u64;
                b.iter(|| {
                    for &sample in &input {
                        cursor += 1;
                        black_box(rr.process(schedule.due(cursor - 1, cursor), sample));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_ramp(c: &mut Criterion) {
    c.bench_function("LinearRamp/approach", |b| {
        let mut ramp = LinearRamp::new(0.0, 1.4125 / 480.0);
        let mut target = 1.0;
        b.iter(|| {
            if ramp.get() == target {
                target = 1.0 - target;
            }
            black_box(ramp.approach(black_box(target)));
        });
    });
}

criterion_group!(
    benches,
    bench_rc_filters,
    bench_delay,
    bench_round_robin,
    bench_ramp,
);

criterion_main!(benches);
