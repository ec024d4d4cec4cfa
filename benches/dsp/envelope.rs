//! Benchmarks for the AHDSR envelope engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midimod::dsp::{
    curve::CurveMode,
    envelope::{EnvelopeConfig, EnvelopeEngine},
};

use crate::TICK_COUNTS;

const TICK_MS: f64 = 10.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &ticks in TICK_COUNTS {
        // Attack phase (ramping up), long enough never to finish
        let mut env = EnvelopeEngine::new(EnvelopeConfig::adsr(1000.0, 100.0, 0.7, 300.0));
        group.bench_with_input(BenchmarkId::new("attack", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                env.note_on(0.0, 60);
                for i in 0..ticks {
                    black_box(env.tick(black_box(i as f64 * 0.01)));
                }
            })
        });

        // Sustain phase (holding steady)
        let mut env = EnvelopeEngine::new(EnvelopeConfig::adsr(0.0, 0.0, 0.7, 300.0));
        env.note_on(0.0, 60);
        env.tick(0.0);
        group.bench_with_input(BenchmarkId::new("sustain", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                for i in 0..ticks {
                    black_box(env.tick(black_box(i as f64 * TICK_MS)));
                }
            })
        });

        // Full cycle with shaped decay and release
        let config = EnvelopeConfig {
            decay_curve: CurveMode::Exponential,
            release_curve: CurveMode::Logarithmic,
            ..EnvelopeConfig::adsr(50.0, 200.0, 0.5, 400.0).with_hold(30.0)
        };
        let mut env = EnvelopeEngine::new(config);
        group.bench_with_input(BenchmarkId::new("cycle", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                env.reset();
                env.note_on(0.0, 60);
                let release_at = ticks / 2;
                for i in 0..ticks {
                    let now = i as f64 * TICK_MS;
                    if i == release_at {
                        env.note_off(now, Some(60));
                    }
                    black_box(env.tick(black_box(now)));
                }
            })
        });
    }

    group.finish();
}
