//! Benchmarks for curve shaping.

use std::hint::black_box;

use criterion::Criterion;
use midimod::dsp::curve::{shape_curve, AttackMode, CurveMode};

const STEPS: usize = 1000;

pub fn bench_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/curve");

    for (name, mode) in [
        ("linear", CurveMode::Linear),
        ("exponential", CurveMode::Exponential),
        ("logarithmic", CurveMode::Logarithmic),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                for i in 0..STEPS {
                    let t = i as f64 / STEPS as f64;
                    black_box(shape_curve(black_box(t), mode, 0.6));
                }
            })
        });
    }

    group.bench_function("snap_attack", |b| {
        b.iter(|| {
            for i in 0..STEPS {
                let t = i as f64 / STEPS as f64;
                black_box(AttackMode::Snap.shape(black_box(t), 6.0));
            }
        })
    });

    group.finish();
}
