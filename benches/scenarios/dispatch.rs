//! Benchmarks for the output dispatcher.
//!
//! Measures the throttle lookup on its own: mostly-dropped sends versus
//! every send going out as a four-message NRPN group.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midimod::{
    io::RecordingSink,
    output::{OutputDispatcher, RouteKey, ThrottleSettings},
    params::ParameterDescriptor,
};

use crate::TICK_COUNTS;

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/dispatch");
    let cc = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
    let nrpn = ParameterDescriptor::nrpn("Hi-Res Cutoff", 1, 20, 0, 16383);

    for &ticks in TICK_COUNTS {
        // Slow ramp under a coarse threshold: most sends are dropped
        let mut out = OutputDispatcher::new(
            RecordingSink::new(),
            ThrottleSettings {
                change_threshold: 8,
                min_interval_ms: 0.0,
            },
        );
        group.bench_with_input(BenchmarkId::new("throttled_cc", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                for i in 0..ticks {
                    let value = (i % 128) as i32;
                    black_box(out.send(RouteKey::Lfo(0), 1, &cc, value, i as f64 * 10.0));
                }
                out.sink_mut().take();
            })
        });

        // Every value changes enough to send
        let mut out = OutputDispatcher::new(
            RecordingSink::new(),
            ThrottleSettings {
                change_threshold: 0,
                min_interval_ms: 0.0,
            },
        );
        group.bench_with_input(BenchmarkId::new("nrpn", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                for i in 0..ticks {
                    let value = ((i * 97) % 16384) as i32;
                    black_box(out.send(RouteKey::Envelope, 1, &nrpn, value, i as f64 * 10.0));
                }
                out.sink_mut().take();
            })
        });
    }

    group.finish();
}
