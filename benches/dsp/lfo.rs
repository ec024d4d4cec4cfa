//! Benchmarks for the LFO bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midimod::{
    dsp::lfo::Waveform,
    modulation::{LfoBank, RouteConfig},
    params::ParameterTable,
    TICK_RATE_HZ,
};

use crate::TICK_COUNTS;

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");
    let params = ParameterTable::default();

    for &ticks in TICK_COUNTS {
        for waveform in [Waveform::Sine, Waveform::Triangle, Waveform::Random] {
            let route = |channel, parameter_index, bipolar| RouteConfig {
                waveform,
                bipolar,
                ..RouteConfig::on_channel(channel, parameter_index)
            };
            let mut bank = LfoBank::new(
                [route(1, 0, false), route(2, 4, true), route(3, 18, false)],
                TICK_RATE_HZ,
            );
            bank.start();

            let id = BenchmarkId::new(format!("{:?}", waveform).to_lowercase(), ticks);
            group.bench_with_input(id, &ticks, |b, &ticks| {
                b.iter(|| {
                    for _ in 0..ticks {
                        bank.tick(black_box(3.0), &params, |sample| {
                            black_box(sample);
                        });
                    }
                })
            });
        }
    }

    group.finish();
}
