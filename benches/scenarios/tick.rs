//! Benchmarks for complete engine ticks.
//!
//! Every route enabled, envelope following notes, values recorded by an
//! in-memory sink that is drained between iterations.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use midimod::{
    clock::ClockTracker,
    dsp::{envelope::EnvelopeConfig, lfo::Waveform},
    engine::{inbox, ControlEvent, EngineSettings, EnvelopeRouting, ModEngine, NoteSource},
    io::RecordingSink,
    modulation::{RateSettings, RouteConfig, SyncMode},
    output::ThrottleSettings,
    params::ParameterTable,
};

use crate::TICK_COUNTS;

const TICK_MS: f64 = 10.0;

fn busy_settings(throttle: ThrottleSettings) -> EngineSettings {
    EngineSettings {
        routes: [
            RouteConfig {
                waveform: Waveform::Sine,
                ..RouteConfig::on_channel(1, 11)
            },
            RouteConfig {
                waveform: Waveform::Triangle,
                bipolar: true,
                ..RouteConfig::on_channel(2, 4)
            },
            RouteConfig {
                waveform: Waveform::Saw,
                ..RouteConfig::on_channel(3, 18)
            },
        ],
        rate: RateSettings {
            manual_hz: 4.0,
            ..RateSettings::default()
        },
        throttle,
        envelope: EnvelopeConfig::adsr(100.0, 200.0, 0.6, 300.0),
        envelope_routing: EnvelopeRouting {
            source: NoteSource::Any,
            channel: 4,
            parameter_index: 19,
        },
        note_restart: NoteSource::Channel(1),
    }
}

pub fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/tick");

    for &ticks in TICK_COUNTS {
        // === FREE RUNNING ===
        // all routes + envelope, no throttling beyond value changes
        let (mut tx, rx) = inbox(64);
        let mut engine = ModEngine::new(
            busy_settings(ThrottleSettings::default()),
            Arc::new(ParameterTable::default()),
            Arc::new(ClockTracker::default()),
            rx,
            RecordingSink::new(),
        );
        engine.handle_event(0.0, ControlEvent::StartLfo);

        group.bench_with_input(BenchmarkId::new("free", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                tx.post(ControlEvent::NoteOn { channel: 1, note: 60 });
                for i in 0..ticks {
                    black_box(engine.tick(black_box(i as f64 * TICK_MS)));
                }
                tx.post(ControlEvent::NoteOff { channel: 1, note: 60 });
                engine.sink_mut().take();
            })
        });

        // === CLOCK SYNCED ===
        // rate re-derived from the tracker's estimate every tick
        let clock = Arc::new(ClockTracker::default());
        clock.start(0);
        let interval = 60_000.0 / (128.0 * 24.0);
        for i in 0..96 {
            clock.on_pulse(0, i as f64 * interval);
        }

        let (_tx, rx) = inbox(64);
        let mut settings = busy_settings(ThrottleSettings {
            change_threshold: 2,
            min_interval_ms: 20.0,
        });
        settings.rate.sync = SyncMode::MidiClock;
        let mut engine = ModEngine::new(
            settings,
            Arc::new(ParameterTable::default()),
            clock,
            rx,
            RecordingSink::new(),
        );
        engine.handle_event(0.0, ControlEvent::StartLfo);

        group.bench_with_input(BenchmarkId::new("synced", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                for i in 0..ticks {
                    black_box(engine.tick(black_box(i as f64 * TICK_MS)));
                }
                engine.sink_mut().take();
            })
        });
    }

    group.finish();
}
