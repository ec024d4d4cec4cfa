//! Session setup and the fixed-rate driver loop.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

use midimod::{
    clock::ClockTracker,
    config::SessionConfig,
    engine::{inbox, ControlEvent, ModEngine, INBOX_CAPACITY},
    io::{InputRouter, MidiSink},
    modulation::SyncMode,
    TICK_RATE_HZ,
};

use super::transport::{self, LogSink};
use super::Cli;

type DynSink = Option<Box<dyn MidiSink + Send>>;

/// Smooths the published tempo once more for display, and rate-limits
/// how often it is reported.
struct BpmReadout {
    displayed: f64,
    last_report: Instant,
}

impl BpmReadout {
    const INTERVAL: Duration = Duration::from_secs(2);

    fn new() -> Self {
        Self {
            displayed: 0.0,
            last_report: Instant::now(),
        }
    }

    fn update(&mut self, bpm: f64, rate_hz: f64) {
        if bpm > 0.0 {
            self.displayed = if self.displayed > 0.0 {
                0.9 * self.displayed + 0.1 * bpm
            } else {
                bpm
            };
        }

        if self.last_report.elapsed() < Self::INTERVAL {
            return;
        }
        self.last_report = Instant::now();

        if bpm > 0.0 {
            log::info!("clock {:.1} BPM, LFO {:.2} Hz", self.displayed, rate_hz);
        } else {
            log::info!("clock --, LFO {:.2} Hz (manual)", rate_hz);
        }
    }
}

pub fn run(cli: Cli) -> EyreResult<()> {
    let session = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .wrap_err_with(|| format!("failed to load session {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let tick_hz = cli.tick_hz.unwrap_or(TICK_RATE_HZ);
    if !(tick_hz.is_finite() && tick_hz > 0.0) {
        return Err(eyre!("tick rate must be positive, got {}", tick_hz));
    }

    let params = Arc::new(session.parameter_table());
    let clock = Arc::new(ClockTracker::new(session.clock));
    let (tx, rx) = inbox(INBOX_CAPACITY);
    let synced = session.engine.rate.sync == SyncMode::MidiClock;

    let _input = match cli.input {
        Some(index) => {
            if synced {
                clock.start(index);
            }
            let router = InputRouter::new(index, Arc::clone(&clock), tx);
            Some(transport::open_input(router)?)
        }
        None => {
            if synced {
                log::warn!("clock sync selected without an input, using the manual rate");
            }
            None
        }
    };

    let sink: DynSink = if cli.dry_run {
        Some(Box::new(LogSink))
    } else if let Some(index) = cli.output {
        Some(Box::new(transport::open_output(index)?))
    } else {
        log::warn!("no output selected, nothing will be sent");
        None
    };

    log::info!(
        "{} parameters, tick {} Hz, {:?} sync",
        params.len(),
        tick_hz,
        session.engine.rate.sync
    );

    let mut engine = ModEngine::with_tick_rate(
        session.engine,
        params,
        Arc::clone(&clock),
        rx,
        sink,
        tick_hz,
    );

    if cli.start {
        engine.handle_event(0.0, ControlEvent::StartLfo);
    }

    println!("Running... Press Ctrl+C to stop");
    drive(&mut engine, tick_hz);
    Ok(())
}

/// Tick against wall-clock deadlines so sleep jitter does not accumulate.
fn drive(engine: &mut ModEngine<DynSink>, tick_hz: f64) {
    let period = Duration::from_secs_f64(1.0 / tick_hz);
    let origin = Instant::now();
    let mut deadline = origin;
    let mut readout = BpmReadout::new();

    loop {
        let now_ms = origin.elapsed().as_secs_f64() * 1000.0;
        engine.tick(now_ms);
        readout.update(engine.clock().bpm(), engine.current_rate_hz());

        deadline += period;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else {
            // Fell behind; resynchronise instead of bursting.
            deadline = now;
        }
    }
}
