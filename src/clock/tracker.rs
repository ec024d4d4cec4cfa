use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex, MutexGuard,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PULSES_PER_QUARTER;

/*
Clock Tracker
=============

Two sides with different rules:

    callback side                     tick side
    (MIDI input thread)               (100 Hz driver)

    on_pulse / on_start / ...         bpm() / is_running()
          │                                 ▲
          ▼                                 │
    Mutex<PulseTiming>  ──publish──►  AtomicU64 (bpm bits)
                                      AtomicBool (running)

The tick side only ever loads atomics and never waits. The mutex guards
the smoothing state and the active source; it is only contended between
input callbacks and the host switching devices.

Estimate
--------

    instant_bpm = 60_000 / (interval_ms × 24)
    smoothed    = smoothed + α·(instant − smoothed)

Nothing is published until `warmup_intervals` intervals have been seen;
until then `bpm()` reports 0.0, the "no estimate" sentinel. A gap longer
than `max_gap_ms` (clock paused, cable pulled) restarts the warmup but
leaves the last published estimate in place.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTrackerConfig {
    /// EMA weight of each new interval, 0..1.
    pub smoothing: f64,
    /// Intervals to observe before the first estimate is published.
    pub warmup_intervals: u32,
    /// Longer gaps between pulses restart the estimate.
    pub max_gap_ms: f64,
}

impl Default for ClockTrackerConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            warmup_intervals: 12,
            max_gap_ms: 1000.0,
        }
    }
}

#[derive(Debug, Default)]
struct PulseTiming {
    source: Option<usize>,
    last_pulse_ms: Option<f64>,
    intervals: u32,
    smoothed_bpm: f64,
}

impl PulseTiming {
    fn restart_estimate(&mut self) {
        self.last_pulse_ms = None;
        self.intervals = 0;
        self.smoothed_bpm = 0.0;
    }
}

/// Tempo and transport state derived from an external 24 PPQ clock.
#[derive(Debug)]
pub struct ClockTracker {
    config: ClockTrackerConfig,
    bpm_bits: AtomicU64,
    running: AtomicBool,
    timing: Mutex<PulseTiming>,
}

impl Default for ClockTracker {
    fn default() -> Self {
        Self::new(ClockTrackerConfig::default())
    }
}

impl ClockTracker {
    pub fn new(config: ClockTrackerConfig) -> Self {
        Self {
            config,
            bpm_bits: AtomicU64::new(0.0_f64.to_bits()),
            running: AtomicBool::new(false),
            timing: Mutex::new(PulseTiming::default()),
        }
    }

    // A panicking input callback must not take the clock down with it.
    fn timing(&self) -> MutexGuard<'_, PulseTiming> {
        self.timing.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, bpm: f64) {
        self.bpm_bits.store(bpm.to_bits(), Ordering::Release);
    }

    /// Smoothed tempo, or `0.0` while no estimate exists.
    pub fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm_bits.load(Ordering::Acquire))
    }

    pub fn has_estimate(&self) -> bool {
        self.bpm() > 0.0
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Device currently accepted as the clock source.
    pub fn source(&self) -> Option<usize> {
        self.timing().source
    }

    /// Listen to `device`. Switching from another device drops its
    /// estimate in the same step; starting the current device is a no-op.
    pub fn start(&self, device: usize) {
        let mut timing = self.timing();
        if timing.source == Some(device) {
            return;
        }

        let previous = timing.source.replace(device);
        timing.restart_estimate();
        self.publish(0.0);
        self.running.store(false, Ordering::Release);
        drop(timing);

        match previous {
            Some(old) => log::debug!("clock source switched {} -> {}", old, device),
            None => log::debug!("clock source {}", device),
        }
    }

    /// Stop listening. Idempotent.
    pub fn stop(&self) {
        let mut timing = self.timing();
        if timing.source.is_none() {
            return;
        }

        timing.source = None;
        timing.restart_estimate();
        self.publish(0.0);
        self.running.store(false, Ordering::Release);
        drop(timing);

        log::debug!("clock source stopped");
    }

    /// One timing pulse from `source` at `now_ms`. Pulses from any other
    /// device are ignored.
    pub fn on_pulse(&self, source: usize, now_ms: f64) {
        let mut timing = self.timing();
        if timing.source != Some(source) || !now_ms.is_finite() {
            return;
        }

        let Some(last) = timing.last_pulse_ms else {
            timing.last_pulse_ms = Some(now_ms);
            return;
        };

        let interval = now_ms - last;
        if interval <= 0.0 {
            return;
        }
        timing.last_pulse_ms = Some(now_ms);

        if interval > self.config.max_gap_ms {
            timing.intervals = 0;
            timing.smoothed_bpm = 0.0;
            return;
        }

        let instant = 60_000.0 / (interval * PULSES_PER_QUARTER as f64);
        let alpha = self.config.smoothing.clamp(0.0, 1.0);
        timing.smoothed_bpm = if timing.smoothed_bpm > 0.0 {
            timing.smoothed_bpm + alpha * (instant - timing.smoothed_bpm)
        } else {
            instant
        };
        timing.intervals = timing.intervals.saturating_add(1);

        if timing.intervals >= self.config.warmup_intervals {
            self.publish(timing.smoothed_bpm);
        }
    }

    pub fn on_start(&self, source: usize) {
        if self.accepts(source) {
            self.running.store(true, Ordering::Release);
        }
    }

    pub fn on_continue(&self, source: usize) {
        self.on_start(source)
    }

    pub fn on_stop(&self, source: usize) {
        if self.accepts(source) {
            self.running.store(false, Ordering::Release);
        }
    }

    fn accepts(&self, source: usize) -> bool {
        self.timing().source == Some(source)
    }
}
