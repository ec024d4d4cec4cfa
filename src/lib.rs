pub mod clock; // External MIDI clock tracking
pub mod dsp; // Control-rate envelope, LFO and curve primitives
pub mod engine; // Tick driver and control inbox
pub mod io;
pub mod modulation; // LFO routes and rate source
pub mod output; // Throttled CC/NRPN dispatch
pub mod params;
pub mod sequencing; // Musical durations

#[cfg(feature = "serde")]
pub mod config;

/// Rate the engine expects to be ticked at.
pub const TICK_RATE_HZ: f64 = 100.0;
/// MIDI clock resolution.
pub const PULSES_PER_QUARTER: u32 = 24;
pub(crate) const MIN_TIME_MS: f64 = 1e-6;
