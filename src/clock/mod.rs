//! External MIDI clock: tempo estimate and transport state.

pub mod tracker;

pub use tracker::{ClockTracker, ClockTrackerConfig};
