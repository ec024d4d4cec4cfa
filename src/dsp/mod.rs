//! Control-rate signal primitives.
//!
//! These components are allocation-free and own no I/O, so the tick driver
//! can call them from its periodic loop without blocking. They stay focused
//! on the math; routing and MIDI mapping live in `modulation` and `engine`.

/// Stage curve shaping and attack modes.
pub mod curve;
/// Attack/hold/decay/sustain/release envelope engine.
pub mod envelope;
/// LFO waveform law and start-phase policy.
pub mod lfo;

pub use envelope::{EnvelopeConfig, EnvelopeEngine, EnvelopeStage};
pub use lfo::Waveform;
