//! Benchmarks for control-rate primitives.

mod curve;
mod envelope;
mod lfo;

pub use curve::bench_curve;
pub use envelope::bench_envelope;
pub use lfo::bench_lfo;
