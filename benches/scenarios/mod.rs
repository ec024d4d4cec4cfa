//! Real-world scenario benchmarks.
//!
//! These model the host loop: events drained from the inbox, every route
//! active, envelope running, all values pushed through the throttle.

mod dispatch;
mod tick;

pub use dispatch::bench_dispatch;
pub use tick::bench_tick;
