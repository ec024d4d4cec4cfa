//! LFO routes and their rate source.

pub mod lfo_bank;
pub mod rate;

pub use lfo_bank::{LfoBank, RouteConfig, RouteSample, ROUTE_COUNT};
pub use rate::{effective_rate_hz, RateSettings, SyncDivision, SyncMode};
