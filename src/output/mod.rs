//! Throttled controller output.

pub mod dispatcher;

pub use dispatcher::{encode, MessageGroup, OutputDispatcher, RouteKey, ThrottleSettings};
