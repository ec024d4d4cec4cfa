//! Tick driver and the inbox that feeds it.

pub mod driver;
pub mod inbox;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::envelope::EnvelopeConfig,
    modulation::{RateSettings, RouteConfig, ROUTE_COUNT},
    output::ThrottleSettings,
};

pub use driver::ModEngine;
pub use inbox::{inbox, ControlEvent, Inbox, InboxSender, INBOX_CAPACITY};

/// Which incoming notes a feature listens to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSource {
    #[default]
    Off,
    Any,
    /// 1..=16
    Channel(u8),
}

impl NoteSource {
    pub fn matches(self, channel: u8) -> bool {
        match self {
            NoteSource::Off => false,
            NoteSource::Any => true,
            NoteSource::Channel(wanted) => wanted == channel,
        }
    }

    pub fn is_off(self) -> bool {
        self == NoteSource::Off
    }
}

/// Where the envelope listens and where its output goes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeRouting {
    /// `Off` disables the envelope entirely.
    pub source: NoteSource,
    /// Output channel 1..=16.
    pub channel: u8,
    pub parameter_index: usize,
}

impl Default for EnvelopeRouting {
    fn default() -> Self {
        Self {
            source: NoteSource::Off,
            channel: 1,
            parameter_index: 0,
        }
    }
}

/// Everything the tick driver needs besides its collaborators.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub routes: [RouteConfig; ROUTE_COUNT],
    pub rate: RateSettings,
    pub throttle: ThrottleSettings,
    pub envelope: EnvelopeConfig,
    pub envelope_routing: EnvelopeRouting,
    /// Notes that restart every LFO route.
    pub note_restart: NoteSource,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            routes: [
                RouteConfig::on_channel(1, 0),
                RouteConfig::default(),
                RouteConfig::default(),
            ],
            rate: RateSettings::default(),
            throttle: ThrottleSettings::default(),
            envelope: EnvelopeConfig::default(),
            envelope_routing: EnvelopeRouting::default(),
            note_restart: NoteSource::Off,
        }
    }
}
