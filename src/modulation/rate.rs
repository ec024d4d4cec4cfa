#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sequencing::Duration;

/// Where the LFO rate comes from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Manual rate in Hz.
    #[default]
    Free,
    /// Follow the external MIDI clock; manual rate is the fallback.
    MidiClock,
}

/// Musical division one LFO cycle lasts when clock-synced.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncDivision {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    DottedEighth,
    DottedSixteenth,
    QuarterTriplet,
    EighthTriplet,
}

impl SyncDivision {
    pub const ALL: [SyncDivision; 10] = [
        SyncDivision::Whole,
        SyncDivision::Half,
        SyncDivision::Quarter,
        SyncDivision::Eighth,
        SyncDivision::Sixteenth,
        SyncDivision::ThirtySecond,
        SyncDivision::DottedEighth,
        SyncDivision::DottedSixteenth,
        SyncDivision::QuarterTriplet,
        SyncDivision::EighthTriplet,
    ];

    pub fn duration(self) -> Duration {
        match self {
            SyncDivision::Whole => Duration::WHOLE,
            SyncDivision::Half => Duration::HALF,
            SyncDivision::Quarter => Duration::QUARTER,
            SyncDivision::Eighth => Duration::EIGHTH,
            SyncDivision::Sixteenth => Duration::SIXTEENTH,
            SyncDivision::ThirtySecond => Duration::THIRTY_SECOND,
            SyncDivision::DottedEighth => Duration::DOTTED_EIGHTH,
            SyncDivision::DottedSixteenth => Duration::DOTTED_SIXTEENTH,
            SyncDivision::QuarterTriplet => Duration::QUARTER_TRIPLET,
            SyncDivision::EighthTriplet => Duration::EIGHTH_TRIPLET,
        }
    }

    /// LFO cycles per quarter-note beat.
    pub fn multiplier(self) -> f64 {
        self.duration().cycles_per_beat()
    }

    pub fn label(self) -> &'static str {
        match self {
            SyncDivision::Whole => "1/1",
            SyncDivision::Half => "1/2",
            SyncDivision::Quarter => "1/4",
            SyncDivision::Eighth => "1/8",
            SyncDivision::Sixteenth => "1/16",
            SyncDivision::ThirtySecond => "1/32",
            SyncDivision::DottedEighth => "1/8.",
            SyncDivision::DottedSixteenth => "1/16.",
            SyncDivision::QuarterTriplet => "1/4T",
            SyncDivision::EighthTriplet => "1/8T",
        }
    }
}

/// Rate source settings shared by every route.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSettings {
    pub manual_hz: f64,
    pub sync: SyncMode,
    pub division: SyncDivision,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            manual_hz: 2.0,
            sync: SyncMode::Free,
            division: SyncDivision::Quarter,
        }
    }
}

impl RateSettings {
    /// Rate for this tick given the current clock estimate.
    pub fn effective_hz(&self, bpm: f64) -> f64 {
        effective_rate_hz(self.manual_hz, self.sync, bpm, self.division)
    }
}

/// `bpm / 60 × division multiplier` when synced and an estimate exists,
/// otherwise the manual rate. Invalid manual rates become 0 Hz.
pub fn effective_rate_hz(manual_hz: f64, sync: SyncMode, bpm: f64, division: SyncDivision) -> f64 {
    let manual = if manual_hz.is_finite() && manual_hz > 0.0 {
        manual_hz
    } else {
        0.0
    };

    match sync {
        SyncMode::MidiClock if bpm.is_finite() && bpm > 0.0 => {
            (bpm / 60.0) * division.multiplier()
        }
        _ => manual,
    }
}
