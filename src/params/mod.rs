//! Destination parameter descriptors.
//!
//! The table is built once at start-up and shared read-only (behind an
//! `Arc`) by every component that maps or encodes values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::lfo::bipolar_to_unipolar;

mod builtin;

/// How a parameter is addressed on the wire.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterAddress {
    /// Single controller change, 7-bit value.
    Cc { controller: u8 },
    /// Four-message NRPN sequence, 14-bit value.
    Nrpn { msb: u8, lsb: u8 },
}

impl ParameterAddress {
    /// Largest value the wire encoding can carry.
    pub fn max_wire_value(self) -> i32 {
        match self {
            ParameterAddress::Cc { .. } => 0x7F,
            ParameterAddress::Nrpn { .. } => 0x3FFF,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub min_value: i32,
    pub max_value: i32,
    /// Parameter is centred (pan, detune, envelope depth...).
    #[cfg_attr(feature = "serde", serde(default))]
    pub bipolar: bool,
    pub address: ParameterAddress,
}

impl ParameterDescriptor {
    pub fn cc(name: &str, controller: u8, min_value: i32, max_value: i32) -> Self {
        Self {
            name: name.to_string(),
            min_value,
            max_value,
            bipolar: false,
            address: ParameterAddress::Cc { controller },
        }
    }

    pub fn nrpn(name: &str, msb: u8, lsb: u8, min_value: i32, max_value: i32) -> Self {
        Self {
            name: name.to_string(),
            min_value,
            max_value,
            bipolar: false,
            address: ParameterAddress::Nrpn { msb, lsb },
        }
    }

    pub fn centred(mut self) -> Self {
        self.bipolar = true;
        self
    }

    /// `(min, max)` with the bounds put in order.
    fn bounds(&self) -> (i32, i32) {
        if self.min_value <= self.max_value {
            (self.min_value, self.max_value)
        } else {
            (self.max_value, self.min_value)
        }
    }

    /// Map an LFO shape value (-1..+1) around the parameter centre.
    ///
    /// `center + round(shape · depth · half_range)`, clamped to the range.
    pub fn map_bipolar(&self, shape: f64, depth: f64) -> i32 {
        let (min, max) = self.bounds();
        let center = (min as f64 + max as f64) * 0.5;
        let half_range = (max as f64 - min as f64) * 0.5;
        let offset = finite_or_zero(shape * depth * half_range);
        clamp_round(center + offset, min, max)
    }

    /// Map an LFO shape value (-1..+1) up from the parameter minimum.
    ///
    /// The shape is normalised to 0..1 first, then scaled by depth.
    pub fn map_unipolar(&self, shape: f64, depth: f64) -> i32 {
        let (min, max) = self.bounds();
        let norm = crate::dsp::curve::clamp_unit(bipolar_to_unipolar(shape));
        let offset = finite_or_zero(norm * depth * (max as f64 - min as f64));
        clamp_round(min as f64 + offset, min, max)
    }

    /// Map an envelope level (0..1) onto the parameter.
    ///
    /// Centred parameters sweep from minimum through the centre to the
    /// maximum; others rise from the minimum.
    pub fn map_level(&self, level: f64) -> i32 {
        let level = crate::dsp::curve::clamp_unit(level);
        let (min, max) = self.bounds();
        if self.bipolar {
            let center = (min as f64 + max as f64) * 0.5;
            let half_range = (max as f64 - min as f64) * 0.5;
            clamp_round(center + (level * 2.0 - 1.0) * half_range, min, max)
        } else {
            clamp_round(min as f64 + level * (max as f64 - min as f64), min, max)
        }
    }
}

#[inline]
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

#[inline]
fn clamp_round(x: f64, min: i32, max: i32) -> i32 {
    (x.round() as i32).clamp(min, max)
}

/// Ordered, immutable list of destination parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    parameters: Vec<ParameterDescriptor>,
}

impl ParameterTable {
    pub fn new(parameters: Vec<ParameterDescriptor>) -> Self {
        Self { parameters }
    }

    /// Bounds-checked lookup; stale indices yield `None`.
    pub fn get(&self, index: usize) -> Option<&ParameterDescriptor> {
        self.parameters.get(index)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterTable {
    fn default() -> Self {
        builtin::table()
    }
}
