use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    io::sink::MidiSink,
    params::{ParameterAddress, ParameterDescriptor},
};

/*
Output Dispatcher
=================

Every value headed for the wire passes two gates, kept per throttle key
(route + parameter address):

    |value − last_sent| < change_threshold      → drop
    now − last_send < min_interval_ms           → drop

The first value for a key always goes out. Gate state is only updated
when a message is actually transmitted, so a run of small steps still
adds up to a send once it crosses the threshold.

A send is atomic: a CC is one message, an NRPN is four, and the gates
decide for the group as a whole.

    NRPN   CC 99  parameter MSB
           CC 98  parameter LSB
           CC  6  value >> 7
           CC 38  value & 0x7F
*/

pub const NRPN_PARAM_MSB: u8 = 99;
pub const NRPN_PARAM_LSB: u8 = 98;
pub const DATA_ENTRY_MSB: u8 = 6;
pub const DATA_ENTRY_LSB: u8 = 38;

/// Which generator a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Lfo(usize),
    Envelope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ThrottleKey {
    route: RouteKey,
    address: ParameterAddress,
}

#[derive(Debug, Clone, Copy)]
struct ThrottleEntry {
    last_value: i32,
    last_send_ms: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleSettings {
    /// Minimum step between transmitted values; 0 sends every value.
    pub change_threshold: u32,
    /// Minimum time between transmissions per key; 0 disables.
    pub min_interval_ms: f64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            change_threshold: 1,
            min_interval_ms: 0.0,
        }
    }
}

/// Controller messages making up one send, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageGroup {
    messages: [(u8, u8); 4],
    len: usize,
}

impl MessageGroup {
    pub fn as_slice(&self) -> &[(u8, u8)] {
        &self.messages[..self.len]
    }
}

/// Encode `value` for `address`. The value is clamped to the wire range.
pub fn encode(address: ParameterAddress, value: i32) -> MessageGroup {
    let value = value.clamp(0, address.max_wire_value());
    match address {
        ParameterAddress::Cc { controller } => MessageGroup {
            messages: [(controller & 0x7F, value as u8), (0, 0), (0, 0), (0, 0)],
            len: 1,
        },
        ParameterAddress::Nrpn { msb, lsb } => MessageGroup {
            messages: [
                (NRPN_PARAM_MSB, msb & 0x7F),
                (NRPN_PARAM_LSB, lsb & 0x7F),
                (DATA_ENTRY_MSB, ((value >> 7) & 0x7F) as u8),
                (DATA_ENTRY_LSB, (value & 0x7F) as u8),
            ],
            len: 4,
        },
    }
}

pub struct OutputDispatcher<S: MidiSink> {
    sink: S,
    settings: ThrottleSettings,
    entries: HashMap<ThrottleKey, ThrottleEntry>,
}

impl<S: MidiSink> OutputDispatcher<S> {
    pub fn new(sink: S, settings: ThrottleSettings) -> Self {
        Self {
            sink,
            settings,
            entries: HashMap::new(),
        }
    }

    pub fn settings(&self) -> ThrottleSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: ThrottleSettings) {
        self.settings = settings;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Throttle and transmit one value. Returns whether anything was sent.
    ///
    /// Missing sinks and channels outside 1..=16 are silent no-ops.
    pub fn send(
        &mut self,
        route: RouteKey,
        channel: u8,
        param: &ParameterDescriptor,
        value: i32,
        now_ms: f64,
    ) -> bool {
        if !self.sink.is_available() || !(1..=16).contains(&channel) {
            return false;
        }

        let address = param.address;
        let value = value.clamp(0, address.max_wire_value());
        let key = ThrottleKey { route, address };

        if let Some(entry) = self.entries.get(&key) {
            if value.abs_diff(entry.last_value) < self.settings.change_threshold {
                return false;
            }
            let min_interval = self.settings.min_interval_ms;
            if min_interval > 0.0 && now_ms - entry.last_send_ms < min_interval {
                return false;
            }
        }

        for &(controller, data) in encode(address, value).as_slice() {
            self.sink.send_controller_change(channel, controller, data);
        }
        log::trace!(
            "{:?} ch{} {} = {}",
            route,
            channel,
            param.name,
            value
        );

        self.entries.insert(
            key,
            ThrottleEntry {
                last_value: value,
                last_send_ms: now_ms,
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sink::RecordingSink;

    fn dispatcher(change_threshold: u32, min_interval_ms: f64) -> OutputDispatcher<RecordingSink> {
        OutputDispatcher::new(
            RecordingSink::new(),
            ThrottleSettings {
                change_threshold,
                min_interval_ms,
            },
        )
    }

    #[test]
    fn nrpn_is_four_messages_in_order() {
        let mut out = dispatcher(1, 0.0);
        let param = ParameterDescriptor::nrpn("Fine", 1, 2, 0, 16383);
        assert!(out.send(RouteKey::Lfo(0), 1, &param, 300, 0.0));
        assert_eq!(out.sink().pairs(), vec![(99, 1), (98, 2), (6, 2), (38, 44)]);
    }

    #[test]
    fn cc_is_one_message() {
        let mut out = dispatcher(1, 0.0);
        let param = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
        out.send(RouteKey::Lfo(0), 5, &param, 99, 0.0);
        let messages = out.sink().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].channel, 5);
        assert_eq!((messages[0].controller, messages[0].value), (74, 99));
    }

    #[test]
    fn both_gates_close_yields_one_message() {
        let mut out = dispatcher(4, 50.0);
        let param = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
        assert!(out.send(RouteKey::Lfo(0), 1, &param, 60, 0.0));
        assert!(!out.send(RouteKey::Lfo(0), 1, &param, 62, 10.0));
        assert_eq!(out.sink().messages().len(), 1);
    }

    #[test]
    fn change_threshold_accumulates_small_steps() {
        let mut out = dispatcher(4, 0.0);
        let param = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
        out.send(RouteKey::Lfo(0), 1, &param, 10, 0.0);
        assert!(!out.send(RouteKey::Lfo(0), 1, &param, 12, 1.0));
        assert!(!out.send(RouteKey::Lfo(0), 1, &param, 13, 2.0));
        assert!(out.send(RouteKey::Lfo(0), 1, &param, 14, 3.0));
    }

    #[test]
    fn interval_gate_holds_large_changes() {
        let mut out = dispatcher(1, 20.0);
        let param = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
        out.send(RouteKey::Lfo(0), 1, &param, 0, 100.0);
        assert!(!out.send(RouteKey::Lfo(0), 1, &param, 127, 110.0));
        assert!(out.send(RouteKey::Lfo(0), 1, &param, 127, 120.0));
    }

    #[test]
    fn zero_threshold_repeats_values() {
        let mut out = dispatcher(0, 0.0);
        let param = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
        out.send(RouteKey::Lfo(0), 1, &param, 7, 0.0);
        out.send(RouteKey::Lfo(0), 1, &param, 7, 10.0);
        assert_eq!(out.sink().messages().len(), 2);
    }

    #[test]
    fn keys_are_independent_per_route_and_parameter() {
        let mut out = dispatcher(8, 1000.0);
        let cutoff = ParameterDescriptor::cc("Cutoff", 74, 0, 127);
        let pan = ParameterDescriptor::cc("Pan", 10, 0, 127);
        assert!(out.send(RouteKey::Lfo(0), 1, &cutoff, 50, 0.0));
        assert!(out.send(RouteKey::Lfo(1), 1, &cutoff, 50, 0.0));
        assert!(out.send(RouteKey::Envelope, 1, &cutoff, 50, 0.0));
        assert!(out.send(RouteKey::Lfo(0), 1, &pan, 50, 0.0));
        assert_eq!(out.sink().messages().len(), 4);
    }

    #[test]
    fn missing_sink_and_bad_channel_are_no_ops() {
        let param = ParameterDescriptor::cc("Cutoff", 74, 0, 127);

        let mut none: OutputDispatcher<Option<RecordingSink>> =
            OutputDispatcher::new(None, ThrottleSettings::default());
        assert!(!none.send(RouteKey::Lfo(0), 1, &param, 10, 0.0));

        let mut out = dispatcher(1, 0.0);
        assert!(!out.send(RouteKey::Lfo(0), 0, &param, 10, 0.0));
        assert!(!out.send(RouteKey::Lfo(0), 17, &param, 10, 0.0));
        // a dropped send leaves no throttle state behind
        assert!(out.send(RouteKey::Lfo(0), 1, &param, 10, 0.0));
    }

    #[test]
    fn values_are_clamped_to_wire_range() {
        let cc = encode(ParameterAddress::Cc { controller: 1 }, 500);
        assert_eq!(cc.as_slice(), &[(1, 127)]);

        let nrpn = encode(ParameterAddress::Nrpn { msb: 0, lsb: 0 }, -3);
        assert_eq!(nrpn.as_slice()[2..], [(6, 0), (38, 0)]);

        let top = encode(ParameterAddress::Nrpn { msb: 0, lsb: 0 }, 20_000);
        assert_eq!(top.as_slice()[2..], [(6, 127), (38, 127)]);
    }
}
