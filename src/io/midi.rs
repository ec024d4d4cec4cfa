/// Note and system real-time messages the engine reacts to.
///
/// Channels are 1-based (1..=16) everywhere outside the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    Clock,
    Start,
    Continue,
    Stop,
}

pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;
pub const CLOCK: u8 = 0xF8;
pub const START: u8 = 0xFA;
pub const CONTINUE: u8 = 0xFB;
pub const STOP: u8 = 0xFC;

impl MidiEvent {
    /// Decode one complete message as delivered by a MIDI input callback.
    ///
    /// Note-on with velocity 0 is reported as note-off. Any other channel
    /// message, and anything truncated, yields `None`.
    pub fn parse(bytes: &[u8]) -> Option<MidiEvent> {
        let (&status, data) = bytes.split_first()?;

        match status {
            CLOCK => return Some(MidiEvent::Clock),
            START => return Some(MidiEvent::Start),
            CONTINUE => return Some(MidiEvent::Continue),
            STOP => return Some(MidiEvent::Stop),
            _ => {}
        }

        let channel = (status & 0x0F) + 1;
        let data1 = data.first().map(|b| b & 0x7F);
        let data2 = data.get(1).map(|b| b & 0x7F);

        match (status & 0xF0, data1, data2) {
            (0x80, Some(key), Some(velocity)) => Some(MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            }),
            (0x90, Some(key), Some(0)) => Some(MidiEvent::NoteOff {
                channel,
                key,
                velocity: 0,
            }),
            (0x90, Some(key), Some(velocity)) => Some(MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            }),
            _ => None,
        }
    }
}

/// Encode a controller change; `channel` is clamped to 1..=16.
pub fn control_change_bytes(channel: u8, controller: u8, value: u8) -> [u8; 3] {
    let channel = channel.clamp(1, 16) - 1;
    [STATUS_CONTROL_CHANGE | channel, controller & 0x7F, value & 0x7F]
}
