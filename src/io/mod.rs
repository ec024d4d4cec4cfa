// Purpose - external interfaces: MIDI parsing, outbound sink, input routing

pub mod midi;
pub mod router;
pub mod sink;

pub use midi::MidiEvent;
pub use router::InputRouter;
pub use sink::{ControllerMessage, MidiSink, RecordingSink};
