use super::{ParameterDescriptor, ParameterTable};

/// General-purpose destinations: the common General MIDI controllers plus
/// a pair of 14-bit NRPN slots for high-resolution targets.
///
/// Session files can replace this table entirely.
pub(super) fn table() -> ParameterTable {
    ParameterTable::new(vec![
        ParameterDescriptor::cc("Modulation Wheel", 1, 0, 127),
        ParameterDescriptor::cc("Breath", 2, 0, 127),
        ParameterDescriptor::cc("Volume", 7, 0, 127),
        ParameterDescriptor::cc("Balance", 8, 0, 127).centred(),
        ParameterDescriptor::cc("Pan", 10, 0, 127).centred(),
        ParameterDescriptor::cc("Expression", 11, 0, 127),
        ParameterDescriptor::cc("Effect 1", 12, 0, 127),
        ParameterDescriptor::cc("Effect 2", 13, 0, 127),
        ParameterDescriptor::cc("Timbre", 71, 0, 127),
        ParameterDescriptor::cc("Release Time", 72, 0, 127),
        ParameterDescriptor::cc("Attack Time", 73, 0, 127),
        ParameterDescriptor::cc("Brightness", 74, 0, 127),
        ParameterDescriptor::cc("Decay Time", 75, 0, 127),
        ParameterDescriptor::cc("Vibrato Rate", 76, 0, 127),
        ParameterDescriptor::cc("Vibrato Depth", 77, 0, 127),
        ParameterDescriptor::cc("Vibrato Delay", 78, 0, 127),
        ParameterDescriptor::cc("Reverb Send", 91, 0, 127),
        ParameterDescriptor::cc("Chorus Send", 93, 0, 127),
        ParameterDescriptor::nrpn("Hi-Res Cutoff", 1, 20, 0, 16383),
        ParameterDescriptor::nrpn("Hi-Res Detune", 1, 21, 0, 16383).centred(),
    ])
}
