//! MIDI device plumbing through midir.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use midimod::io::{midi::control_change_bytes, InputRouter, MidiSink};

const CLIENT_NAME: &str = "midimod";

/// Controller output on a real port.
pub struct MidirSink {
    connection: MidiOutputConnection,
}

impl MidiSink for MidirSink {
    fn send_controller_change(&mut self, channel: u8, controller: u8, value: u8) {
        let bytes = control_change_bytes(channel, controller, value);
        if let Err(err) = self.connection.send(&bytes) {
            log::debug!("send failed: {}", err);
        }
    }
}

/// Prints every message instead of sending it.
pub struct LogSink;

impl MidiSink for LogSink {
    fn send_controller_change(&mut self, channel: u8, controller: u8, value: u8) {
        log::info!("ch{:>2} cc{:>3} = {:>3}", channel, controller, value);
    }
}

pub fn list_ports() -> EyreResult<()> {
    let midi_in = MidiInput::new(CLIENT_NAME).wrap_err("failed to create MIDI input client")?;
    let midi_out = MidiOutput::new(CLIENT_NAME).wrap_err("failed to create MIDI output client")?;

    println!("Inputs:");
    for (i, port) in midi_in.ports().iter().enumerate() {
        let name = midi_in
            .port_name(port)
            .wrap_err("failed to read input port name")?;
        println!("  {}: {}", i, name);
    }

    println!("Outputs:");
    for (i, port) in midi_out.ports().iter().enumerate() {
        let name = midi_out
            .port_name(port)
            .wrap_err("failed to read output port name")?;
        println!("  {}: {}", i, name);
    }

    Ok(())
}

pub fn open_output(index: usize) -> EyreResult<MidirSink> {
    let midi_out = MidiOutput::new(CLIENT_NAME).wrap_err("failed to create MIDI output client")?;
    let ports = midi_out.ports();
    let port = ports
        .get(index)
        .ok_or_else(|| eyre!("no output port {} ({} available)", index, ports.len()))?;
    let name = midi_out
        .port_name(port)
        .wrap_err("failed to read output port name")?;

    let connection = midi_out
        .connect(port, "midimod-out")
        .map_err(|err| eyre!("failed to open output {}: {}", name, err))?;

    log::info!("output: {}", name);
    Ok(MidirSink { connection })
}

/// Open input `router.device()`. The router runs on midir's callback thread;
/// timestamps are midir's microsecond stamps.
pub fn open_input(router: InputRouter) -> EyreResult<MidiInputConnection<InputRouter>> {
    let mut midi_in = MidiInput::new(CLIENT_NAME).wrap_err("failed to create MIDI input client")?;
    // Clock pulses are timing messages; keep them.
    midi_in.ignore(Ignore::SysexAndActiveSense);

    let index = router.device();
    let ports = midi_in.ports();
    let port = ports
        .get(index)
        .ok_or_else(|| eyre!("no input port {} ({} available)", index, ports.len()))?;
    let name = midi_in
        .port_name(port)
        .wrap_err("failed to read input port name")?;

    let connection = midi_in
        .connect(
            port,
            "midimod-in",
            |stamp_us, message, router: &mut InputRouter| {
                router.handle_bytes(stamp_us as f64 / 1000.0, message);
            },
            router,
        )
        .map_err(|err| eyre!("failed to open input {}: {}", name, err))?;

    log::info!("input: {}", name);
    Ok(connection)
}
