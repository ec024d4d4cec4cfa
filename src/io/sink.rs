/// Outbound controller transport.
///
/// Implementations are fire-and-forget: a send on a closed or missing
/// device is silently dropped.
pub trait MidiSink {
    /// `channel` is 1..=16, `controller` and `value` are 0..=127.
    fn send_controller_change(&mut self, channel: u8, controller: u8, value: u8);

    /// Whether a device is currently open. Dispatch is skipped entirely
    /// (throttle state untouched) when this is false.
    fn is_available(&self) -> bool {
        true
    }
}

/// No device selected: every send is a no-op.
impl<S: MidiSink> MidiSink for Option<S> {
    fn send_controller_change(&mut self, channel: u8, controller: u8, value: u8) {
        if let Some(sink) = self {
            sink.send_controller_change(channel, controller, value);
        }
    }

    fn is_available(&self) -> bool {
        self.as_ref().is_some_and(|sink| sink.is_available())
    }
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send_controller_change(&mut self, channel: u8, controller: u8, value: u8) {
        (**self).send_controller_change(channel, controller, value)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerMessage {
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

/// Sink that keeps every message in memory, in send order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Vec<ControllerMessage>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ControllerMessage] {
        &self.messages
    }

    /// Drain the recorded messages.
    pub fn take(&mut self) -> Vec<ControllerMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Recorded messages as `(controller, value)` pairs.
    pub fn pairs(&self) -> Vec<(u8, u8)> {
        self.messages
            .iter()
            .map(|m| (m.controller, m.value))
            .collect()
    }
}

impl MidiSink for RecordingSink {
    fn send_controller_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.messages.push(ControllerMessage {
            channel,
            controller,
            value,
        });
    }
}
