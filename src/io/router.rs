use std::sync::Arc;

use crate::{
    clock::ClockTracker,
    engine::inbox::{ControlEvent, InboxSender},
    io::midi::MidiEvent,
};

/// Runs inside the MIDI input callback: clock pulses go straight to the
/// tracker, notes and transport are posted to the engine inbox.
pub struct InputRouter {
    device: usize,
    clock: Arc<ClockTracker>,
    inbox: InboxSender,
}

impl InputRouter {
    pub fn new(device: usize, clock: Arc<ClockTracker>, inbox: InboxSender) -> Self {
        Self {
            device,
            clock,
            inbox,
        }
    }

    pub fn device(&self) -> usize {
        self.device
    }

    /// Handle one raw message received at `now_ms`.
    pub fn handle_bytes(&mut self, now_ms: f64, bytes: &[u8]) {
        if let Some(event) = MidiEvent::parse(bytes) {
            self.handle(now_ms, event);
        }
    }

    pub fn handle(&mut self, now_ms: f64, event: MidiEvent) {
        match event {
            MidiEvent::Clock => self.clock.on_pulse(self.device, now_ms),
            MidiEvent::NoteOn { channel, key, .. } => {
                self.inbox.post(ControlEvent::NoteOn { channel, note: key });
            }
            MidiEvent::NoteOff { channel, key, .. } => {
                self.inbox.post(ControlEvent::NoteOff { channel, note: key });
            }
            MidiEvent::Start => self.transport(ControlEvent::TransportStart),
            MidiEvent::Continue => self.transport(ControlEvent::TransportContinue),
            MidiEvent::Stop => self.transport(ControlEvent::TransportStop),
        }
    }

    // Transport only counts from the device the clock is following.
    fn transport(&mut self, event: ControlEvent) {
        if self.clock.source() != Some(self.device) {
            return;
        }
        match event {
            ControlEvent::TransportStart => self.clock.on_start(self.device),
            ControlEvent::TransportContinue => self.clock.on_continue(self.device),
            ControlEvent::TransportStop => self.clock.on_stop(self.device),
            _ => {}
        }
        log::debug!("transport {:?}", event);
        self.inbox.post(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::inbox::inbox;

    #[test]
    fn notes_reach_the_inbox() {
        let clock = Arc::new(ClockTracker::default());
        let (tx, mut rx) = inbox(16);
        let mut router = InputRouter::new(0, clock, tx);

        router.handle_bytes(0.0, &[0x90, 60, 100]);
        router.handle_bytes(1.0, &[0x90, 60, 0]);
        router.handle_bytes(2.0, &[0xB0, 1, 1]);

        assert_eq!(rx.pop(), Some(ControlEvent::NoteOn { channel: 1, note: 60 }));
        assert_eq!(rx.pop(), Some(ControlEvent::NoteOff { channel: 1, note: 60 }));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn transport_requires_clock_source() {
        let clock = Arc::new(ClockTracker::default());
        let (tx, mut rx) = inbox(16);
        let mut router = InputRouter::new(2, Arc::clone(&clock), tx);

        router.handle_bytes(0.0, &[0xFA]);
        assert_eq!(rx.pop(), None);
        assert!(!clock.is_running());

        clock.start(2);
        router.handle_bytes(0.0, &[0xFA]);
        assert_eq!(rx.pop(), Some(ControlEvent::TransportStart));
        assert!(clock.is_running());

        router.handle_bytes(0.0, &[0xFC]);
        assert_eq!(rx.pop(), Some(ControlEvent::TransportStop));
        assert!(!clock.is_running());
    }

    #[test]
    fn clock_pulses_feed_the_tracker() {
        let clock = Arc::new(ClockTracker::default());
        clock.start(0);
        let (tx, _rx) = inbox(16);
        let mut router = InputRouter::new(0, Arc::clone(&clock), tx);

        let interval = 60_000.0 / (120.0 * 24.0);
        for i in 0..48 {
            router.handle_bytes(i as f64 * interval, &[0xF8]);
        }
        assert!((clock.bpm() - 120.0).abs() < 0.5);
    }
}
