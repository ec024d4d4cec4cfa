use rtrb::{Consumer, Producer, RingBuffer};

/// Events posted to the tick driver from input callbacks or the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    NoteOn { channel: u8, note: u8 },
    NoteOff { channel: u8, note: u8 },
    TransportStart,
    TransportContinue,
    TransportStop,
    StartLfo,
    StopLfo,
}

pub const INBOX_CAPACITY: usize = 256;

/// Producer half, owned by exactly one writer.
pub struct InboxSender {
    tx: Producer<ControlEvent>,
}

/// Consumer half, drained by the tick driver.
pub struct Inbox {
    rx: Consumer<ControlEvent>,
}

pub fn inbox(capacity: usize) -> (InboxSender, Inbox) {
    let (tx, rx) = RingBuffer::<ControlEvent>::new(capacity.max(1));
    (InboxSender { tx }, Inbox { rx })
}

impl InboxSender {
    /// Post an event. A full inbox drops the event.
    pub fn post(&mut self, event: ControlEvent) -> bool {
        match self.tx.push(event) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("control inbox full, dropped {:?}", event);
                false
            }
        }
    }
}

impl Inbox {
    pub fn pop(&mut self) -> Option<ControlEvent> {
        self.rx.pop().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
