use std::sync::Arc;

use crate::{
    clock::ClockTracker,
    dsp::envelope::{EnvelopeConfig, EnvelopeEngine},
    engine::{
        inbox::{ControlEvent, Inbox},
        EngineSettings, EnvelopeRouting, NoteSource,
    },
    io::sink::MidiSink,
    modulation::{LfoBank, RateSettings, RouteConfig},
    output::{OutputDispatcher, RouteKey, ThrottleSettings},
    params::ParameterTable,
    TICK_RATE_HZ,
};

/*
Tick Driver
===========

One `ModEngine` owns the envelope, the LFO bank and the dispatcher. It is
ticked from a single thread at roughly `TICK_RATE_HZ`; nothing inside it
is shared, so nothing inside it locks.

    input callback ──► InboxSender ──► Inbox ─┐
                  └──► ClockTracker (atomics) ─┤
                                               ▼
    tick(now_ms):   1. drain inbox   (notes, transport, start/stop)
                    2. LFO routes    (rate from manual or clock)
                    3. envelope      (mapped onto its parameter)
                                               │
                                               ▼
                                      OutputDispatcher ──► MidiSink

Draining comes first so a note that restarts the LFO takes effect on the
same tick it arrives.
*/

pub struct ModEngine<S: MidiSink> {
    params: Arc<ParameterTable>,
    clock: Arc<ClockTracker>,
    inbox: Inbox,
    lfo: LfoBank,
    rate: RateSettings,
    note_restart: NoteSource,
    envelope: EnvelopeEngine,
    envelope_routing: EnvelopeRouting,
    dispatcher: OutputDispatcher<S>,
}

impl<S: MidiSink> ModEngine<S> {
    pub fn new(
        settings: EngineSettings,
        params: Arc<ParameterTable>,
        clock: Arc<ClockTracker>,
        inbox: Inbox,
        sink: S,
    ) -> Self {
        Self::with_tick_rate(settings, params, clock, inbox, sink, TICK_RATE_HZ)
    }

    pub fn with_tick_rate(
        settings: EngineSettings,
        params: Arc<ParameterTable>,
        clock: Arc<ClockTracker>,
        inbox: Inbox,
        sink: S,
        tick_rate_hz: f64,
    ) -> Self {
        Self {
            params,
            clock,
            inbox,
            lfo: LfoBank::new(settings.routes, tick_rate_hz),
            rate: settings.rate,
            note_restart: settings.note_restart,
            envelope: EnvelopeEngine::new(settings.envelope),
            envelope_routing: settings.envelope_routing,
            dispatcher: OutputDispatcher::new(sink, settings.throttle),
        }
    }

    /// Run one cycle. Returns the number of values transmitted.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        while let Some(event) = self.inbox.pop() {
            self.handle_event(now_ms, event);
        }

        let mut sent = 0;
        let rate_hz = self.rate.effective_hz(self.clock.bpm());

        let Self {
            lfo,
            params,
            dispatcher,
            ..
        } = &mut *self;
        let table: &ParameterTable = params;
        lfo.tick(rate_hz, table, |sample| {
            if let Some(param) = table.get(sample.parameter_index) {
                let route = RouteKey::Lfo(sample.route);
                if dispatcher.send(route, sample.channel, param, sample.value, now_ms) {
                    sent += 1;
                }
            }
        });

        if self.envelope_routing.source.is_off() {
            return sent;
        }
        if let Some(level) = self.envelope.tick(now_ms) {
            let routing = self.envelope_routing;
            if let Some(param) = self.params.get(routing.parameter_index) {
                let value = param.map_level(level);
                if self
                    .dispatcher
                    .send(RouteKey::Envelope, routing.channel, param, value, now_ms)
                {
                    sent += 1;
                }
            }
        }

        sent
    }

    /// Apply one control event immediately, bypassing the inbox.
    pub fn handle_event(&mut self, now_ms: f64, event: ControlEvent) {
        match event {
            ControlEvent::NoteOn { channel, note } => {
                if self.envelope_routing.source.matches(channel) {
                    self.envelope.note_on(now_ms, note);
                }
                if self.note_restart.matches(channel) {
                    self.lfo.restart();
                }
            }
            ControlEvent::NoteOff { channel, note } => {
                if self.envelope_routing.source.matches(channel) {
                    self.envelope.note_off(now_ms, Some(note));
                }
            }
            ControlEvent::TransportStart | ControlEvent::StartLfo => self.lfo.start(),
            ControlEvent::TransportStop | ControlEvent::StopLfo => self.lfo.stop(),
            // The clock tracker already flipped its running flag.
            ControlEvent::TransportContinue => {}
        }
    }

    pub fn params(&self) -> &ParameterTable {
        &self.params
    }

    pub fn clock(&self) -> &ClockTracker {
        &self.clock
    }

    pub fn lfo(&self) -> &LfoBank {
        &self.lfo
    }

    pub fn envelope(&self) -> &EnvelopeEngine {
        &self.envelope
    }

    pub fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.dispatcher.sink_mut()
    }

    /// Rate currently driving the routes.
    pub fn current_rate_hz(&self) -> f64 {
        self.rate.effective_hz(self.clock.bpm())
    }

    pub fn set_rate(&mut self, rate: RateSettings) {
        self.rate = rate;
    }

    pub fn set_route(&mut self, route: usize, config: RouteConfig) {
        self.lfo.set_config(route, config);
    }

    pub fn set_throttle(&mut self, throttle: ThrottleSettings) {
        self.dispatcher.set_settings(throttle);
    }

    pub fn set_envelope(&mut self, config: EnvelopeConfig) {
        self.envelope.set_config(config);
    }

    pub fn set_envelope_routing(&mut self, routing: EnvelopeRouting) {
        if routing.source.is_off() {
            self.envelope.reset();
        }
        self.envelope_routing = routing;
    }

    pub fn set_note_restart(&mut self, source: NoteSource) {
        self.note_restart = source;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::envelope::EnvelopeStage,
        engine::inbox::{inbox, InboxSender},
        io::sink::RecordingSink,
        params::ParameterDescriptor,
    };

    fn engine(settings: EngineSettings) -> (ModEngine<RecordingSink>, InboxSender) {
        let params = Arc::new(ParameterTable::new(vec![
            ParameterDescriptor::cc("Cutoff", 74, 0, 127),
            ParameterDescriptor::cc("Pan", 10, 0, 127).centred(),
        ]));
        let (tx, rx) = inbox(32);
        let engine = ModEngine::new(
            settings,
            params,
            Arc::new(ClockTracker::default()),
            rx,
            RecordingSink::new(),
        );
        (engine, tx)
    }

    #[test]
    fn idle_engine_sends_nothing() {
        let (mut engine, _tx) = engine(EngineSettings::default());
        for i in 0..20 {
            assert_eq!(engine.tick(i as f64 * 10.0), 0);
        }
        assert!(engine.sink().messages().is_empty());
    }

    #[test]
    fn start_command_runs_first_route() {
        let (mut engine, mut tx) = engine(EngineSettings::default());
        tx.post(ControlEvent::StartLfo);
        assert_eq!(engine.tick(0.0), 1);
        assert!(engine.lfo().is_active());

        let first = engine.sink().messages()[0];
        assert_eq!((first.channel, first.controller), (1, 74));

        tx.post(ControlEvent::StopLfo);
        assert_eq!(engine.tick(10.0), 0);
    }

    #[test]
    fn note_restart_activates_lfo_on_same_tick() {
        let settings = EngineSettings {
            note_restart: NoteSource::Channel(2),
            ..EngineSettings::default()
        };
        let (mut engine, mut tx) = engine(settings);

        tx.post(ControlEvent::NoteOn { channel: 1, note: 60 });
        assert_eq!(engine.tick(0.0), 0);

        tx.post(ControlEvent::NoteOn { channel: 2, note: 60 });
        assert_eq!(engine.tick(10.0), 1);
    }

    #[test]
    fn transport_start_and_stop() {
        let (mut engine, mut tx) = engine(EngineSettings::default());
        tx.post(ControlEvent::TransportStart);
        engine.tick(0.0);
        assert!(engine.lfo().is_active());

        tx.post(ControlEvent::TransportContinue);
        engine.tick(10.0);
        assert!(engine.lfo().is_active());

        tx.post(ControlEvent::TransportStop);
        engine.tick(20.0);
        assert!(!engine.lfo().is_active());
    }

    #[test]
    fn envelope_follows_notes_and_maps_onto_parameter() {
        let settings = EngineSettings {
            routes: [RouteConfig::default(); 3],
            envelope: EnvelopeConfig::adsr(0.0, 0.0, 1.0, 0.0),
            envelope_routing: EnvelopeRouting {
                source: NoteSource::Any,
                channel: 3,
                parameter_index: 0,
            },
            ..EngineSettings::default()
        };
        let (mut engine, mut tx) = engine(settings);

        tx.post(ControlEvent::NoteOn { channel: 9, note: 40 });
        engine.tick(0.0);
        assert_eq!(engine.envelope().stage(), EnvelopeStage::Sustain);
        let msg = engine.sink().messages()[0];
        assert_eq!((msg.channel, msg.controller, msg.value), (3, 74, 127));

        tx.post(ControlEvent::NoteOff { channel: 9, note: 40 });
        engine.tick(10.0);
        let last = *engine.sink().messages().last().unwrap();
        assert_eq!(last.value, 0);
        assert!(!engine.envelope().is_active());
    }

    #[test]
    fn envelope_off_ignores_notes() {
        let (mut engine, mut tx) = engine(EngineSettings {
            routes: [RouteConfig::default(); 3],
            ..EngineSettings::default()
        });
        tx.post(ControlEvent::NoteOn { channel: 1, note: 60 });
        engine.tick(0.0);
        assert_eq!(engine.envelope().stage(), EnvelopeStage::Idle);
        assert!(engine.sink().messages().is_empty());
    }

    #[test]
    fn synced_rate_falls_back_without_clock() {
        let (mut engine, _tx) = engine(EngineSettings::default());
        engine.set_rate(RateSettings {
            manual_hz: 1.5,
            sync: crate::modulation::SyncMode::MidiClock,
            ..RateSettings::default()
        });
        assert!((engine.current_rate_hz() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn live_setting_changes() {
        let (mut engine, mut tx) = engine(EngineSettings::default());

        engine.set_route(0, RouteConfig::default());
        engine.set_route(1, RouteConfig::on_channel(7, 1));
        engine.set_throttle(ThrottleSettings {
            change_threshold: 0,
            min_interval_ms: 0.0,
        });
        engine.set_note_restart(NoteSource::Any);

        tx.post(ControlEvent::NoteOn { channel: 12, note: 50 });
        assert_eq!(engine.tick(0.0), 1);
        assert_eq!(engine.sink().messages()[0].channel, 7);
        assert_eq!(engine.sink().messages()[0].controller, 10);

        engine.set_envelope(EnvelopeConfig::adsr(0.0, 0.0, 0.5, 0.0));
        engine.set_envelope_routing(EnvelopeRouting {
            source: NoteSource::Any,
            channel: 2,
            parameter_index: 0,
        });
        tx.post(ControlEvent::NoteOn { channel: 12, note: 51 });
        engine.tick(10.0);
        assert_eq!(engine.envelope().stage(), EnvelopeStage::Sustain);
        let last = *engine.sink().messages().last().unwrap();
        assert_eq!((last.channel, last.controller, last.value), (2, 74, 64));

        engine.set_envelope_routing(EnvelopeRouting::default());
        assert!(!engine.envelope().is_active());
        assert_eq!(engine.params().len(), 2);
    }
}
