use crate::{
    dsp::curve::{clamp_unit, AttackMode, CurveMode, CurveTuning},
    MIN_TIME_MS,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
AHDSR Envelope Engine
=====================

A single control-rate envelope generator with an optional Hold stage.
Unlike an audio envelope it is not advanced per sample: it is ticked at
roughly 100 Hz with wall-clock timestamps and computes its value from the
time elapsed since the current stage began.

Vocabulary
----------

  stage        Which segment of the envelope we're in: Idle, Attack, Hold,
               Decay, Sustain, or Release.

  anchor       The (time, value) pair captured at the last transition.
               Every stage interpolates from its anchor, so irregular tick
               spacing never accumulates error.

  progress     elapsed / stage duration, clamped to [0, 1], then passed
               through the stage's curve (see `dsp/curve.rs`).

  instant      A stage whose duration is at or below `MIN_TIME_MS`. It
               jumps to its terminal value and hands over to the next
               stage inside the same call.


The Shape
---------

  Level
    1.0 ┐     ╱‾‾‾╲
        │    ╱     ╲__________
    S   │   ╱                 ╲
        │  ╱                   ╲
    0.0 └─╱─────────────────────╲──→ Time
        Attack Hold Decay Sustain Release


The State Machine
-----------------

    ┌──────┐ note_on ┌────────┐ t≥A ┌──────┐ t≥H ┌───────┐ t≥D ┌─────────┐
    │ Idle │ ──────→ │ Attack │ ──→ │ Hold │ ──→ │ Decay │ ──→ │ Sustain │
    └──────┘         └────────┘     └──────┘     └───────┘     └─────────┘
        ↑                 │  (H ≤ ε skips Hold)        │             │
        │                 └───────── note_off ─────────┴─────────────┤
        │                                                            ↓
        │        value ≤ floor or t ≥ R                        ┌─────────┐
        └───────────────────────────────────────────────────── │ Release │
                                                               └─────────┘

note_off releases from any active stage, starting from the CURRENT value
so releasing mid-attack never jumps. note_on restarts Attack from the
current value as well (legato retrigger).


Catch-Up
--------

When a stage completes, the next stage is anchored at the exact boundary
time (stage start + duration), not at "now". The loop in `advance` then
keeps evaluating, so a late tick that spans several stage boundaries
lands on the value the envelope would have had with perfect timing.
*/

/// Output level below which a releasing envelope is considered silent.
const RELEASE_FLOOR: f64 = 1e-4;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Hold,
    Decay,
    Sustain,
    Release,
}

/// User-facing envelope settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    /// Attack knob (0..1), mapped through `attack_mode`'s window.
    pub attack: f64,
    pub attack_mode: AttackMode,
    pub hold_ms: f64,
    pub decay_ms: f64,
    /// Sustain level (0..1).
    pub sustain: f64,
    pub release_ms: f64,
    pub decay_curve: CurveMode,
    pub release_curve: CurveMode,
    pub tuning: CurveTuning,
}

impl EnvelopeConfig {
    /// Convenience constructor for a plain linear ADSR in milliseconds.
    ///
    /// The attack time is converted back to a knob position in the `Fast`
    /// window, so values above 1000 ms saturate.
    pub fn adsr(attack_ms: f64, decay_ms: f64, sustain: f64, release_ms: f64) -> Self {
        let (min, max) = AttackMode::Fast.window_ms();
        Self {
            attack: clamp_unit((sanitize_ms(attack_ms) - min) / (max - min)),
            decay_ms,
            sustain,
            release_ms,
            ..Self::default()
        }
    }

    pub fn with_hold(mut self, hold_ms: f64) -> Self {
        self.hold_ms = hold_ms;
        self
    }

    pub fn attack_ms(&self) -> f64 {
        self.attack_mode.knob_to_ms(self.attack)
    }

    fn hold(&self) -> f64 {
        sanitize_ms(self.hold_ms)
    }

    fn decay(&self) -> f64 {
        sanitize_ms(self.decay_ms)
    }

    fn release(&self) -> f64 {
        sanitize_ms(self.release_ms)
    }

    fn sustain_level(&self) -> f64 {
        clamp_unit(self.sustain)
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.01, // 10ms in the Fast window
            attack_mode: AttackMode::Fast,
            hold_ms: 0.0,
            decay_ms: 100.0,
            sustain: 0.7,
            release_ms: 300.0,
            decay_curve: CurveMode::Linear,
            release_curve: CurveMode::Linear,
            tuning: CurveTuning::default(),
        }
    }
}

/// Negative and NaN durations are treated as instantaneous.
#[inline]
fn sanitize_ms(ms: f64) -> f64 {
    if ms.is_nan() || ms < 0.0 {
        0.0
    } else {
        ms
    }
}

#[derive(Debug, Clone, Copy)]
struct EnvelopeState {
    stage: EnvelopeStage,
    current_value: f64,
    stage_start_ms: f64,
    stage_start_value: f64,
    note_held: bool,
    held_note: Option<u8>,
}

impl EnvelopeState {
    const IDLE: EnvelopeState = EnvelopeState {
        stage: EnvelopeStage::Idle,
        current_value: 0.0,
        stage_start_ms: 0.0,
        stage_start_value: 0.0,
        note_held: false,
        held_note: None,
    };
}

pub struct EnvelopeEngine {
    config: EnvelopeConfig,
    state: EnvelopeState,
}

impl EnvelopeEngine {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            config,
            state: EnvelopeState::IDLE,
        }
    }

    /// Gate high: (re)start the attack from the current level.
    pub fn note_on(&mut self, now_ms: f64, note: u8) {
        self.state.note_held = true;
        self.state.held_note = Some(note);
        self.enter(EnvelopeStage::Attack, now_ms);
    }

    /// Gate low: release from the current level.
    ///
    /// When `note` is given and differs from the note that opened the gate,
    /// the call is ignored (another key was let go).
    pub fn note_off(&mut self, now_ms: f64, note: Option<u8>) {
        if let (Some(released), Some(held)) = (note, self.state.held_note) {
            if released != held {
                return;
            }
        }

        self.state.note_held = false;
        self.state.held_note = None;

        if self.state.stage != EnvelopeStage::Idle {
            self.enter(EnvelopeStage::Release, now_ms);
        }
    }

    /// Advance to `now_ms` and return the output level.
    ///
    /// Returns `None` while idle. The tick on which the release finishes
    /// still returns `Some(0.0)` so the final resting value is emitted.
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        if self.state.stage == EnvelopeStage::Idle {
            return None;
        }

        self.advance(now_ms);
        Some(self.state.current_value)
    }

    fn advance(&mut self, now_ms: f64) {
        let cfg = self.config;

        loop {
            let elapsed = (now_ms - self.state.stage_start_ms).max(0.0);
            let start_value = self.state.stage_start_value;

            match self.state.stage {
                EnvelopeStage::Idle => {
                    self.state.current_value = 0.0;
                    return;
                }

                EnvelopeStage::Attack => {
                    let duration = cfg.attack_ms();
                    if duration <= MIN_TIME_MS || elapsed >= duration {
                        self.state.current_value = 1.0;
                        let next = if cfg.hold() > MIN_TIME_MS {
                            EnvelopeStage::Hold
                        } else {
                            EnvelopeStage::Decay
                        };
                        self.enter_at_boundary(next, duration);
                        continue;
                    }

                    let t = cfg.attack_mode.shape(elapsed / duration, cfg.tuning.snap_k);
                    self.state.current_value = start_value + (1.0 - start_value) * t;
                    return;
                }

                EnvelopeStage::Hold => {
                    let duration = cfg.hold();
                    self.state.current_value = 1.0;
                    if duration <= MIN_TIME_MS || elapsed >= duration {
                        self.enter_at_boundary(EnvelopeStage::Decay, duration);
                        continue;
                    }
                    return;
                }

                EnvelopeStage::Decay => {
                    let duration = cfg.decay();
                    let target = cfg.sustain_level();
                    if duration <= MIN_TIME_MS || elapsed >= duration {
                        self.state.current_value = target;
                        self.enter_at_boundary(EnvelopeStage::Sustain, duration);
                        continue;
                    }

                    let t = crate::dsp::curve::shape_curve(
                        elapsed / duration,
                        cfg.decay_curve,
                        cfg.tuning.decay_k,
                    );
                    self.state.current_value = start_value + (target - start_value) * t;
                    return;
                }

                EnvelopeStage::Sustain => {
                    self.state.current_value = cfg.sustain_level();
                    if !self.state.note_held {
                        self.enter(EnvelopeStage::Release, now_ms);
                        continue;
                    }
                    return;
                }

                EnvelopeStage::Release => {
                    let duration = cfg.release();
                    if duration <= MIN_TIME_MS || elapsed >= duration {
                        self.state.current_value = 0.0;
                        self.enter(EnvelopeStage::Idle, now_ms);
                        return;
                    }

                    let t = crate::dsp::curve::shape_curve(
                        elapsed / duration,
                        cfg.release_curve,
                        cfg.tuning.release_k,
                    );
                    self.state.current_value = start_value * (1.0 - t);

                    if self.state.current_value <= RELEASE_FLOOR {
                        self.state.current_value = 0.0;
                        self.enter(EnvelopeStage::Idle, now_ms);
                    }
                    return;
                }
            }
        }
    }

    /// Transition anchored at `now_ms` with the current value.
    fn enter(&mut self, stage: EnvelopeStage, now_ms: f64) {
        self.state.stage = stage;
        self.state.stage_start_ms = now_ms;
        self.state.stage_start_value = self.state.current_value;
    }

    /// Transition anchored at the end of the stage that just completed.
    fn enter_at_boundary(&mut self, stage: EnvelopeStage, completed_duration: f64) {
        let boundary = self.state.stage_start_ms + completed_duration.max(0.0);
        self.enter(stage, boundary);
    }

    pub fn reset(&mut self) {
        self.state = EnvelopeState::IDLE;
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.state.stage
    }

    /// Current output level (0.0 to 1.0).
    pub fn value(&self) -> f64 {
        self.state.current_value
    }

    pub fn is_active(&self) -> bool {
        self.state.stage != EnvelopeStage::Idle
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Replace the settings. Takes effect on the next tick without
    /// disturbing the current stage.
    pub fn set_config(&mut self, config: EnvelopeConfig) {
        self.config = config;
    }
}

impl Default for EnvelopeEngine {
    fn default() -> Self {
        Self::new(EnvelopeConfig::default())
    }
}
