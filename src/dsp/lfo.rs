//! Low Frequency Oscillator (LFO) waveform law and phase helpers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Low Frequency Oscillators
=========================

An LFO here is a phase accumulator ticked at control rate (~100 Hz). Each
tick the phase moves forward by `rate_hz / tick_rate_hz` and wraps at 1.0.
The waveform law turns the phase into a shape value in [-1, +1], which the
route then maps onto a parameter's MIDI range.

Vocabulary
----------

  phase       Position within one cycle, always in [0, 1).

  wrap        The tick where phase crosses 1.0 and restarts at the bottom.
              One-shot routes stop here.

  bipolar     Output swings around the parameter's centre: -1 .. +1.

  unipolar    Output is anchored at the parameter minimum: 0 .. 1.
              Convert: unipolar = (bipolar + 1.0) / 2.0


Waveform Law
------------

For phase p in [0, 1):

    SINE        sin(2π·p)
    TRIANGLE    2·|2·(p − round(p))| − 1
    SQUARE      +1 if p < 0.5 else −1
    SAW         2·(p − round(p))
    RANDOM      a fresh uniform value in [−1, 1] on every tick

`round` is round-half-up, so SAW at p = 0.5 is −1 and the ramp climbs
from there to just under +1 at p → 0.5 again.


Start Phase
-----------

When a route (re)starts it should begin at the bottom of its travel, so a
unipolar sweep visibly rises from the parameter minimum:

    shape       start phase   value there
    Sine        0.75          −1
    Triangle    0.0           −1
    Square      0.5           −1
    Saw         0.5           −1
    Random      0.0           (not phase derived)

An inverted route is negated after the waveform, so its "bottom" is half a
cycle later: +0.5, wrapped. Saw is the exception: its inverted minimum sits
at the discontinuity, so an inverted saw starts from the centre instead.
Bipolar routes start at phase 0 (the centre for Sine and Saw), plus 0.5
when inverted.
*/

/// LFO waveform shapes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Saw,
    Random,
}

impl Waveform {
    /// Evaluate the phase-derived waveforms. `Random` returns 0.0; the route
    /// draws its value from the bank's generator.
    #[inline]
    pub fn evaluate(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (std::f64::consts::TAU * phase).sin(),
            Waveform::Triangle => 2.0 * (2.0 * (phase - round_half_up(phase))).abs() - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * (phase - round_half_up(phase)),
            Waveform::Random => 0.0,
        }
    }

    /// Phase at which a unipolar route reaches its minimum.
    pub fn minimum_phase(self) -> f64 {
        match self {
            Waveform::Sine => 0.75,
            Waveform::Triangle => 0.0,
            Waveform::Square | Waveform::Saw => 0.5,
            Waveform::Random => 0.0,
        }
    }
}

#[inline]
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Starting phase for a route after any (re)start.
pub fn start_phase(waveform: Waveform, bipolar: bool, invert: bool) -> f64 {
    let mut phase = if bipolar {
        0.0
    } else {
        waveform.minimum_phase()
    };

    if invert {
        phase += 0.5;
        if phase >= 1.0 {
            phase -= 1.0;
        }
    }

    phase
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
///
/// Useful when a parameter expects positive-only modulation.
#[inline]
pub fn bipolar_to_unipolar(bipolar: f64) -> f64 {
    (bipolar + 1.0) * 0.5
}

/// Phase increment per tick for a given LFO rate.
///
/// # Example
/// ```
/// use midimod::dsp::lfo::phase_increment;
/// assert!((phase_increment(2.0, 100.0) - 0.02).abs() < 1e-12);
/// ```
#[inline]
pub fn phase_increment(rate_hz: f64, tick_rate_hz: f64) -> f64 {
    if !(rate_hz.is_finite() && tick_rate_hz > 0.0) || rate_hz <= 0.0 {
        return 0.0;
    }
    rate_hz / tick_rate_hz
}
