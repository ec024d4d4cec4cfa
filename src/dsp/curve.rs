//! Curve shaping shared by the envelope stages.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Curve Shaping
=============

Every envelope stage is a ramp driven by a normalised progress value
`t` in [0, 1]. Instead of branching on curve types inside the state
machine, each stage asks one pure function for the shaped progress:

    shaped = shape_curve(t, mode, k)

The state machine then interpolates between the stage's start value and
its target using `shaped`, so it never needs to know which curve is in use.


Vocabulary
----------

  progress    Elapsed stage time divided by stage duration, clamped to [0, 1].

  k           Curve amount in [0, 1]. Turned into an exponent
              p = 1 + 5k, so k = 0 gives p = 1 (straight line) and k = 1
              gives p = 6 (strongly bent).


The Shapes
----------

    LINEAR        t                    straight line

    EXPONENTIAL   t^p                  slow start, fast finish
                                          ___/
                                       __/
                                   ___/

    LOGARITHMIC   1 - (1 - t)^p        fast start, slow finish
                                        .----
                                       /
                                      /

All three map 0 → 0 and 1 → 1, so stage endpoints stay exact regardless
of the curve chosen.


Attack Modes
------------

The attack stage is controlled by a normalised knob (0..1). The mode
chooses the millisecond window the knob spans, and for `Snap` also bends
the ramp:

    Fast     0 ms .. 1000 ms    linear ramp
    Long    20 ms .. 8000 ms    linear ramp
    Snap     0 ms .. 1000 ms    t' = (1 - e^(-k·t)) / (1 - e^(-k))

The snap curve is normalised by (1 - e^(-k)) so it still reaches exactly
1.0 at the end of the stage.
*/

/// Response curve applied to a decay or release ramp.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveMode {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
}

/// Attack behaviour: time window for the attack knob and ramp shape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttackMode {
    #[default]
    Fast,
    Long,
    Snap,
}

impl AttackMode {
    /// Millisecond window `(min, max)` spanned by the attack knob.
    pub fn window_ms(self) -> (f64, f64) {
        match self {
            AttackMode::Fast | AttackMode::Snap => (0.0, 1_000.0),
            AttackMode::Long => (20.0, 8_000.0),
        }
    }

    /// Map a normalised attack knob (0..1) into milliseconds.
    ///
    /// NaN and out-of-range positions clamp to the window edges.
    pub fn knob_to_ms(self, knob: f64) -> f64 {
        let (min, max) = self.window_ms();
        let knob = if knob.is_nan() { 0.0 } else { knob.clamp(0.0, 1.0) };
        min + knob * (max - min)
    }

    /// Shape attack progress `t` for this mode.
    pub fn shape(self, t: f64, snap_k: f64) -> f64 {
        let t = clamp_unit(t);
        match self {
            AttackMode::Fast | AttackMode::Long => t,
            AttackMode::Snap => snap(t, snap_k),
        }
    }
}

/// Tunable curve constants.
///
/// Each stage gets its own amount so the envelope feel can be adjusted
/// without touching the state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveTuning {
    /// Exponential rate of the snap attack (`k` in `1 - e^(-k·t)`).
    pub snap_k: f64,
    /// Curve amount for the decay stage (0..1).
    pub decay_k: f64,
    /// Curve amount for the release stage (0..1).
    pub release_k: f64,
}

impl Default for CurveTuning {
    fn default() -> Self {
        Self {
            snap_k: 6.0,
            decay_k: 0.4,
            release_k: 0.6,
        }
    }
}

/// Shape a normalised progress value with the given curve.
///
/// `k` is clamped to [0, 1] and converted to the exponent `p = 1 + 5k`.
///
/// # Example
/// ```
/// use midimod::dsp::curve::{shape_curve, CurveMode};
/// assert!((shape_curve(0.5, CurveMode::Linear, 0.7) - 0.5).abs() < 1e-12);
/// assert!((shape_curve(0.5, CurveMode::Exponential, 0.2) - 0.25).abs() < 1e-12);
/// ```
#[inline]
pub fn shape_curve(t: f64, mode: CurveMode, k: f64) -> f64 {
    let t = clamp_unit(t);
    let p = 1.0 + 5.0 * clamp_unit(k);
    match mode {
        CurveMode::Linear => t,
        CurveMode::Exponential => t.powf(p),
        CurveMode::Logarithmic => 1.0 - (1.0 - t).powf(p),
    }
}

#[inline]
fn snap(t: f64, k: f64) -> f64 {
    if k.is_nan() || k <= 1e-9 {
        return t;
    }
    (1.0 - (-k * t).exp()) / (1.0 - (-k).exp())
}

/// Clamp to [0, 1], mapping NaN to 0.
#[inline]
pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
