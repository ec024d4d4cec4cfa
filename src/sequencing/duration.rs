/// Musical note duration represented as a rational fraction of a whole note.
/// All operations preserve exact ratios—no floating point drift until the
/// final conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// Numerator: how many parts
    pub numerator: u32,
    /// Denominator: of what size (4 = quarter, 8 = eighth, etc.)
    pub denominator: u32,
}

impl Duration {
    // Standard note values
    pub const WHOLE: Duration = Duration {
        numerator: 1,
        denominator: 1,
    };
    pub const HALF: Duration = Duration {
        numerator: 1,
        denominator: 2,
    };
    pub const QUARTER: Duration = Duration {
        numerator: 1,
        denominator: 4,
    };
    pub const EIGHTH: Duration = Duration {
        numerator: 1,
        denominator: 8,
    };
    pub const SIXTEENTH: Duration = Duration {
        numerator: 1,
        denominator: 16,
    };
    pub const THIRTY_SECOND: Duration = Duration {
        numerator: 1,
        denominator: 32,
    };

    pub const DOTTED_EIGHTH: Duration = Duration::EIGHTH.dotted();
    pub const DOTTED_SIXTEENTH: Duration = Duration::SIXTEENTH.dotted();

    pub const QUARTER_TRIPLET: Duration = Duration::QUARTER.triplet();
    pub const EIGHTH_TRIPLET: Duration = Duration::EIGHTH.triplet();

    /// Apply a dot: multiply duration by 3/2 (increases by 50%)
    pub const fn dotted(self) -> Self {
        Duration {
            numerator: self.numerator * 3,
            denominator: self.denominator * 2,
        }
    }

    /// Create a triplet: multiply duration by 2/3
    /// (three notes in the time of two)
    pub const fn triplet(self) -> Self {
        Duration {
            numerator: self.numerator * 2,
            denominator: self.denominator * 3,
        }
    }

    /// How many cycles of this duration fit in one quarter-note beat.
    ///
    /// This is the multiplier applied to beats-per-second to get an LFO
    /// rate: a whole note is 0.25, a sixteenth is 4.0.
    pub fn cycles_per_beat(&self) -> f64 {
        (self.denominator as f64) / (self.numerator as f64 * 4.0)
    }
}
