//! Pitch-wheel values as transmitted in MIDI "Pitch Bend Change" messages.
//!
//! References:
//! - [MIDI messages](https://www.midi.org/specifications-old/item/table-1-summary-of-midi-message)

/// A 14-bit unsigned pitch-wheel position.
///
/// [`PitchWheel::CENTER`] represents "no bend". Values outside of the 14-bit range are clamped on construction.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::midi::PitchWheel;
/// assert_approx_eq!(PitchWheel::MIN.as_fraction(), -1.0);
/// assert_approx_eq!(PitchWheel::CENTER.as_fraction(), 0.0);
/// assert_approx_eq!(PitchWheel::MAX.as_fraction(), 1.0);
/// assert_approx_eq!(PitchWheel::from_u14(4096).as_fraction(), -0.5);
/// ```
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PitchWheel {
    value: u16,
}

impl PitchWheel {
    pub const MIN: PitchWheel = PitchWheel { value: 0 };
    pub const CENTER: PitchWheel = PitchWheel { value: 0x2000 };
    pub const MAX: PitchWheel = PitchWheel { value: 0x3FFF };

    pub fn from_u14(value: u16) -> Self {
        Self {
            value: value.min(Self::MAX.value),
        }
    }

    /// Decodes the two 7-bit data bytes of a "Pitch Bend Change" message.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scala_notemap::midi::PitchWheel;
    /// assert_eq!(PitchWheel::from_lsb_msb(0, 64), PitchWheel::CENTER);
    /// assert_eq!(PitchWheel::from_lsb_msb(127, 127), PitchWheel::MAX);
    /// assert_eq!(PitchWheel::from_lsb_msb(1, 0).as_u14(), 1);
    /// ```
    pub fn from_lsb_msb(lsb: u8, msb: u8) -> Self {
        Self::from_u14(u16::from(lsb & 0x7F) | u16::from(msb & 0x7F) << 7)
    }

    pub fn as_u14(self) -> u16 {
        self.value
    }

    /// Signed deflection in the range `-1.0..=1.0`.
    ///
    /// The lower half has one more step than the upper half, so each half is normalized separately to let both extremes reach exactly ±1.
    pub fn as_fraction(self) -> f64 {
        let offset = f64::from(self.value) - f64::from(Self::CENTER.value);
        if offset > 0.0 {
            offset / f64::from(Self::MAX.value - Self::CENTER.value)
        } else {
            offset / f64::from(Self::CENTER.value)
        }
    }
}

impl Default for PitchWheel {
    fn default() -> Self {
        Self::CENTER
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn clamp_out_of_range_values() {
        assert_eq!(PitchWheel::from_u14(u16::MAX), PitchWheel::MAX);
        assert_eq!(PitchWheel::from_u14(0x4000), PitchWheel::MAX);
        assert_eq!(PitchWheel::from_lsb_msb(0xFF, 0xFF), PitchWheel::MAX);
    }

    #[test]
    fn fraction_is_monotonic_and_centered() {
        assert_eq!(PitchWheel::default().as_fraction(), 0.0);
        assert!(PitchWheel::from_u14(0x1FFF).as_fraction() < 0.0);
        assert!(PitchWheel::from_u14(0x2001).as_fraction() > 0.0);
        assert_approx_eq!(PitchWheel::from_u14(0x2000 + 8191 / 2).as_fraction(), 0.5, 1e-3);

        let fractions = (0..=0x3FFF)
            .map(|value| PitchWheel::from_u14(value).as_fraction())
            .collect::<Vec<_>>();
        assert!(fractions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
