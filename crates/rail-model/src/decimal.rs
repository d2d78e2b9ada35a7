//! Exact mount-position arithmetic.
//!
//! Mount positions are accumulated as integer microns rather than f64 meters
//! so that summing thousands of mount distances never drifts off the grid
//! the discretizer later snaps to. Conversion back to meters, and the final
//! `floor(x / dx)` node lookup, happens only once the position is needed.

use std::ops::Add;

/// A mount position in whole microns (1e-6 m), exact under addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Microns(pub i64);

const MICRONS_PER_METER: f64 = 1_000_000.0;

impl Microns {
    pub const ZERO: Microns = Microns(0);

    /// Build from a meter value, rounding to the nearest micron. Intended
    /// for one-shot conversion of a user-provided distance, not for
    /// accumulating many positions (use `Add` for that).
    pub fn from_meters(meters: f64) -> Self {
        Microns((meters * MICRONS_PER_METER).round() as i64)
    }

    pub fn to_meters(self) -> f64 {
        self.0 as f64 / MICRONS_PER_METER
    }
}

impl Add for Microns {
    type Output = Microns;
    fn add(self, rhs: Microns) -> Microns {
        Microns(self.0 + rhs.0)
    }
}

/// `i * d` computed exactly in integer microns, avoiding the float drift
/// that accumulating `d` in a loop `i` times would introduce.
pub fn uniform_position(index: u64, spacing: Microns) -> Microns {
    Microns(index as i64 * spacing.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_positions_are_exact_multiples() {
        let d = Microns::from_meters(0.6);
        for i in 0..150u64 {
            let x = uniform_position(i, d);
            let expected = i as f64 * 0.6;
            assert!((x.to_meters() - expected).abs() <= 1e-12);
        }
    }

    #[test]
    fn accumulation_matches_uniform_position() {
        let d = Microns::from_meters(0.6);
        let mut acc = Microns::ZERO;
        for i in 0..150u64 {
            assert_eq!(acc, uniform_position(i, d));
            acc = acc + d;
        }
    }

    #[test]
    fn from_meters_round_trips() {
        let m = Microns::from_meters(45.3);
        assert_eq!(m.0, 45_300_000);
        assert!((m.to_meters() - 45.3).abs() < 1e-9);
    }
}
