//! Analytical reference methods: the boundary interface against which a
//! closed-form beam-on-foundation receptance could be compared. Only a stub
//! implementation is provided here; live closed-form evaluation (the
//! Euler-Bernoulli and Timoshenko point-receptance formulas) is out of
//! scope, and comparisons in tests are made against recorded reference
//! numbers rather than a second numerical implementation.

use num_complex::Complex64;
use rail_model::Rail;

/// A closed-form point-receptance model for an infinite beam on an elastic
/// foundation, evaluated at a single angular frequency.
pub trait AnalyticalReference {
    /// Point receptance `W(omega)/F(omega)` at the driving point, in m/N.
    fn point_receptance(&self, rail: &Rail, foundation_stiffness: f64, omega: f64) -> Complex64;
}

/// A stand-in implementation that always reports a receptance of zero.
/// Exists so callers can depend on [`AnalyticalReference`] today without a
/// working closed-form solver; replacing it with a real Euler-Bernoulli or
/// Timoshenko formula does not require changing any caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubAnalyticalReference;

impl AnalyticalReference for StubAnalyticalReference {
    fn point_receptance(&self, _rail: &Rail, _foundation_stiffness: f64, _omega: f64) -> Complex64 {
        Complex64::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_model::Rail;

    #[test]
    fn stub_reports_zero_receptance_everywhere() {
        let stub = StubAnalyticalReference;
        let rail = Rail::uic60();
        assert_eq!(stub.point_receptance(&rail, 3.0e8, 2.0 * std::f64::consts::PI * 500.0), Complex64::new(0.0, 0.0));
    }
}
