//! Excitation (C5): the nodal forcing time series and the time-varying
//! excitation node index trajectory, for the two supported load types.

use rail_model::Warning;
use tracing::warn;

/// A prescribed vertical load applied to the rail.
#[derive(Debug, Clone, PartialEq)]
pub enum Excitation {
    /// A stationary Gaussian-derivative impulse fixed at `x_excit`.
    ///
    /// `f(t) = amplitude * (t - 4*sigma) / sigma^2 * exp(-((t - 4*sigma) / sigma)^2)`.
    StationaryGaussian { x_excit: f64, sigma: f64, amplitude: f64 },
    /// One or more co-moving constant loads: a linear ramp from 0 to
    /// `amplitude` over the first `ramp_fraction` of the run, then constant,
    /// each translating at `velocity` from its own `x0` in `x_excit`.
    MovingConstant {
        x_excit: Vec<f64>,
        velocity: f64,
        amplitude: f64,
        ramp_fraction: f64,
    },
}

/// The produced forcing: `force[n]` for `n in 0..nt`, and `nodes[n]` the
/// (already clamped) set of excitation node indices active at step `n`.
pub struct ExcitationSeries {
    pub force: Vec<f64>,
    pub nodes: Vec<Vec<usize>>,
    pub warnings: Vec<Warning>,
}

impl Excitation {
    /// Materializes the forcing time series and node-index trajectory over
    /// `nt` steps at time step `dt`, for a grid with `nx` nodes at spacing
    /// `dx`; physical position `x` maps to node `n_b + floor(x / dx)` in the
    /// boundary-extended domain (see [`crate::discretization`]).
    pub fn generate(&self, nx: usize, dx: f64, dt: f64, nt: usize, n_b: usize) -> ExcitationSeries {
        match self {
            Excitation::StationaryGaussian { x_excit, sigma, amplitude } => {
                let mut warnings = Vec::new();
                let node = clamp_node(*x_excit, dx, n_b, nx, &mut warnings);
                let force = (0..nt)
                    .map(|n| {
                        let t = n as f64 * dt;
                        let u = (t - 4.0 * sigma) / sigma;
                        amplitude * u / sigma * (-u * u).exp()
                    })
                    .collect();
                let nodes = vec![vec![node]; nt];
                ExcitationSeries { force, nodes, warnings }
            }
            Excitation::MovingConstant {
                x_excit,
                velocity,
                amplitude,
                ramp_fraction,
            } => {
                let mut warnings = Vec::new();
                let ramp_steps = (ramp_fraction * nt as f64).ceil() as usize;
                let force = (0..nt)
                    .map(|n| {
                        if ramp_steps == 0 || n >= ramp_steps {
                            *amplitude
                        } else {
                            *amplitude * (n as f64 / ramp_steps as f64)
                        }
                    })
                    .collect();
                let nodes = (0..nt)
                    .map(|n| {
                        let t = n as f64 * dt;
                        x_excit
                            .iter()
                            .map(|x0| clamp_node(x0 + velocity * t, dx, n_b, nx, &mut warnings))
                            .collect()
                    })
                    .collect();
                ExcitationSeries { force, nodes, warnings }
            }
        }
    }
}

/// `f_PPF = pi / (2*d^2) * sqrt(E*Iy/m_r)`, the pinned-pinned resonance of a
/// bending beam simply supported at sleeper spacing `d`.
pub fn pinned_pinned_frequency(e: f64, iy: f64, m_r: f64, d: f64) -> f64 {
    std::f64::consts::PI / (2.0 * d * d) * (e * iy / m_r).sqrt()
}

/// `f_SPF = v / d`, the rate at which a load moving at `velocity` crosses
/// consecutive sleepers spaced `d` apart.
pub fn sleeper_passing_frequency(velocity: f64, d: f64) -> f64 {
    velocity / d
}

fn clamp_node(x: f64, dx: f64, n_b: usize, nx: usize, warnings: &mut Vec<Warning>) -> usize {
    let idx = n_b as i64 + (x / dx).floor() as i64;
    if idx < 0 || idx as usize >= nx {
        let clamped = idx.clamp(0, nx as i64 - 1) as usize;
        warn!(x, idx, clamped, "excitation node outside domain, clamped to boundary");
        warnings.push(Warning::new(
            "excitation_clamped",
            format!("excitation position {x} maps to node {idx}, clamped to {clamped}"),
        ));
        clamped
    } else {
        idx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_has_fixed_node_every_step() {
        let exc = Excitation::StationaryGaussian {
            x_excit: 45.3,
            sigma: 7.0e-5,
            amplitude: 50.0,
        };
        let series = exc.generate(9000, 0.01, 2.0e-5, 100, 3273);
        assert_eq!(series.force.len(), 100);
        assert!(series.nodes.iter().all(|n| n == &series.nodes[0]));
        assert!(series.warnings.is_empty());
    }

    #[test]
    fn gaussian_is_near_zero_long_before_and_after_the_pulse_center() {
        let exc = Excitation::StationaryGaussian {
            x_excit: 45.3,
            sigma: 7.0e-5,
            amplitude: 50.0,
        };
        let series = exc.generate(9000, 0.01, 2.0e-5, 2, 3273);
        assert!(series.force[0].abs() < 1e-6);
    }

    #[test]
    fn moving_constant_ramps_then_holds() {
        let exc = Excitation::MovingConstant {
            x_excit: vec![80.0],
            velocity: 60.0,
            amplitude: 6.5e4,
            ramp_fraction: 0.1,
        };
        let series = exc.generate(10000, 0.01, 2.2e-5, 1000, 4000);
        assert_eq!(series.force[0], 0.0);
        assert!((series.force[999] - 6.5e4).abs() < 1e-9);
        assert!(series.force.windows(2).take(100).all(|w| w[1] >= w[0] - 1e-9));
    }

    #[test]
    fn moving_constant_node_advances_with_velocity() {
        let exc = Excitation::MovingConstant {
            x_excit: vec![80.0],
            velocity: 60.0,
            amplitude: 6.5e4,
            ramp_fraction: 0.1,
        };
        let dx = 0.01;
        let series = exc.generate(10000, dx, 2.2e-5, 1000, 4000);
        let first = series.nodes[0][0];
        let last = series.nodes[999][0];
        assert!(last > first);
    }

    #[test]
    fn out_of_range_node_is_clamped_with_warning() {
        let exc = Excitation::StationaryGaussian {
            x_excit: 1000.0,
            sigma: 7.0e-5,
            amplitude: 50.0,
        };
        let series = exc.generate(100, 0.01, 2.0e-5, 5, 10);
        assert_eq!(series.nodes[0][0], 99);
        assert_eq!(series.warnings.len(), 1);
    }

    #[test]
    fn pinned_pinned_and_sleeper_passing_frequencies() {
        let f_ppf = pinned_pinned_frequency(210.0e9, 3038.30e-8, 60.2, 0.6);
        assert!(f_ppf > 0.0);
        assert!((sleeper_passing_frequency(60.0, 0.6) - 100.0).abs() < 1e-9);
    }
}
