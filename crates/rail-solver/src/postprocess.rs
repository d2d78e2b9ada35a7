//! Frequency-response postprocessing (C7): FFT-based receptance, mobility
//! and accelerance at arbitrary nodes, and the standardised Track Decay
//! Rate.

use std::sync::Arc;

use num_complex::Complex64;
use rail_model::{Track, TrackKind, Warning};
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::solver::DeflectionResult;

/// `f_PPF = pi / (2*d_s^2) * sqrt(E*Iy/m_r)`.
pub fn pinned_pinned_frequency(e: f64, iy: f64, m_r: f64, d_s: f64) -> f64 {
    crate::excitation::pinned_pinned_frequency(e, iy, m_r, d_s)
}

/// `f_SPF = v / d_s`.
pub fn sleeper_passing_frequency(velocity: f64, d_s: f64) -> f64 {
    crate::excitation::sleeper_passing_frequency(velocity, d_s)
}

/// The frequency-response functions at a set of rail nodes, masked to
/// `(f_min, f_max]`.
#[derive(Debug, Clone)]
pub struct Response {
    pub frequencies_hz: Vec<f64>,
    /// `receptance[position_index][frequency_index]`.
    pub receptance: Vec<Vec<Complex64>>,
    pub mobility: Vec<Vec<Complex64>>,
    pub accelerance: Vec<Vec<Complex64>>,
    pub warnings: Vec<Warning>,
}

impl Response {
    /// Computes receptance/mobility/accelerance at `response_positions`
    /// (physical meters) from a completed [`DeflectionResult`].
    ///
    /// `ramp_fraction` discards the same leading fraction of steps as was
    /// used to build the excitation's startup ramp (§4.4, §4.6) before
    /// taking the FFT, so the transient does not pollute the spectrum.
    pub fn compute(
        result: &DeflectionResult,
        dx: f64,
        n_b: usize,
        l_track: f64,
        response_positions: &[f64],
        f_min: f64,
        f_max: f64,
        ramp_fraction: f64,
    ) -> Self {
        let nt = result.force.len();
        let discard = (ramp_fraction * nt as f64).ceil() as usize;
        let m = nt.saturating_sub(discard);

        let mut warnings = Vec::new();

        let force_tail: Vec<f64> = result.force[discard..].to_vec();
        let (frequencies_all, force_hat) = one_sided_fft(&force_tail, result.dt);

        let mask: Vec<usize> = frequencies_all
            .iter()
            .enumerate()
            .filter(|(_, &f)| f > f_min && f <= f_max)
            .map(|(i, _)| i)
            .collect();
        let frequencies_hz: Vec<f64> = mask.iter().map(|&i| frequencies_all[i]).collect();

        let nodes: Vec<usize> = response_positions
            .iter()
            .map(|&x_r| clamp_response_node(x_r, dx, n_b, l_track, &mut warnings))
            .collect();

        // Each node's FFT and ratio computation is independent, so the
        // per-position work is farmed out across threads.
        let rows: Vec<(Vec<Complex64>, Vec<Complex64>, Vec<Complex64>)> = nodes
            .par_iter()
            .map(|&node| {
                let row = result.rail_row(node);
                let deflection_tail: Vec<f64> = row.iter().skip(discard).take(m).copied().collect();
                let (_, deflection_hat) = one_sided_fft(&deflection_tail, result.dt);

                let mut r_row = Vec::with_capacity(mask.len());
                let mut m_row = Vec::with_capacity(mask.len());
                let mut a_row = Vec::with_capacity(mask.len());
                for &i in &mask {
                    let f_hat = force_hat[i];
                    let w_hat = deflection_hat[i];
                    let omega = 2.0 * std::f64::consts::PI * frequencies_all[i];
                    let r = if f_hat.norm() > 0.0 { w_hat / f_hat } else { Complex64::new(0.0, 0.0) };
                    let mob = Complex64::new(0.0, omega) * r;
                    let acc = Complex64::new(-omega * omega, 0.0) * r;
                    r_row.push(r);
                    m_row.push(mob);
                    a_row.push(acc);
                }
                (r_row, m_row, a_row)
            })
            .collect();

        let mut receptance = Vec::with_capacity(rows.len());
        let mut mobility = Vec::with_capacity(rows.len());
        let mut accelerance = Vec::with_capacity(rows.len());
        for (r_row, m_row, a_row) in rows {
            receptance.push(r_row);
            mobility.push(m_row);
            accelerance.push(a_row);
        }

        Response {
            frequencies_hz,
            receptance,
            mobility,
            accelerance,
            warnings,
        }
    }
}

fn clamp_response_node(x_r: f64, dx: f64, n_b: usize, l_track: f64, warnings: &mut Vec<Warning>) -> usize {
    if x_r < 0.0 || x_r > l_track {
        warnings.push(Warning::new(
            "response_clamped",
            format!("response position {x_r} outside the track domain [0, {l_track}], clamped to boundary"),
        ));
    }
    let clamped = x_r.clamp(0.0, l_track);
    n_b + (clamped / dx).floor() as usize
}

/// One-sided FFT of a real time series sampled at step `dt`, rectangular
/// window, with `2/N` amplitude normalization (`1/N` at DC and Nyquist).
fn one_sided_fft(samples: &[f64], dt: f64) -> (Vec<f64>, Vec<Complex64>) {
    let n = samples.len().max(1);
    let mut buffer: Vec<Complex64> = samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    buffer.resize(n, Complex64::new(0.0, 0.0));

    let fft: Arc<dyn Fft<f64>> = FftPlanner::new().plan_fft_forward(n);
    fft.process(&mut buffer);

    let half = n / 2 + 1;
    let frequencies: Vec<f64> = (0..half).map(|k| k as f64 / (n as f64 * dt)).collect();
    let spectrum: Vec<Complex64> = buffer[..half]
        .iter()
        .enumerate()
        .map(|(k, &c)| {
            let scale = if k == 0 || (n % 2 == 0 && k == n / 2) { 1.0 / n as f64 } else { 2.0 / n as f64 };
            c * scale
        })
        .collect();
    (frequencies, spectrum)
}

/// A single Track Decay Rate sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackDecayRatePoint {
    pub frequency_hz: f64,
    pub tdr_db_per_m: f64,
}

/// The standardised 29-position point-measurement schedule.
const TDR_POINT_COUNT: usize = 29;

/// Computes the DIN-style Track Decay Rate at the standardised 29 points
/// (§4.6): `TDR(omega) = 4.343 / sum_{k>=1} (|M_k|^2 / |M_0|^2) * x_k`, where
/// `x_k` is each point's distance from the driving point (not its absolute
/// track coordinate) — the decay rate is a property of distance from the
/// source, not of where the source sits on the track.
///
/// `x_origin` is the physical driving-point position; for uniform periodic
/// or continuous tracks the points are `x_origin + k*d_s`; for arranged
/// tracks they follow the local mount-position geometry around the driving
/// point instead.
pub fn track_decay_rate(
    result: &DeflectionResult,
    dx: f64,
    n_b: usize,
    l_track: f64,
    track: &Track,
    x_origin: f64,
    d_s: f64,
    f_min: f64,
    f_max: f64,
    ramp_fraction: f64,
) -> (Vec<TrackDecayRatePoint>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut positions = tdr_positions(track, x_origin, d_s);

    let truncated: Vec<f64> = positions.iter().copied().filter(|&x| x >= 0.0 && x <= l_track).collect();
    if truncated.len() < positions.len() {
        warnings.push(Warning::new(
            "tdr_truncated",
            format!(
                "{} of {} TDR schedule points fall outside the track domain and were dropped",
                positions.len() - truncated.len(),
                positions.len()
            ),
        ));
    }
    positions = truncated;

    let response = Response::compute(result, dx, n_b, l_track, &positions, f_min, f_max, ramp_fraction);
    warnings.extend(response.warnings.clone());

    let mut points = Vec::with_capacity(response.frequencies_hz.len());
    for (freq_idx, &frequency_hz) in response.frequencies_hz.iter().enumerate() {
        let m0 = response.mobility[0][freq_idx].norm();
        if m0 == 0.0 {
            continue;
        }
        let mut sum = 0.0;
        for (k, &x_k) in positions.iter().enumerate().skip(1) {
            let mk = response.mobility[k][freq_idx].norm();
            sum += (mk * mk) / (m0 * m0) * (x_k - x_origin);
        }
        if sum > 0.0 {
            points.push(TrackDecayRatePoint {
                frequency_hz,
                tdr_db_per_m: 4.343 / sum,
            });
        }
    }

    (points, warnings)
}

/// The 29 schedule positions relative to `x_origin`: closed-form `k*d_s` for
/// uniform/continuous tracks, local mount-center spacing for arranged ones.
fn tdr_positions(track: &Track, x_origin: f64, d_s: f64) -> Vec<f64> {
    match &track.kind {
        TrackKind::ArrangedSlab { mounts } | TrackKind::ArrangedBallasted { mounts } => {
            let points = mounts.points();
            if points.len() < 2 {
                return (0..TDR_POINT_COUNT).map(|k| x_origin + k as f64 * d_s).collect();
            }
            let nearest = points
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    (a.position - x_origin).abs().partial_cmp(&(b.position - x_origin).abs()).unwrap()
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            let mut out = vec![x_origin];
            let mut idx = nearest;
            while out.len() < TDR_POINT_COUNT && idx + 1 < points.len() {
                let mid = (points[idx].position + points[idx + 1].position) / 2.0;
                out.push(x_origin + (mid - points[nearest].position));
                idx += 1;
            }
            while out.len() < TDR_POINT_COUNT {
                out.push(*out.last().unwrap() + d_s);
            }
            out
        }
        _ => (0..TDR_POINT_COUNT).map(|k| x_origin + k as f64 * d_s).collect(),
    }
}
