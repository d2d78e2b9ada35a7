//! Absorbing boundary (C4): a perfectly-matched-layer damping ramp added to
//! rail damping at both ends of the discretized domain so outgoing bending
//! waves are absorbed rather than reflected.

/// Builds the per-side PML damping ramp `p[0..n_b)`.
///
/// `p[i] = d_max * x_i^alpha / (dx * n_b)^alpha`, `x_i = i * dx` (i.e.
/// `linspace(0, dx * n_b, n_b)`) — numerator and denominator both span the
/// *discretized* boundary length `dx * n_b`, not the raw requested `l_b`,
/// so the ramp reaches exactly `d_max` at the last boundary node under the
/// snapped grid (§4.2 of the expanded specification).
///
/// Returns an empty vector if `n_b == 0` (a boundary shorter than one grid
/// step).
pub fn pml_ramp(alpha: f64, dx: f64, n_b: usize, d_max: f64) -> Vec<f64> {
    if n_b == 0 {
        return Vec::new();
    }
    let l_bound = dx * n_b as f64;
    let denom = l_bound.powf(alpha);
    (0..n_b)
        .map(|i| {
            let x_i = i as f64 * dx;
            if denom == 0.0 {
                0.0
            } else {
                d_max * x_i.powf(alpha) / denom
            }
        })
        .collect()
}

/// Adds the PML ramp to a rail damping vector in place: reversed at the
/// left edge (rising towards the interior-to-boundary direction, i.e. the
/// maximum damping sits at node 0), as-is at the right edge (maximum at
/// node `nx - 1`).
pub fn apply_pml(d_r: &mut [f64], ramp: &[f64]) {
    let n_b = ramp.len();
    let nx = d_r.len();
    if n_b == 0 {
        return;
    }
    for i in 0..n_b.min(nx) {
        d_r[i] += ramp[n_b - 1 - i];
    }
    for i in 0..n_b.min(nx) {
        let idx = nx - 1 - i;
        d_r[idx] += ramp[n_b - 1 - i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_rises_monotonically_and_approaches_d_max() {
        let alpha = 7.0;
        let n_b = 100;
        let d_max = 5.0e7;
        let ramp = pml_ramp(alpha, 0.01, n_b, d_max);
        assert_eq!(ramp.len(), n_b);
        for w in ramp.windows(2) {
            assert!(w[1] >= w[0] - 1e-9);
        }
        // The outermost boundary node sits one dx short of the discretized
        // boundary length `dx * n_b`, so the ramp approaches but does not
        // exactly reach `d_max` there.
        let expected_last = d_max * ((n_b - 1) as f64 / n_b as f64).powf(alpha);
        assert!((ramp[n_b - 1] - expected_last).abs() / expected_last < 1e-9);
        assert!(ramp[n_b - 1] < d_max);
        assert!(ramp[0].abs() < 1e-9);
    }

    #[test]
    fn empty_boundary_yields_empty_ramp() {
        assert!(pml_ramp(7.0, 0.01, 0, 5.0e7).is_empty());
    }

    #[test]
    fn apply_pml_raises_both_edges_and_leaves_interior_untouched() {
        let mut d_r = vec![1000.0; 20];
        let ramp = pml_ramp(7.0, 0.1, 5, 1.0e6);
        apply_pml(&mut d_r, &ramp);
        assert!((d_r[0] - (1000.0 + ramp[4])).abs() < 1e-6);
        assert!((d_r[19] - (1000.0 + ramp[4])).abs() < 1e-6);
        assert_eq!(d_r[10], 1000.0);
    }
}
