//! Discretization and matrix assembly (C3): chooses a grid spacing aligned
//! to the sleeper spacing, builds the six per-node property vectors, and
//! assembles the three Crank-Nicolson system matrices `A`, `B`, `C`.

use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rail_model::{Rail, Result, SimError, Track, TrackKind, RIGID_SLAB_MASS};
use tracing::debug;

use crate::boundary::{apply_pml, pml_ramp};

/// The stencil half-width of the rail-rail pentadiagonal block; `nx` below
/// this is rejected per §4.3's failure semantics.
const STENCIL_WIDTH: usize = 5;

/// A built, read-only discretization of a [`Track`]: grid sizing, per-node
/// property vectors, and the three `2*nx x 2*nx` Crank-Nicolson matrices.
#[derive(Debug, Clone)]
pub struct Discretization {
    pub dt: f64,
    pub t_req: f64,
    pub nt: usize,
    pub dx: f64,
    pub nx: usize,
    /// Per-side boundary node count.
    pub n_b: usize,
    pub rail: Rail,
    pub d_r: Vec<f64>,
    pub s_p: Vec<f64>,
    pub d_p: Vec<f64>,
    pub m_s: Vec<f64>,
    pub s_b: Vec<f64>,
    pub d_b: Vec<f64>,
    pub a: CsrMatrix<f64>,
    pub b: CsrMatrix<f64>,
    pub c: CsrMatrix<f64>,
}

struct Triplets {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl Triplets {
    fn new() -> Self {
        Triplets {
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.rows.push(row);
            self.cols.push(col);
            self.values.push(value);
        }
    }

    fn into_csr(self, n: usize) -> CsrMatrix<f64> {
        let coo = CooMatrix::try_from_triplets(n, n, self.rows, self.cols, self.values)
            .expect("triplet dimensions are constructed consistently above");
        CsrMatrix::from(&coo)
    }
}

impl Discretization {
    /// Builds the discretization of `track` for a simulation window `t_req`
    /// at time step `dt`, an absorbing boundary of length `l_b` per side
    /// with damping exponent `alpha`, and stability coefficient `bx`.
    pub fn build(track: &Track, l_b: f64, alpha: f64, dt: f64, t_req: f64, bx: f64) -> Result<Self> {
        if dt <= 0.0 {
            return Err(SimError::config("dt", "time step must be positive"));
        }
        if t_req <= 0.0 {
            return Err(SimError::config("t_req", "requested simulation time must be positive"));
        }
        if l_b <= 0.0 {
            return Err(SimError::config("boundary_length", "boundary length must be positive"));
        }
        let nt = (t_req / dt).floor() as usize;
        if nt < 2 {
            return Err(SimError::config(
                "t_req",
                "requested simulation time yields fewer than 2 time steps at this dt",
            ));
        }

        let rail = track.rail.clone();
        let dx = Self::stable_dx(rail.e, rail.iy, rail.m_r, bx, dt)?;

        let l_track = track.l_track();
        if l_track <= 0.0 {
            return Err(SimError::config("l_track", "track length must be positive"));
        }
        if l_track < 2.0 * l_b {
            return Err(SimError::config(
                "boundary_length",
                format!("track length {l_track} is smaller than 2x boundary length {l_b}"),
            ));
        }

        let n_b = (l_b / dx).floor() as usize;
        let nx = ((l_track / dx) + 2.0 * n_b as f64).floor() as usize + 1;
        if nx < STENCIL_WIDTH {
            return Err(SimError::config(
                "nx",
                format!("grid has only {nx} nodes, need at least {STENCIL_WIDTH}"),
            ));
        }

        debug!(dx, nx, n_b, nt, "discretization grid sized");

        let (d_r, s_p, d_p, m_s, s_b, d_b) = Self::build_property_vectors(track, dx, n_b, nx);

        let r_pml = rail.e * rail.iy * dt.powi(2) / (rail.m_r * dx.powi(4));
        let d_max = r_pml * rail.m_r / (2.0 * dt);
        let ramp = pml_ramp(alpha, dx, n_b, d_max);
        let mut d_r = d_r;
        apply_pml(&mut d_r, &ramp);

        let r = r_pml / 2.0;
        let (a, b, c) = Self::assemble_matrices(dt, rail.m_r, r, &d_r, &s_p, &d_p, &m_s, &s_b, &d_b, nx);

        Ok(Discretization {
            dt,
            t_req,
            nt,
            dx,
            nx,
            n_b,
            rail,
            d_r,
            s_p,
            d_p,
            m_s,
            s_b,
            d_b,
            a,
            b,
            c,
        })
    }

    /// `dx >= bx * ((E*Iy)/(6*m_r))^(1/4) * sqrt(dt)`, snapped so that the
    /// reference sleeper spacing 0.6 m is an integer multiple of `dx` (the
    /// largest integer divisor that still satisfies the stability floor).
    fn stable_dx(e: f64, iy: f64, m_r: f64, bx: f64, dt: f64) -> Result<f64> {
        let dx_min = bx * (e * iy / (6.0 * m_r)).powf(0.25) * dt.sqrt();
        if dx_min <= 0.0 || !dx_min.is_finite() {
            return Err(SimError::config("bx", "stability floor produced a non-positive dx"));
        }
        let k = (0.6 / dx_min).floor() as i64;
        if k < 1 {
            return Err(SimError::config(
                "dx",
                format!("stability floor {dx_min} exceeds the reference sleeper spacing 0.6 m"),
            ));
        }
        Ok(0.6 / k as f64)
    }

    /// Builds the six per-node property vectors. `d_r` starts at the rail's
    /// own viscous coefficient at every node (the PML ramp is added by the
    /// caller); `s_p`, `d_p`, `s_b`, `d_b` start at zero; `m_s` starts at
    /// the guard value 1 so nodes with no mount degenerate to a trivial,
    /// uncoupled recurrence rather than dividing by zero.
    ///
    /// Discrete mount positions are offset by `n_b` grid nodes: the
    /// physical track occupies `[n_b, n_b + l_track/dx]` within the
    /// boundary-extended domain of width `nx`, so a mount at position `x`
    /// lands at node `n_b + floor(x / dx)`.
    /// The physical track length spanned by the non-boundary interior of
    /// this grid, recovered from the snapped `dx` and boundary node count.
    pub fn l_track(&self) -> f64 {
        (self.nx as f64 - 1.0 - 2.0 * self.n_b as f64) * self.dx
    }

    #[allow(clippy::type_complexity)]
    fn build_property_vectors(
        track: &Track,
        dx: f64,
        n_b: usize,
        nx: usize,
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let d_r = vec![track.rail.d_r; nx];
        let mut s_p = vec![0.0; nx];
        let mut d_p = vec![0.0; nx];
        let mut m_s = vec![1.0; nx];
        let mut s_b = vec![0.0; nx];
        let mut d_b = vec![0.0; nx];

        match &track.kind {
            TrackKind::ContSlab { pad, slab, .. } => {
                for i in 0..nx {
                    s_p[i] = pad.vertical_stiffness();
                    d_p[i] = pad.vertical_damping();
                    m_s[i] = slab.mass;
                }
            }
            TrackKind::ContBallasted { pad, slab, ballast, .. } => {
                for i in 0..nx {
                    s_p[i] = pad.vertical_stiffness();
                    d_p[i] = pad.vertical_damping();
                    m_s[i] = slab.mass;
                    s_b[i] = ballast.vertical_stiffness();
                    d_b[i] = ballast.vertical_damping();
                }
            }
            TrackKind::PeriodicSlab { mounts } | TrackKind::ArrangedSlab { mounts } => {
                for mount in mounts.points() {
                    let idx = mount_node(mount.position, dx, n_b, nx);
                    s_p[idx] = mount.pad.vertical_stiffness();
                    d_p[idx] = mount.pad.vertical_damping();
                    m_s[idx] = RIGID_SLAB_MASS;
                }
            }
            TrackKind::PeriodicBallasted { mounts } | TrackKind::ArrangedBallasted { mounts } => {
                for mount in mounts.points() {
                    let idx = mount_node(mount.position, dx, n_b, nx);
                    s_p[idx] = mount.pad.vertical_stiffness();
                    d_p[idx] = mount.pad.vertical_damping();
                    if let Some(sleeper) = &mount.sleeper {
                        m_s[idx] = sleeper.mass;
                    }
                    if let Some(ballast) = &mount.ballast {
                        s_b[idx] = ballast.vertical_stiffness();
                        d_b[idx] = ballast.vertical_damping();
                    }
                }
            }
        }

        (d_r, s_p, d_p, m_s, s_b, d_b)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble_matrices(
        dt: f64,
        m_r: f64,
        r: f64,
        d_r: &[f64],
        s_p: &[f64],
        d_p: &[f64],
        m_s: &[f64],
        s_b: &[f64],
        d_b: &[f64],
        nx: usize,
    ) -> (CsrMatrix<f64>, CsrMatrix<f64>, CsrMatrix<f64>) {
        let n = 2 * nx;
        let mut a = Triplets::new();
        let mut b = Triplets::new();
        let mut c = Triplets::new();

        let stencil: [(i64, f64); 5] = [(-2, 1.0), (-1, -4.0), (0, 6.0), (1, -4.0), (2, 1.0)];

        for i in 0..nx {
            let rail_row = i;
            let sleeper_row = nx + i;
            let m_s_i = m_s[i];

            // Rail-rail block: pentadiagonal stencil plus identity/damping/stiffness.
            for (offset, coeff) in stencil {
                let j = rail_row as i64 + offset;
                if j < 0 || j as usize >= nx {
                    continue;
                }
                let j = j as usize;
                a.push(rail_row, j, r * coeff);
                b.push(rail_row, j, -2.0 * r * coeff);
                c.push(rail_row, j, r * coeff);
            }
            a.push(
                rail_row,
                rail_row,
                1.0 + (dt / 2.0) * (d_r[i] + d_p[i]) / m_r + dt.powi(2) / (2.0 * m_r) * s_p[i],
            );
            b.push(rail_row, rail_row, 2.0 - dt.powi(2) / m_r * s_p[i]);
            c.push(
                rail_row,
                rail_row,
                -1.0 + (dt / 2.0) * (d_r[i] + d_p[i]) / m_r - dt.powi(2) / (2.0 * m_r) * s_p[i],
            );

            // Rail-sleeper coupling (diagonal only).
            a.push(
                rail_row,
                sleeper_row,
                -dt.powi(2) / (2.0 * m_r) * s_p[i] - (dt / 2.0) * d_p[i] / m_r,
            );
            b.push(rail_row, sleeper_row, dt.powi(2) / m_r * s_p[i]);
            c.push(
                rail_row,
                sleeper_row,
                -dt.powi(2) / (2.0 * m_r) * s_p[i] + (dt / 2.0) * d_p[i] / m_r,
            );

            // Sleeper-rail coupling (diagonal only).
            a.push(
                sleeper_row,
                rail_row,
                -dt.powi(2) / (2.0 * m_s_i) * s_p[i] - (dt / 2.0) * d_p[i] / m_s_i,
            );
            b.push(sleeper_row, rail_row, dt.powi(2) / m_s_i * s_p[i]);
            c.push(
                sleeper_row,
                rail_row,
                -dt.powi(2) / (2.0 * m_s_i) * s_p[i] + (dt / 2.0) * d_p[i] / m_s_i,
            );

            // Sleeper-sleeper block (diagonal only).
            a.push(
                sleeper_row,
                sleeper_row,
                1.0 + (dt / 2.0) * (d_p[i] + d_b[i]) / m_s_i + dt.powi(2) / (2.0 * m_s_i) * (s_p[i] + s_b[i]),
            );
            b.push(
                sleeper_row,
                sleeper_row,
                2.0 - dt.powi(2) / m_s_i * (s_p[i] + s_b[i]),
            );
            c.push(
                sleeper_row,
                sleeper_row,
                -1.0 + (dt / 2.0) * (d_p[i] + d_b[i]) / m_s_i - dt.powi(2) / (2.0 * m_s_i) * (s_p[i] + s_b[i]),
            );
        }

        (a.into_csr(n), b.into_csr(n), c.into_csr(n))
    }
}

/// Maps a physical mount position to its grid node within the
/// boundary-extended domain, clamping to the valid range.
fn mount_node(position: f64, dx: f64, n_b: usize, nx: usize) -> usize {
    let idx = n_b as i64 + (position / dx).floor() as i64;
    idx.clamp(0, nx as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_model::{track::build_cont_slab, track::build_periodic_slab, ContinuousPad, DiscretePad, Rail};

    fn uic60() -> Rail {
        Rail::uic60()
    }

    #[test]
    fn dx_divides_reference_sleeper_spacing() {
        let track = build_cont_slab(uic60(), ContinuousPad::new(3.0e8, 3.0e4), 90.0).unwrap();
        let disc = Discretization::build(&track, 32.73, 7.0, 2.0e-5, 0.4, 1.0).unwrap();
        let ratio = 0.6 / disc.dx;
        assert!((ratio - ratio.round()).abs() < 1e-9);
        assert!(disc.nx >= STENCIL_WIDTH);
    }

    #[test]
    fn matrices_are_square_and_twice_nx() {
        let track = build_cont_slab(uic60(), ContinuousPad::new(3.0e8, 3.0e4), 90.0).unwrap();
        let disc = Discretization::build(&track, 32.73, 7.0, 2.0e-5, 0.4, 1.0).unwrap();
        assert_eq!(disc.a.nrows(), 2 * disc.nx);
        assert_eq!(disc.a.ncols(), 2 * disc.nx);
        assert_eq!(disc.b.nrows(), 2 * disc.nx);
        assert_eq!(disc.c.nrows(), 2 * disc.nx);
    }

    #[test]
    fn track_shorter_than_twice_boundary_is_rejected() {
        let track = build_cont_slab(uic60(), ContinuousPad::new(3.0e8, 3.0e4), 10.0).unwrap();
        let err = Discretization::build(&track, 32.73, 7.0, 2.0e-5, 0.4, 1.0).unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));
    }

    #[test]
    fn periodic_slab_sets_rigid_mass_at_mounts_only() {
        let pad = DiscretePad::new(1.8e8, 3.0e4);
        let track = build_periodic_slab(uic60(), pad, 0.6, 150).unwrap();
        let disc = Discretization::build(&track, 32.73, 7.0, 2.0e-5, 0.4, 1.0).unwrap();
        let mounted = disc.m_s.iter().filter(|&&m| m == RIGID_SLAB_MASS).count();
        let guarded = disc.m_s.iter().filter(|&&m| m == 1.0).count();
        assert_eq!(mounted + guarded, disc.nx);
        assert!(mounted > 0);
        assert!(guarded > 0);
    }

    #[test]
    fn pml_ramp_raises_damping_at_domain_edges() {
        let track = build_cont_slab(uic60(), ContinuousPad::new(3.0e8, 3.0e4), 90.0).unwrap();
        let disc = Discretization::build(&track, 32.73, 7.0, 2.0e-5, 0.4, 1.0).unwrap();
        assert!(disc.d_r[0] > disc.rail.d_r);
        assert!(disc.d_r[disc.nx - 1] > disc.rail.d_r);
        assert_eq!(disc.d_r[disc.nx / 2], disc.rail.d_r);
    }
}
