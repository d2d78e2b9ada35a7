//! Time-stepping solver (C6): factorizes `A` once, then steps the two-layer
//! state vector forward via Crank-Nicolson, retaining the full deflection
//! history.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use rail_model::{Result, SimError, Warning};
use tracing::{debug, info};

use crate::discretization::Discretization;
use crate::excitation::Excitation;

/// The frozen output of a completed run: the deflection history, the
/// forcing series, the excitation node trajectory, and any soft warnings
/// accumulated along the way.
#[derive(Debug, Clone)]
pub struct DeflectionResult {
    /// `u[dof][n]`, `dof in 0..2*nx`, `n in 0..=nt`. Rows `0..nx` are rail
    /// deflection, rows `nx..2*nx` are sleeper/slab deflection.
    pub u: DMatrix<f64>,
    pub force: Vec<f64>,
    pub excitation_nodes: Vec<Vec<usize>>,
    pub nx: usize,
    pub dt: f64,
    pub warnings: Vec<Warning>,
    /// `false` if a cancellation handle interrupted the run before completion.
    pub valid: bool,
}

impl DeflectionResult {
    pub fn rail_row(&self, node: usize) -> DVector<f64> {
        self.u.row(node).transpose()
    }

    pub fn sleeper_row(&self, node: usize) -> DVector<f64> {
        self.u.row(self.nx + node).transpose()
    }
}

/// An optional, step-granularity-polled cancellation handle for long runs.
pub trait CancellationHandle {
    fn is_cancelled(&self) -> bool;
}

/// A no-op handle for runs that are never cancelled.
pub struct NeverCancelled;

impl CancellationHandle for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Owns the LU-factorized `A` and steps the state vector forward.
pub struct Solver<'d> {
    discretization: &'d Discretization,
    lu: nalgebra::linalg::LU<f64, nalgebra::Dyn, nalgebra::Dyn>,
}

impl<'d> Solver<'d> {
    /// Factorizes `A` once. `A` is reconstructed densely from its sparse
    /// CSR form; the narrow-band structure makes this wasteful for very
    /// large grids, but keeps the factorization on the same `nalgebra` LU
    /// path used throughout this codebase family rather than introducing a
    /// second, bespoke banded solver.
    pub fn new(discretization: &'d Discretization) -> Result<Self> {
        let dense_a = csr_to_dense(&discretization.a);
        let lu = dense_a.lu();
        Ok(Solver { discretization, lu })
    }

    /// Runs the full time-stepping loop for the given excitation, producing
    /// `nt - 1` solves. `U[:,0] = U[:,1] = 0` (rest-state initial
    /// conditions); the loop advances `U[:,n+1]` for `n = 1..nt-1`.
    pub fn run(&self, excitation: &Excitation) -> Result<DeflectionResult> {
        self.run_cancellable(excitation, &NeverCancelled)
    }

    pub fn run_cancellable(
        &self,
        excitation: &Excitation,
        cancellation: &dyn CancellationHandle,
    ) -> Result<DeflectionResult> {
        let disc = self.discretization;
        let nx = disc.nx;
        let n = 2 * nx;
        let nt = disc.nt;

        let series = excitation.generate(nx, disc.dx, disc.dt, nt, disc.n_b);
        let scale = disc.dt.powi(2) / (disc.rail.m_r * disc.dx);

        let mut u = DMatrix::<f64>::zeros(n, nt + 1);
        let mut warnings = series.warnings;

        info!(nt, nx, "starting time-stepping loop");

        for step in 1..nt {
            if cancellation.is_cancelled() {
                return Ok(DeflectionResult {
                    u,
                    force: series.force,
                    excitation_nodes: series.nodes,
                    nx,
                    dt: disc.dt,
                    warnings,
                    valid: false,
                });
            }

            let u_n = u.column(step).clone_owned();
            let u_prev = u.column(step - 1).clone_owned();

            let mut b = csr_matvec(&disc.b, &u_n);
            b += csr_matvec(&disc.c, &u_prev);

            let f_n = series.force[step];
            for &node in &series.nodes[step] {
                b[node] += scale * f_n;
            }

            let x = self
                .lu
                .solve(&b)
                .ok_or_else(|| SimError::numerical("LU factorization of A is singular"))?;

            if !x.iter().all(|v| v.is_finite()) {
                return Err(SimError::numerical(format!(
                    "non-finite value produced in deflection buffer at step {step}"
                )));
            }

            u.set_column(step + 1, &x);
        }

        debug!(warnings = warnings.len(), "time-stepping loop complete");

        Ok(DeflectionResult {
            u,
            force: series.force,
            excitation_nodes: series.nodes,
            nx,
            dt: disc.dt,
            warnings: std::mem::take(&mut warnings),
            valid: true,
        })
    }
}

/// Reconstructs a dense matrix from a CSR sparse matrix, matching the
/// reconstruction the native backend performs from COO triplets elsewhere
/// in this codebase family.
fn csr_to_dense(m: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(m.nrows(), m.ncols());
    for (row, row_vec) in m.row_iter().enumerate() {
        for (&col, &value) in row_vec.col_indices().iter().zip(row_vec.values()) {
            dense[(row, col)] += value;
        }
    }
    dense
}

/// Sparse matrix-vector product, used every step for `B*u^n` and `C*u^{n-1}`.
fn csr_matvec(m: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let mut out = DVector::zeros(m.nrows());
    for (row, row_vec) in m.row_iter().enumerate() {
        let mut acc = 0.0;
        for (&col, &value) in row_vec.col_indices().iter().zip(row_vec.values()) {
            acc += value * x[col];
        }
        out[row] = acc;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_model::track::build_cont_slab;
    use rail_model::{ContinuousPad, Rail};

    fn small_discretization() -> Discretization {
        let track = build_cont_slab(Rail::uic60(), ContinuousPad::new(3.0e8, 3.0e4), 90.0).unwrap();
        Discretization::build(&track, 32.73, 7.0, 2.0e-5, 0.02, 1.0).unwrap()
    }

    #[test]
    fn initial_conditions_are_at_rest() {
        let disc = small_discretization();
        let solver = Solver::new(&disc).unwrap();
        let excitation = Excitation::StationaryGaussian {
            x_excit: 45.3,
            sigma: 7.0e-5,
            amplitude: 50.0,
        };
        let result = solver.run(&excitation).unwrap();
        assert!(result.u.column(0).iter().all(|&v| v == 0.0));
        assert!(result.u.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_excitation_leaves_buffer_identically_zero() {
        let disc = small_discretization();
        let solver = Solver::new(&disc).unwrap();
        let excitation = Excitation::StationaryGaussian {
            x_excit: 45.3,
            sigma: 7.0e-5,
            amplitude: 0.0,
        };
        let result = solver.run(&excitation).unwrap();
        assert!(result.u.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn run_produces_exactly_nt_minus_one_new_columns() {
        let disc = small_discretization();
        let solver = Solver::new(&disc).unwrap();
        let excitation = Excitation::StationaryGaussian {
            x_excit: 45.3,
            sigma: 7.0e-5,
            amplitude: 50.0,
        };
        let result = solver.run(&excitation).unwrap();
        assert_eq!(result.u.ncols(), disc.nt + 1);
        assert!(result.valid);
    }

    #[test]
    fn nonzero_excitation_produces_nonzero_response() {
        let disc = small_discretization();
        let solver = Solver::new(&disc).unwrap();
        let excitation = Excitation::StationaryGaussian {
            x_excit: 45.3,
            sigma: 7.0e-5,
            amplitude: 50.0,
        };
        let result = solver.run(&excitation).unwrap();
        assert!(result.u.iter().any(|&v| v != 0.0));
    }
}
