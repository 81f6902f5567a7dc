//! Dense linear system storage and projected successive-over-relaxation.
//!
//! The matrix is held densely (row-major) but each row remembers the column
//! span it has touched, so a sweep only visits the populated band. The sweep
//! is Gauss-Seidel style: it reads and writes the same solution vector, so it
//! must stay sequential.

use log::trace;

use crate::core::{PdeError, SorConfig};
use crate::math::tridiagonal::TridiagonalSystem;

/// Square system `M x = q` owned by a single solve.
#[derive(Debug, Clone)]
pub struct DenseSystem {
    n: usize,
    matrix: Vec<f64>,
    rhs: Vec<f64>,
    // Half-open column range [lo, hi) written since the last clear.
    spans: Vec<(usize, usize)>,
}

impl DenseSystem {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            matrix: vec![0.0; n * n],
            rhs: vec![0.0; n],
            spans: vec![(0, 0); n],
        }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    /// Zeroes the populated part of every row and the right-hand side.
    pub fn clear(&mut self) {
        for row in 0..self.n {
            let (lo, hi) = self.spans[row];
            self.matrix[row * self.n + lo..row * self.n + hi].fill(0.0);
            self.spans[row] = (0, 0);
        }
        self.rhs.fill(0.0);
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n && col < self.n);
        self.matrix[row * self.n + col] = value;
        let (lo, hi) = self.spans[row];
        self.spans[row] = if lo == hi {
            (col, col + 1)
        } else {
            (lo.min(col), hi.max(col + 1))
        };
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix[row * self.n + col]
    }

    /// Writes `values` into `row` starting at column `start`.
    pub fn set_row(&mut self, row: usize, start: usize, values: &[f64]) {
        for (k, v) in values.iter().enumerate() {
            self.set(row, start + k, *v);
        }
    }

    #[inline]
    pub fn set_rhs(&mut self, row: usize, value: f64) {
        self.rhs[row] = value;
    }

    #[inline]
    pub fn rhs(&self, row: usize) -> f64 {
        self.rhs[row]
    }

    pub fn row_span(&self, row: usize) -> (usize, usize) {
        self.spans[row]
    }

    /// `sum_k M[row][k] * x[k]` over the populated span of `row`.
    #[inline]
    pub fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        let (lo, hi) = self.spans[row];
        let base = row * self.n;
        self.matrix[base + lo..base + hi]
            .iter()
            .zip(&x[lo..hi])
            .fold(0.0, |acc, (m, v)| m.mul_add(*v, acc))
    }

    /// Copies the system into tridiagonal bands.
    ///
    /// A first (last) row that reaches one column too far is reduced against
    /// its neighbouring row first. Returns `false` when the system has any
    /// other entry outside the three central bands, or the reduction would
    /// divide by zero.
    pub fn fill_tridiagonal(&self, out: &mut TridiagonalSystem) -> bool {
        let n = self.n;
        if out.len() != n || n < 3 {
            return false;
        }

        for row in 0..n {
            let (lo, hi) = self.spans[row];
            let band_lo = row.saturating_sub(1);
            let band_hi = (row + 2).min(n);
            let edge_ok = (row == 0 && hi <= 3) || (row == n - 1 && lo + 3 >= n);
            if lo < band_lo && !(row == n - 1 && edge_ok) {
                return false;
            }
            if hi > band_hi && !(row == 0 && edge_ok) {
                return false;
            }
            out.lower[row] = if row > 0 { self.get(row, row - 1) } else { 0.0 };
            out.diag[row] = self.get(row, row);
            out.upper[row] = if row + 1 < n {
                self.get(row, row + 1)
            } else {
                0.0
            };
            out.rhs[row] = self.rhs[row];
        }

        // Eliminate M[0][2] using row 1, whose entries sit in columns 0..=2.
        let far = self.get(0, 2);
        if far != 0.0 {
            let pivot = self.get(1, 2);
            if pivot == 0.0 {
                return false;
            }
            let k = far / pivot;
            out.diag[0] -= k * self.get(1, 0);
            out.upper[0] -= k * self.get(1, 1);
            out.rhs[0] -= k * self.rhs[1];
        }

        // Eliminate M[n-1][n-3] using row n-2, whose entries sit in columns n-3..=n-1.
        let far = self.get(n - 1, n - 3);
        if far != 0.0 {
            let pivot = self.get(n - 2, n - 3);
            if pivot == 0.0 {
                return false;
            }
            let k = far / pivot;
            out.lower[n - 1] -= k * self.get(n - 2, n - 2);
            out.diag[n - 1] -= k * self.get(n - 2, n - 1);
            out.rhs[n - 1] -= k * self.rhs[n - 2];
        }
        true
    }
}

/// Outcome of a converged relaxation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SorReport {
    pub sweeps: usize,
    /// Final `sum(correction^2) / (sum(x^2) + scale_floor)`.
    pub relative_error: f64,
}

/// Projected SOR: every update is clamped so `x[j]` never drops below `floor[j]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SorSolver {
    config: SorConfig,
}

impl SorSolver {
    pub fn new(config: SorConfig) -> Result<Self, PdeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SorConfig {
        &self.config
    }

    /// `sum((r_j / m_jj)^2) / (sum(x^2) + scale_floor)` with `r = q - M x`,
    /// measured like the sweep error. Infinite when `x` has the wrong length.
    pub fn relative_residual(&self, system: &DenseSystem, x: &[f64]) -> f64 {
        if x.len() != system.dim() {
            return f64::INFINITY;
        }
        let mut error_sqr = 0.0;
        let mut scale = 0.0;
        for (j, v) in x.iter().enumerate() {
            let correction = (system.rhs(j) - system.row_dot(j, x)) / system.get(j, j);
            error_sqr += correction * correction;
            scale += v * v;
        }
        error_sqr / (scale + self.config.scale_floor)
    }

    /// True when `x` already solves `system` to the configured tolerance.
    pub fn accepts(&self, system: &DenseSystem, x: &[f64]) -> bool {
        self.relative_residual(system, x) <= self.config.tolerance
    }

    /// Relaxes `x` (holding the starting guess) towards the solution of `system`.
    pub fn solve(
        &self,
        system: &DenseSystem,
        x: &mut [f64],
        floor: Option<&[f64]>,
    ) -> Result<SorReport, PdeError> {
        let n = system.dim();
        if x.len() != n || floor.is_some_and(|g| g.len() != n) {
            return Err(PdeError::InvalidInput(
                "relaxation vector lengths must match the system".to_string(),
            ));
        }
        for j in 0..n {
            if system.get(j, j) == 0.0 {
                return Err(PdeError::NumericalError(format!(
                    "cannot relax: zero on diagonal at row {j}"
                )));
            }
        }
        if let Some(floor) = floor {
            for (v, g) in x.iter_mut().zip(floor) {
                *v = v.max(*g);
            }
        }

        let omega = self.config.omega;
        let mut sweeps = 0;
        loop {
            if sweeps >= self.config.max_sweeps {
                return Err(PdeError::ConvergenceFailure(format!(
                    "SOR did not converge within {} sweeps",
                    self.config.max_sweeps
                )));
            }

            let mut error_sqr = 0.0;
            let mut scale = 0.0;
            for j in 0..n {
                let residual = system.rhs(j) - system.row_dot(j, x);
                let mut updated = x[j] + omega / system.get(j, j) * residual;
                // Clamp the value, not the correction: x[j] must end at or above floor[j].
                if let Some(floor) = floor {
                    updated = updated.max(floor[j]);
                }
                let correction = updated - x[j];
                error_sqr += correction * correction;
                x[j] = updated;
                scale += updated * updated;
            }
            sweeps += 1;

            if !error_sqr.is_finite() || !scale.is_finite() {
                return Err(PdeError::ConvergenceFailure(format!(
                    "SOR diverged after {sweeps} sweeps"
                )));
            }
            let relative_error = error_sqr / (scale + self.config.scale_floor);
            if relative_error <= self.config.tolerance {
                trace!("SOR converged after {sweeps} sweeps, error = {relative_error:.3e}");
                return Ok(SorReport {
                    sweeps,
                    relative_error,
                });
            }
        }
    }
}
