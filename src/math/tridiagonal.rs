//! Thomas-algorithm elimination for tridiagonal systems.

use crate::core::PdeError;

/// Tridiagonal bands plus the forward-sweep scratch space.
///
/// Row `i` reads `lower[i] * x[i-1] + diag[i] * x[i] + upper[i] * x[i+1] = rhs[i]`;
/// `lower[0]` and `upper[n-1]` are ignored.
#[derive(Debug, Clone, Default)]
pub struct TridiagonalSystem {
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
    pub rhs: Vec<f64>,
    c_star: Vec<f64>,
    d_star: Vec<f64>,
}

impl TridiagonalSystem {
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            rhs: vec![0.0; n],
            c_star: vec![0.0; n],
            d_star: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Solves the system in place, writing the solution to `out`.
    pub fn solve_into(&mut self, out: &mut [f64]) -> Result<(), PdeError> {
        let n = self.diag.len();
        if n == 0 {
            return Ok(());
        }
        if self.lower.len() != n
            || self.upper.len() != n
            || self.rhs.len() != n
            || self.c_star.len() != n
            || self.d_star.len() != n
            || out.len() != n
        {
            return Err(PdeError::InvalidInput(
                "tridiagonal input lengths must match".to_string(),
            ));
        }

        if self.diag[0].abs() <= 1.0e-14 {
            return Err(PdeError::NumericalError(
                "tridiagonal solver singular matrix".to_string(),
            ));
        }
        let inv_denom0 = 1.0 / self.diag[0];
        self.c_star[0] = if n > 1 { self.upper[0] * inv_denom0 } else { 0.0 };
        self.d_star[0] = self.rhs[0] * inv_denom0;

        for i in 1..n {
            let denom = (-self.lower[i]).mul_add(self.c_star[i - 1], self.diag[i]);
            if denom.abs() <= 1.0e-14 {
                return Err(PdeError::NumericalError(
                    "tridiagonal solver singular matrix".to_string(),
                ));
            }
            let inv_denom = 1.0 / denom;
            self.c_star[i] = if i < n - 1 {
                self.upper[i] * inv_denom
            } else {
                0.0
            };
            self.d_star[i] = (-self.lower[i]).mul_add(self.d_star[i - 1], self.rhs[i]) * inv_denom;
        }

        out[n - 1] = self.d_star[n - 1];
        for i in (0..n - 1).rev() {
            out[i] = (-self.c_star[i]).mul_add(out[i + 1], self.d_star[i]);
        }
        Ok(())
    }
}
