//! Assembly helpers shared by the finite-difference solvers.

use super::boundary::{BoundaryCondition, BoundarySide};
use super::coefficients::PdeCoefficients;
use super::grid::PdeGrid1D;
use super::problem::PdeProblem;
use crate::core::PdeError;
use crate::math::sor::DenseSystem;

/// Central first- and second-derivative weights for every interior node,
/// indexed by node (entries 0 and n-1 are unused).
pub(super) struct SpatialStencils {
    first: Vec<[f64; 3]>,
    second: Vec<[f64; 3]>,
}

impl SpatialStencils {
    pub(super) fn new(grid: &PdeGrid1D) -> Self {
        let n = grid.num_space_nodes();
        let mut first = vec![[0.0; 3]; n];
        let mut second = vec![[0.0; 3]; n];
        for i in 1..n - 1 {
            first[i] = grid.first_derivative_coefficients(i).weights;
            second[i] = grid.second_derivative_coefficients(i).weights;
        }
        Self { first, second }
    }
}

/// Discretized spatial operator `L = a D2 + b D1 + c` at one time level.
///
/// `row(i)` holds the weights on `f[i-1], f[i], f[i+1]`. In the extended form
/// the D2 weights multiply `a(x_i) * alpha(x_k)` and the D1 weights
/// `b(x_i) * beta(x_k)` for each neighbour `k`.
pub(super) struct OperatorRows {
    rows: Vec<[f64; 3]>,
    alpha: Vec<f64>,
    beta: Vec<f64>,
}

impl OperatorRows {
    pub(super) fn new(n: usize) -> Self {
        Self {
            rows: vec![[0.0; 3]; n],
            alpha: vec![1.0; n],
            beta: vec![1.0; n],
        }
    }

    pub(super) fn evaluate(
        &mut self,
        coefficients: &PdeCoefficients,
        grid: &PdeGrid1D,
        stencils: &SpatialStencils,
        t: f64,
    ) {
        let n = grid.num_space_nodes();
        if coefficients.is_extended() {
            for k in 0..n {
                let x = grid.space_node(k);
                self.alpha[k] = coefficients.alpha(t, x);
                self.beta[k] = coefficients.beta(t, x);
            }
        }

        for i in 1..n - 1 {
            let x = grid.space_node(i);
            let a = coefficients.a(t, x);
            let b = coefficients.b(t, x);
            let c = coefficients.c(t, x);
            let d1 = &stencils.first[i];
            let d2 = &stencils.second[i];
            self.rows[i] = [
                d2[0] * a * self.alpha[i - 1] + d1[0] * b * self.beta[i - 1],
                d2[1] * a * self.alpha[i] + d1[1] * b * self.beta[i] + c,
                d2[2] * a * self.alpha[i + 1] + d1[2] * b * self.beta[i + 1],
            ];
        }
    }

    #[inline]
    pub(super) fn row(&self, i: usize) -> [f64; 3] {
        self.rows[i]
    }

    /// `(L f)_i`.
    #[inline]
    pub(super) fn apply(&self, i: usize, f: &[f64]) -> f64 {
        let [l, d, u] = self.rows[i];
        l * f[i - 1] + d * f[i] + u * f[i + 1]
    }
}

/// One boundary equation: `weights . f_new[start..] = rhs`.
pub(super) struct BoundaryEquation {
    pub(super) start: usize,
    pub(super) weights: Vec<f64>,
    pub(super) rhs: f64,
}

pub(super) fn boundary_equation(
    condition: &BoundaryCondition,
    side: BoundarySide,
    coefficients: &PdeCoefficients,
    grid: &PdeGrid1D,
    t_old: f64,
    t_new: f64,
    f_old: &[f64],
) -> Result<BoundaryEquation, PdeError> {
    let n = grid.num_space_nodes();
    let left = condition.left_row(coefficients, grid, t_new);
    let right = condition.right_row(coefficients, grid, t_old);
    if left.is_empty() || left.len() > n || right.len() > n {
        return Err(PdeError::InvalidInput(format!(
            "boundary rows of length {}/{} do not fit {n} space nodes",
            left.len(),
            right.len()
        )));
    }

    let (start, right_start) = match side {
        BoundarySide::Lower => (0, 0),
        BoundarySide::Upper => (n - left.len(), n - right.len()),
    };
    let known: f64 = right
        .iter()
        .zip(&f_old[right_start..])
        .map(|(w, v)| w * v)
        .sum();
    Ok(BoundaryEquation {
        start,
        weights: left,
        rhs: known + condition.constant(coefficients, t_new),
    })
}

/// Writes both boundary equations of `problem` into the block of `system`
/// starting at row/column `offset`.
pub(super) fn inject_boundaries(
    system: &mut DenseSystem,
    offset: usize,
    problem: &PdeProblem,
    grid: &PdeGrid1D,
    t_old: f64,
    t_new: f64,
    f_old: &[f64],
) -> Result<(), PdeError> {
    let n = grid.num_space_nodes();
    let sides = [
        (problem.lower(), BoundarySide::Lower, 0),
        (problem.upper(), BoundarySide::Upper, n - 1),
    ];
    for (condition, side, row) in sides {
        let eq = boundary_equation(
            condition,
            side,
            problem.coefficients(),
            grid,
            t_old,
            t_new,
            f_old,
        )?;
        system.set_row(offset + row, offset + eq.start, &eq.weights);
        system.set_rhs(offset + row, eq.rhs);
    }
    Ok(())
}

/// `f(0, x)` at every space node.
pub(super) fn initial_values(
    coefficients: &PdeCoefficients,
    grid: &PdeGrid1D,
) -> Result<Vec<f64>, PdeError> {
    let values: Vec<f64> = grid
        .space_nodes()
        .iter()
        .map(|&x| coefficients.initial_condition(x))
        .collect();
    check_finite(&values, grid.time_node(0))?;
    Ok(values)
}

/// Fills `out` with the free-boundary floor at time `t`.
pub(super) fn free_boundary_floor(problem: &PdeProblem, grid: &PdeGrid1D, t: f64, out: &mut [f64]) {
    match problem.free_boundary() {
        Some(g) => {
            for (v, &x) in out.iter_mut().zip(grid.space_nodes()) {
                *v = g(t, x);
            }
        }
        None => out.fill(f64::NEG_INFINITY),
    }
}

pub(super) fn check_finite(values: &[f64], t: f64) -> Result<(), PdeError> {
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(PdeError::NumericalError(format!(
            "non-finite solution value at node {i}, t = {t}"
        )));
    }
    Ok(())
}
