use log::debug;

use super::boundary::BoundarySide;
use super::coefficients::CoefficientForm;
use super::fd_common::{
    BoundaryEquation, OperatorRows, SpatialStencils, boundary_equation, check_finite,
    initial_values,
};
use super::grid::PdeGrid1D;
use super::problem::PdeProblem;
use super::results::{PdeFullResults, PdeResults, PdeTerminalResults};
use crate::core::{ConvectionDiffusionSolver, PdeError};

const UNIFORM_TOLERANCE: f64 = 1.0e-8;

/// Forward-Euler reference solver on uniform grids.
///
/// Interior nodes step as `f_new = f_old - dt L f_old`; the two boundary
/// values are then recovered from their boundary equations. Stable only when
/// `dt` is small against `dx^2 / |a|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitFiniteDifference {
    full_results: bool,
}

impl ExplicitFiniteDifference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_full_results(mut self, full_results: bool) -> Self {
        self.full_results = full_results;
        self
    }
}

impl ConvectionDiffusionSolver for ExplicitFiniteDifference {
    fn solve_on_grid(&self, problem: &PdeProblem, grid: &PdeGrid1D) -> Result<PdeResults, PdeError> {
        problem.validate_grid(grid)?;
        if problem.has_free_boundary() {
            return Err(PdeError::NotSupported(
                "explicit solver does not handle a free boundary".to_string(),
            ));
        }
        if !grid.is_uniform_in_space(UNIFORM_TOLERANCE) || !grid.is_uniform_in_time(UNIFORM_TOLERANCE) {
            return Err(PdeError::NotSupported(
                "explicit solver requires a uniform grid".to_string(),
            ));
        }
        let coefficients = problem.coefficients();
        if !matches!(coefficients.form(), CoefficientForm::Standard) {
            return Err(PdeError::NotSupported(
                "explicit solver only handles the standard coefficient form".to_string(),
            ));
        }

        let n = grid.num_space_nodes();
        let n_t = grid.num_time_nodes();
        debug!("explicit solve: {n_t} time nodes, {n} space nodes");

        let stencils = SpatialStencils::new(grid);
        let mut ops = OperatorRows::new(n);
        let mut f = initial_values(coefficients, grid)?;
        let mut next = vec![0.0; n];
        let mut slices = self.full_results.then(|| vec![f.clone()]);

        for step in 1..n_t {
            let t_old = grid.time_node(step - 1);
            let t_new = grid.time_node(step);
            let dt = grid.time_step(step - 1);

            ops.evaluate(coefficients, grid, &stencils, t_old);
            for i in 1..n - 1 {
                next[i] = f[i] - dt * ops.apply(i, &f);
            }

            let lower = boundary_equation(
                problem.lower(),
                BoundarySide::Lower,
                coefficients,
                grid,
                t_old,
                t_new,
                &f,
            )?;
            let upper = boundary_equation(
                problem.upper(),
                BoundarySide::Upper,
                coefficients,
                grid,
                t_old,
                t_new,
                &f,
            )?;
            solve_edges(&lower, &upper, &mut next)?;
            check_finite(&next, t_new)?;

            std::mem::swap(&mut f, &mut next);
            if let Some(slices) = slices.as_mut() {
                slices.push(f.clone());
            }
        }

        match slices {
            Some(slices) => Ok(PdeResults::Full(PdeFullResults::new(grid.clone(), slices)?)),
            None => Ok(PdeResults::Terminal(PdeTerminalResults::new(grid.clone(), f)?)),
        }
    }
}

/// Solves the two boundary equations for `f[0]` and `f[n-1]`, the interior
/// already known. A row may reach the opposite edge on a tiny grid, so the
/// pair is treated as a 2x2 system.
fn solve_edges(
    lower: &BoundaryEquation,
    upper: &BoundaryEquation,
    f: &mut [f64],
) -> Result<(), PdeError> {
    let last = f.len() - 1;
    // (weight on f[0], weight on f[last], rhs less the interior terms)
    let split = |eq: &BoundaryEquation| {
        let mut on_first = 0.0;
        let mut on_last = 0.0;
        let mut interior = 0.0;
        for (k, w) in eq.weights.iter().enumerate() {
            let node = eq.start + k;
            if node == 0 {
                on_first += w;
            } else if node == last {
                on_last += w;
            } else {
                interior += w * f[node];
            }
        }
        (on_first, on_last, eq.rhs - interior)
    };

    let (a00, a01, r0) = split(lower);
    let (a10, a11, r1) = split(upper);
    let det = a00 * a11 - a01 * a10;
    if det == 0.0 || !det.is_finite() {
        return Err(PdeError::NumericalError(
            "boundary equations are singular".to_string(),
        ));
    }
    f[0] = (r0 * a11 - a01 * r1) / det;
    f[last] = (a00 * r1 - r0 * a10) / det;
    Ok(())
}
