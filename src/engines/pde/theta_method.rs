use log::{debug, trace, warn};

use super::fd_common::{
    OperatorRows, SpatialStencils, check_finite, free_boundary_floor, initial_values,
    inject_boundaries,
};
use super::grid::PdeGrid1D;
use super::problem::PdeProblem;
use super::results::{PdeFullResults, PdeResults, PdeTerminalResults};
use crate::core::{ConvectionDiffusionSolver, PdeError, SorConfig, ThetaSolverConfig};
use crate::math::sor::{DenseSystem, SorSolver};
use crate::math::tridiagonal::TridiagonalSystem;

/// Theta-weighted finite-difference solver.
///
/// Each step solves
/// `(I + theta dt L_new) f_new = (I - (1 - theta) dt L_old) f_old`
/// with the boundary rows substituted in. A tridiagonal solve of the same
/// system is kept as is when there is no free boundary and its residual meets
/// the SOR tolerance. Otherwise it seeds projected SOR, which clamps every
/// relaxation update to `g(t_new, x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThetaMethodSolver {
    config: ThetaSolverConfig,
}

impl ThetaMethodSolver {
    /// Creates a solver with weighting `theta` in `[0, 1]`.
    pub fn new(theta: f64) -> Result<Self, PdeError> {
        Self::from_config(ThetaSolverConfig {
            theta,
            ..ThetaSolverConfig::default()
        })
    }

    /// `theta = 0.5`.
    pub fn crank_nicolson() -> Self {
        Self::default()
    }

    /// `theta = 1`.
    pub fn fully_implicit() -> Self {
        Self {
            config: ThetaSolverConfig {
                theta: 1.0,
                ..ThetaSolverConfig::default()
            },
        }
    }

    pub fn from_config(config: ThetaSolverConfig) -> Result<Self, PdeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Keep every time slice in the output.
    pub fn with_full_results(mut self, full_results: bool) -> Self {
        self.config.full_results = full_results;
        self
    }

    pub fn with_sor_config(mut self, sor: SorConfig) -> Self {
        self.config.sor = sor;
        self
    }

    pub fn theta(&self) -> f64 {
        self.config.theta
    }

    pub fn config(&self) -> &ThetaSolverConfig {
        &self.config
    }
}

impl ConvectionDiffusionSolver for ThetaMethodSolver {
    fn solve_on_grid(&self, problem: &PdeProblem, grid: &PdeGrid1D) -> Result<PdeResults, PdeError> {
        self.config.validate()?;
        problem.validate_grid(grid)?;
        let coefficients = problem.coefficients();
        if coefficients.coupling().is_some() {
            return Err(PdeError::NotSupported(
                "coupled coefficients need the coupled theta solver".to_string(),
            ));
        }

        let sor = SorSolver::new(self.config.sor)?;
        let theta = self.config.theta;
        let n = grid.num_space_nodes();
        let n_t = grid.num_time_nodes();
        debug!(
            "theta-method solve: theta={theta}, {n_t} time nodes, {n} space nodes, free boundary={}",
            problem.has_free_boundary()
        );

        let stencils = SpatialStencils::new(grid);
        let mut f = initial_values(coefficients, grid)?;
        let mut slices = self.config.full_results.then(|| {
            let mut slices = Vec::with_capacity(n_t);
            slices.push(f.clone());
            slices
        });

        let mut old_ops = OperatorRows::new(n);
        let mut new_ops = OperatorRows::new(n);
        old_ops.evaluate(coefficients, grid, &stencils, grid.time_node(0));

        let mut system = DenseSystem::new(n);
        let mut tridiagonal = TridiagonalSystem::new(n);
        let mut next = vec![0.0; n];
        let mut floor = problem.has_free_boundary().then(|| vec![0.0; n]);
        let mut cold_start_reported = false;
        let mut total_sweeps = 0usize;

        for step in 1..n_t {
            let t_old = grid.time_node(step - 1);
            let t_new = grid.time_node(step);
            let dt = grid.time_step(step - 1);

            new_ops.evaluate(coefficients, grid, &stencils, t_new);
            system.clear();
            for i in 1..n - 1 {
                let explicit_part = old_ops.apply(i, &f);
                system.set_rhs(i, f[i] - (1.0 - theta) * dt * explicit_part);
                let [l, d, u] = new_ops.row(i);
                system.set_row(i, i - 1, &[theta * dt * l, 1.0 + theta * dt * d, theta * dt * u]);
            }
            inject_boundaries(&mut system, 0, problem, grid, t_old, t_new, &f)?;

            if let Some(floor) = floor.as_mut() {
                free_boundary_floor(problem, grid, t_new, floor);
            }

            next.copy_from_slice(&f);
            let warm = system.fill_tridiagonal(&mut tridiagonal)
                && tridiagonal.solve_into(&mut next).is_ok();
            if !warm {
                next.copy_from_slice(&f);
                if !cold_start_reported {
                    warn!("tridiagonal warm start unavailable at t={t_new}, relaxing from previous slice");
                    cold_start_reported = true;
                }
            }

            if warm && floor.is_none() && sor.accepts(&system, &next) {
                trace!("step {step}: t={t_new:.6}, direct solve accepted");
            } else {
                let report = sor.solve(&system, &mut next, floor.as_deref())?;
                total_sweeps += report.sweeps;
                trace!(
                    "step {step}: t={t_new:.6}, {} sweeps, error={:.3e}",
                    report.sweeps, report.relative_error
                );
            }
            check_finite(&next, t_new)?;

            std::mem::swap(&mut f, &mut next);
            std::mem::swap(&mut old_ops, &mut new_ops);
            if let Some(slices) = slices.as_mut() {
                slices.push(f.clone());
            }
        }

        debug!(
            "theta-method solve finished: {} steps, {total_sweeps} relaxation sweeps",
            n_t - 1
        );
        match slices {
            Some(slices) => Ok(PdeResults::Full(PdeFullResults::new(grid.clone(), slices)?)),
            None => Ok(PdeResults::Terminal(PdeTerminalResults::new(grid.clone(), f)?)),
        }
    }
}
