//! Two PDEs sharing one grid and coupled through their zeroth-order terms:
//!
//! ```text
//! df/dt + a1 f_xx + b1 f_x + c1 f + lambda1 g = 0
//! dg/dt + a2 g_xx + b2 g_x + c2 g + lambda2 f = 0
//! ```
//!
//! Both are stepped together as one `2N` system relaxed by projected SOR.

use log::{debug, trace};

use super::fd_common::{
    OperatorRows, SpatialStencils, check_finite, free_boundary_floor, initial_values,
    inject_boundaries,
};
use super::grid::PdeGrid1D;
use super::problem::PdeProblem;
use super::results::{PdeFullResults, PdeResults, PdeTerminalResults};
use crate::core::{PdeError, SorConfig, ThetaSolverConfig};
use crate::math::sor::{DenseSystem, SorSolver};

/// A pair of problems whose coefficient bundles both carry a coupling constant.
#[derive(Debug, Clone)]
pub struct CoupledPdeProblem {
    first: PdeProblem,
    second: PdeProblem,
}

impl CoupledPdeProblem {
    pub fn new(first: PdeProblem, second: PdeProblem) -> Result<Self, PdeError> {
        for (name, problem) in [("first", &first), ("second", &second)] {
            if problem.coefficients().coupling().is_none() {
                return Err(PdeError::InvalidInput(format!(
                    "{name} problem has no coupling constant"
                )));
            }
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &PdeProblem {
        &self.first
    }

    pub fn second(&self) -> &PdeProblem {
        &self.second
    }

    fn lambdas(&self) -> (f64, f64) {
        (
            self.first.coefficients().coupling().unwrap_or(0.0),
            self.second.coefficients().coupling().unwrap_or(0.0),
        )
    }
}

/// Theta-method solver for a [`CoupledPdeProblem`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CoupledThetaSolver {
    config: ThetaSolverConfig,
}

impl CoupledThetaSolver {
    pub fn new(theta: f64) -> Result<Self, PdeError> {
        Self::from_config(ThetaSolverConfig {
            theta,
            ..ThetaSolverConfig::default()
        })
    }

    pub fn from_config(config: ThetaSolverConfig) -> Result<Self, PdeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_full_results(mut self, full_results: bool) -> Self {
        self.config.full_results = full_results;
        self
    }

    pub fn with_sor_config(mut self, sor: SorConfig) -> Self {
        self.config.sor = sor;
        self
    }

    pub fn config(&self) -> &ThetaSolverConfig {
        &self.config
    }

    /// Solves on a uniform grid spanning the first problem's boundary levels.
    pub fn solve(
        &self,
        problem: &CoupledPdeProblem,
        time_steps: usize,
        space_steps: usize,
        t_max: f64,
    ) -> Result<(PdeResults, PdeResults), PdeError> {
        let grid = PdeGrid1D::uniform(
            time_steps,
            space_steps,
            t_max,
            problem.first.lower().level(),
            problem.first.upper().level(),
        )?;
        self.solve_on_grid(problem, &grid)
    }

    pub fn solve_on_grid(
        &self,
        problem: &CoupledPdeProblem,
        grid: &PdeGrid1D,
    ) -> Result<(PdeResults, PdeResults), PdeError> {
        self.config.validate()?;
        problem.first.validate_grid(grid)?;
        problem.second.validate_grid(grid)?;

        let sor = SorSolver::new(self.config.sor)?;
        let theta = self.config.theta;
        let (lambda1, lambda2) = problem.lambdas();
        let n = grid.num_space_nodes();
        let n_t = grid.num_time_nodes();
        debug!(
            "coupled theta solve: theta={theta}, lambda=({lambda1}, {lambda2}), {n_t} time nodes, {n} space nodes"
        );

        let first = problem.first.coefficients();
        let second = problem.second.coefficients();
        let stencils = SpatialStencils::new(grid);

        // [f; g]
        let mut state = initial_values(first, grid)?;
        state.extend(initial_values(second, grid)?);
        let mut slices = self.config.full_results.then(|| {
            let mut slices = Vec::with_capacity(n_t);
            slices.push(state.clone());
            slices
        });

        let mut old_f = OperatorRows::new(n);
        let mut old_g = OperatorRows::new(n);
        let mut new_f = OperatorRows::new(n);
        let mut new_g = OperatorRows::new(n);
        old_f.evaluate(first, grid, &stencils, grid.time_node(0));
        old_g.evaluate(second, grid, &stencils, grid.time_node(0));

        let mut system = DenseSystem::new(2 * n);
        let mut next = vec![0.0; 2 * n];
        let constrained = problem.first.has_free_boundary() || problem.second.has_free_boundary();
        let mut floor = constrained.then(|| vec![f64::NEG_INFINITY; 2 * n]);

        for step in 1..n_t {
            let t_old = grid.time_node(step - 1);
            let t_new = grid.time_node(step);
            let dt = grid.time_step(step - 1);
            new_f.evaluate(first, grid, &stencils, t_new);
            new_g.evaluate(second, grid, &stencils, t_new);

            system.clear();
            {
                let (f, g) = state.split_at(n);
                for i in 1..n - 1 {
                    let rhs_f = f[i] - (1.0 - theta) * dt * (old_f.apply(i, f) + lambda1 * g[i]);
                    let [l, d, u] = new_f.row(i);
                    system.set_row(i, i - 1, &[theta * dt * l, 1.0 + theta * dt * d, theta * dt * u]);
                    system.set(i, n + i, theta * dt * lambda1);
                    system.set_rhs(i, rhs_f);

                    let rhs_g = g[i] - (1.0 - theta) * dt * (old_g.apply(i, g) + lambda2 * f[i]);
                    let [l, d, u] = new_g.row(i);
                    system.set(n + i, i, theta * dt * lambda2);
                    system.set_row(
                        n + i,
                        n + i - 1,
                        &[theta * dt * l, 1.0 + theta * dt * d, theta * dt * u],
                    );
                    system.set_rhs(n + i, rhs_g);
                }
                inject_boundaries(&mut system, 0, &problem.first, grid, t_old, t_new, f)?;
                inject_boundaries(&mut system, n, &problem.second, grid, t_old, t_new, g)?;
            }

            if let Some(floor) = floor.as_mut() {
                let (floor_f, floor_g) = floor.split_at_mut(n);
                free_boundary_floor(&problem.first, grid, t_new, floor_f);
                free_boundary_floor(&problem.second, grid, t_new, floor_g);
            }

            next.copy_from_slice(&state);
            let report = sor.solve(&system, &mut next, floor.as_deref())?;
            trace!(
                "coupled step {step}: t={t_new:.6}, {} sweeps, error={:.3e}",
                report.sweeps, report.relative_error
            );
            check_finite(&next, t_new)?;

            std::mem::swap(&mut state, &mut next);
            std::mem::swap(&mut old_f, &mut new_f);
            std::mem::swap(&mut old_g, &mut new_g);
            if let Some(slices) = slices.as_mut() {
                slices.push(state.clone());
            }
        }

        match slices {
            Some(slices) => {
                let (f, g): (Vec<_>, Vec<_>) = slices
                    .into_iter()
                    .map(|mut s| {
                        let g = s.split_off(n);
                        (s, g)
                    })
                    .unzip();
                Ok((
                    PdeResults::Full(PdeFullResults::new(grid.clone(), f)?),
                    PdeResults::Full(PdeFullResults::new(grid.clone(), g)?),
                ))
            }
            None => {
                let g = state.split_off(n);
                Ok((
                    PdeResults::Terminal(PdeTerminalResults::new(grid.clone(), state)?),
                    PdeResults::Terminal(PdeTerminalResults::new(grid.clone(), g)?),
                ))
            }
        }
    }
}
