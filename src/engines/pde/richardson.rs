use log::debug;

use super::grid::PdeGrid1D;
use super::problem::PdeProblem;
use super::results::{PdeFullResults, PdeResults, PdeTerminalResults};
use crate::core::{ConvectionDiffusionSolver, PdeError};

/// Richardson extrapolation in time around any base solver.
///
/// Solves on the given grid and on a copy with every time step halved, then
/// returns `2 f_fine - f_coarse` at the coarse grid's nodes. This cancels the
/// leading first-order time error of a `theta = 1` base solver.
#[derive(Debug, Clone, Copy)]
pub struct RichardsonExtrapolation<S> {
    base: S,
}

impl<S> RichardsonExtrapolation<S> {
    pub fn new(base: S) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &S {
        &self.base
    }
}

impl<S: ConvectionDiffusionSolver + Sync> RichardsonExtrapolation<S> {
    #[cfg(feature = "parallel")]
    fn solve_pair(
        &self,
        problem: &PdeProblem,
        coarse: &PdeGrid1D,
        fine: &PdeGrid1D,
    ) -> (Result<PdeResults, PdeError>, Result<PdeResults, PdeError>) {
        rayon::join(
            || self.base.solve_on_grid(problem, coarse),
            || self.base.solve_on_grid(problem, fine),
        )
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_pair(
        &self,
        problem: &PdeProblem,
        coarse: &PdeGrid1D,
        fine: &PdeGrid1D,
    ) -> (Result<PdeResults, PdeError>, Result<PdeResults, PdeError>) {
        (
            self.base.solve_on_grid(problem, coarse),
            self.base.solve_on_grid(problem, fine),
        )
    }
}

impl<S: ConvectionDiffusionSolver + Sync> ConvectionDiffusionSolver for RichardsonExtrapolation<S> {
    fn solve_on_grid(&self, problem: &PdeProblem, grid: &PdeGrid1D) -> Result<PdeResults, PdeError> {
        problem.validate_grid(grid)?;
        let fine_grid = grid.with_double_time_steps();
        debug!(
            "richardson extrapolation: {} coarse and {} fine time nodes",
            grid.num_time_nodes(),
            fine_grid.num_time_nodes()
        );

        let (coarse, fine) = self.solve_pair(problem, grid, &fine_grid);
        match (coarse?, fine?) {
            (PdeResults::Terminal(coarse), PdeResults::Terminal(fine)) => {
                let values = extrapolate(coarse.values(), fine.values());
                Ok(PdeResults::Terminal(PdeTerminalResults::new(grid.clone(), values)?))
            }
            (PdeResults::Full(coarse), PdeResults::Full(fine)) => {
                let slices = (0..coarse.num_time_nodes())
                    .map(|n| extrapolate(coarse.time_slice(n), fine.time_slice(2 * n)))
                    .collect();
                Ok(PdeResults::Full(PdeFullResults::new(grid.clone(), slices)?))
            }
            _ => Err(PdeError::NumericalError(
                "base solver returned results of different kinds".to_string(),
            )),
        }
    }
}

fn extrapolate(coarse: &[f64], fine: &[f64]) -> Vec<f64> {
    coarse
        .iter()
        .zip(fine)
        .map(|(c, f)| 2.0 * f - c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::pde::boundary::BoundaryCondition;
    use crate::engines::pde::coefficients::PdeCoefficients;
    use crate::engines::pde::theta_method::ThetaMethodSolver;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn full_results_combine_matching_time_nodes() {
        let problem = PdeProblem::new(
            PdeCoefficients::constant(-1.0, 0.0, 0.0, |x| (PI * x).sin()).unwrap(),
            BoundaryCondition::dirichlet_constant(0.0, 0.0).unwrap(),
            BoundaryCondition::dirichlet_constant(1.0, 0.0).unwrap(),
        )
        .unwrap();
        let base = ThetaMethodSolver::fully_implicit().with_full_results(true);
        let res = RichardsonExtrapolation::new(base)
            .solve(&problem, 8, 20, 0.2)
            .unwrap();
        let full = res.as_full().unwrap();
        assert_eq!(full.num_time_nodes(), 9);
        // The initial slice is untouched: 2 f0 - f0.
        assert_relative_eq!(full.function_value(10, 0), 1.0, epsilon = 1e-12);

        let terminal = RichardsonExtrapolation::new(ThetaMethodSolver::fully_implicit())
            .solve(&problem, 8, 20, 0.2)
            .unwrap();
        for i in 0..=20 {
            assert_relative_eq!(
                full.terminal_values()[i],
                terminal.function_value(i),
                epsilon = 1e-8
            );
        }
    }
}
