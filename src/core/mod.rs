//! Core traits, the library-wide error type and solver configuration.

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;

use crate::engines::pde::{PdeGrid1D, PdeProblem, PdeResults};

/// Errors surfaced by grid construction, boundary setup and the PDE solvers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PdeError {
    /// Input validation error raised at construction time.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Malformed grid, or a boundary level that does not sit on the grid edge.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    /// The solver variant cannot honour the requested feature.
    #[error("not supported: {0}")]
    NotSupported(String),
    /// Non-convergence in an iterative algorithm.
    #[error("convergence failure: {0}")]
    ConvergenceFailure(String),
    /// Numerical issue (zero pivot, overflow, invalid state, etc.).
    #[error("numerical error: {0}")]
    NumericalError(String),
}

/// Solver abstraction over a one-dimensional convection-diffusion problem.
///
/// The PDE is `df/dt + a(t,x) d2f/dx2 + b(t,x) df/dx + c(t,x) f = 0`, stepped
/// forward from the initial condition at `t = 0`.
pub trait ConvectionDiffusionSolver {
    /// Solves the problem on a pre-built (possibly non-uniform) grid.
    fn solve_on_grid(&self, problem: &PdeProblem, grid: &PdeGrid1D)
    -> Result<PdeResults, PdeError>;

    /// Solves the problem on a uniform grid spanning the two boundary levels.
    fn solve(
        &self,
        problem: &PdeProblem,
        time_steps: usize,
        space_steps: usize,
        t_max: f64,
    ) -> Result<PdeResults, PdeError> {
        let grid = PdeGrid1D::uniform(
            time_steps,
            space_steps,
            t_max,
            problem.lower().level(),
            problem.upper().level(),
        )?;
        self.solve_on_grid(problem, &grid)
    }
}
