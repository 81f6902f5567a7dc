//! Finite-difference solvers for one-dimensional convection-diffusion PDEs.

pub mod boundary;
pub mod coefficients;
pub mod coupled;
pub mod explicit;
mod fd_common;
pub mod grid;
pub mod problem;
pub mod providers;
pub mod results;
pub mod richardson;
pub mod theta_method;

pub use boundary::{BoundaryCondition, BoundarySide};
pub use coefficients::{CoefficientForm, CurveFn, PdeCoefficients, SurfaceFn};
pub use coupled::{CoupledPdeProblem, CoupledThetaSolver};
pub use explicit::ExplicitFiniteDifference;
pub use grid::{PdeGrid1D, Stencil};
pub use problem::PdeProblem;
pub use results::{PdeFullResults, PdeResults, PdeTerminalResults};
pub use richardson::RichardsonExtrapolation;
pub use theta_method::ThetaMethodSolver;
