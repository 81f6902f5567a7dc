//! OpenFerric PDE is a finite-difference toolkit for one-dimensional parabolic
//! equations of the form
//!
//! ```text
//! df/dt + a(t,x) d2f/dx2 + b(t,x) df/dx + c(t,x) f = 0
//! ```
//!
//! stepped forward in `t` from an initial condition `f(0, x)`. Option pricing
//! problems fit this shape once `t` is read as time-to-expiry.
//!
//! The crate provides:
//! - space-time grids, uniform or built from meshing functions (`math::meshing`),
//! - Dirichlet, Neumann and fixed-second-derivative boundary conditions,
//! - a theta-method solver (explicit through Crank-Nicolson to fully implicit)
//!   with an optional free boundary for early exercise,
//! - Richardson extrapolation in time around any solver,
//! - an explicit reference solver and a coupled two-equation solver.
//!
//! Numerical considerations:
//! - Every linear solve is projected SOR warm-started from a tridiagonal solve;
//!   its controls live in [`core::SorConfig`].
//! - The explicit solver is only conditionally stable.
//!
//! # Feature Flags
//! - `parallel`: runs the two inner solves of Richardson extrapolation on Rayon.
//!
//! # Quick Start
//! Price an at-the-money European call under Black-Scholes:
//! ```rust
//! use openferric_pde::core::{ConvectionDiffusionSolver, OptionType};
//! use openferric_pde::engines::pde::{providers, BoundaryCondition, PdeProblem, ThetaMethodSolver};
//!
//! let (r, k, s_max) = (0.05, 100.0, 400.0);
//! let coefficients = providers::black_scholes(r, 0.0, 0.2, k, OptionType::Call).unwrap();
//! let problem = PdeProblem::new(
//!     coefficients,
//!     BoundaryCondition::dirichlet_constant(0.0, 0.0).unwrap(),
//!     BoundaryCondition::dirichlet(s_max, move |t: f64| s_max - k * (-r * t).exp()).unwrap(),
//! )
//! .unwrap();
//!
//! let res = ThetaMethodSolver::crank_nicolson()
//!     .solve(&problem, 100, 200, 1.0)
//!     .unwrap();
//! let px = res.function_value(50); // spot 100
//! assert!((px - 10.4506).abs() < 0.05);
//! ```

pub mod core;
pub mod engines;
pub mod math;
