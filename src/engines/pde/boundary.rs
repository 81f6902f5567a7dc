//! Boundary conditions expressed as matrix rows.
//!
//! Each condition contributes one equation to the linear system solved at a
//! time step: `left_row . f_new = right_row . f_old + constant(t)`. Rows of a
//! lower boundary start at node 0; rows of an upper boundary end at the last
//! node.

use std::fmt;
use std::sync::Arc;

use super::coefficients::{CurveFn, PdeCoefficients};
use super::grid::PdeGrid1D;
use crate::core::PdeError;

/// Which edge of the space domain a condition sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySide {
    Lower,
    Upper,
}

/// Closed set of supported boundary conditions.
#[derive(Clone)]
pub enum BoundaryCondition {
    /// `f(t, level) = value(t)`.
    Dirichlet { level: f64, value: CurveFn },
    /// `df/dx(t, level) = derivative(t)`, one-sided stencil pointing into the domain.
    Neumann {
        level: f64,
        side: BoundarySide,
        derivative: CurveFn,
    },
    /// `d2f/dx2(t, level) = value`.
    FixedSecondDerivative {
        level: f64,
        side: BoundarySide,
        value: f64,
    },
}

impl fmt::Debug for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dirichlet { level, .. } => {
                f.debug_struct("Dirichlet").field("level", level).finish_non_exhaustive()
            }
            Self::Neumann { level, side, .. } => f
                .debug_struct("Neumann")
                .field("level", level)
                .field("side", side)
                .finish_non_exhaustive(),
            Self::FixedSecondDerivative { level, side, value } => f
                .debug_struct("FixedSecondDerivative")
                .field("level", level)
                .field("side", side)
                .field("value", value)
                .finish(),
        }
    }
}

fn check_level(level: f64) -> Result<(), PdeError> {
    if !level.is_finite() {
        return Err(PdeError::InvalidInput(
            "boundary level must be finite".to_string(),
        ));
    }
    Ok(())
}

impl BoundaryCondition {
    /// Time-varying Dirichlet condition.
    pub fn dirichlet<F>(level: f64, value: F) -> Result<Self, PdeError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        check_level(level)?;
        Ok(Self::Dirichlet {
            level,
            value: Arc::new(value),
        })
    }

    pub fn dirichlet_constant(level: f64, value: f64) -> Result<Self, PdeError> {
        if !value.is_finite() {
            return Err(PdeError::InvalidInput(
                "dirichlet value must be finite".to_string(),
            ));
        }
        Self::dirichlet(level, move |_| value)
    }

    /// Time-varying Neumann condition.
    pub fn neumann<F>(level: f64, side: BoundarySide, derivative: F) -> Result<Self, PdeError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        check_level(level)?;
        Ok(Self::Neumann {
            level,
            side,
            derivative: Arc::new(derivative),
        })
    }

    pub fn fixed_second_derivative(
        level: f64,
        side: BoundarySide,
        value: f64,
    ) -> Result<Self, PdeError> {
        check_level(level)?;
        if !value.is_finite() {
            return Err(PdeError::InvalidInput(
                "second derivative value must be finite".to_string(),
            ));
        }
        Ok(Self::FixedSecondDerivative { level, side, value })
    }

    /// Spatial coordinate the condition applies at.
    pub fn level(&self) -> f64 {
        match self {
            Self::Dirichlet { level, .. }
            | Self::Neumann { level, .. }
            | Self::FixedSecondDerivative { level, .. } => *level,
        }
    }

    /// Side the condition was built for; Dirichlet fits either.
    pub fn side(&self) -> Option<BoundarySide> {
        match self {
            Self::Dirichlet { .. } => None,
            Self::Neumann { side, .. } | Self::FixedSecondDerivative { side, .. } => Some(*side),
        }
    }

    /// Right-hand-side constant at time `t`.
    pub fn constant(&self, _coefficients: &PdeCoefficients, t: f64) -> f64 {
        match self {
            Self::Dirichlet { value, .. } => value(t),
            Self::Neumann { derivative, .. } => derivative(t),
            Self::FixedSecondDerivative { value, .. } => *value,
        }
    }

    /// Weights on the unknown new-time values at and next to the boundary.
    pub fn left_row(&self, _coefficients: &PdeCoefficients, grid: &PdeGrid1D, _t: f64) -> Vec<f64> {
        let last = grid.num_space_nodes() - 1;
        match self {
            Self::Dirichlet { .. } => vec![1.0],
            Self::Neumann { side, .. } => {
                let stencil = match side {
                    BoundarySide::Lower => grid.first_derivative_forward_coefficients(0),
                    BoundarySide::Upper => grid.first_derivative_backward_coefficients(last),
                };
                stencil.weights.to_vec()
            }
            Self::FixedSecondDerivative { side, .. } => {
                let node = match side {
                    BoundarySide::Lower => 0,
                    BoundarySide::Upper => last,
                };
                grid.second_derivative_coefficients(node).weights.to_vec()
            }
        }
    }

    /// Weights on the known old-time values; empty for all current variants.
    pub fn right_row(
        &self,
        _coefficients: &PdeCoefficients,
        _grid: &PdeGrid1D,
        _t: f64,
    ) -> Vec<f64> {
        Vec::new()
    }
}
