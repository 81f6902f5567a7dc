use std::fmt;
use std::sync::Arc;

use super::boundary::{BoundaryCondition, BoundarySide};
use super::coefficients::{PdeCoefficients, SurfaceFn};
use super::grid::PdeGrid1D;
use crate::core::{BOUNDARY_LEVEL_TOLERANCE, PdeError};

/// Everything a solver needs besides the grid: coefficients, both boundary
/// conditions and an optional free-boundary floor `g(t, x)`.
#[derive(Clone)]
pub struct PdeProblem {
    coefficients: PdeCoefficients,
    lower: BoundaryCondition,
    upper: BoundaryCondition,
    free_boundary: Option<SurfaceFn>,
}

impl fmt::Debug for PdeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdeProblem")
            .field("coefficients", &self.coefficients)
            .field("lower", &self.lower)
            .field("upper", &self.upper)
            .field("free_boundary", &self.free_boundary.is_some())
            .finish()
    }
}

impl PdeProblem {
    pub fn new(
        coefficients: PdeCoefficients,
        lower: BoundaryCondition,
        upper: BoundaryCondition,
    ) -> Result<Self, PdeError> {
        if lower.level() >= upper.level() {
            return Err(PdeError::InvalidInput(format!(
                "lower boundary level {} must be below upper boundary level {}",
                lower.level(),
                upper.level()
            )));
        }
        if lower.side() == Some(BoundarySide::Upper) {
            return Err(PdeError::InvalidInput(
                "lower boundary was built for the upper side".to_string(),
            ));
        }
        if upper.side() == Some(BoundarySide::Lower) {
            return Err(PdeError::InvalidInput(
                "upper boundary was built for the lower side".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            lower,
            upper,
            free_boundary: None,
        })
    }

    /// Adds a floor the solution may never fall below (early exercise).
    pub fn with_free_boundary<F>(mut self, free_boundary: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.free_boundary = Some(Arc::new(free_boundary));
        self
    }

    pub fn with_shared_free_boundary(mut self, free_boundary: SurfaceFn) -> Self {
        self.free_boundary = Some(free_boundary);
        self
    }

    pub fn coefficients(&self) -> &PdeCoefficients {
        &self.coefficients
    }

    pub fn lower(&self) -> &BoundaryCondition {
        &self.lower
    }

    pub fn upper(&self) -> &BoundaryCondition {
        &self.upper
    }

    pub fn free_boundary(&self) -> Option<&SurfaceFn> {
        self.free_boundary.as_ref()
    }

    pub fn has_free_boundary(&self) -> bool {
        self.free_boundary.is_some()
    }

    /// Checks both boundary levels sit on the grid edges.
    pub fn validate_grid(&self, grid: &PdeGrid1D) -> Result<(), PdeError> {
        let checks = [
            ("lower", self.lower.level(), grid.lower_level()),
            ("upper", self.upper.level(), grid.upper_level()),
        ];
        for (name, level, edge) in checks {
            if (level - edge).abs() > BOUNDARY_LEVEL_TOLERANCE {
                return Err(PdeError::InvalidGrid(format!(
                    "{name} boundary level {level} does not match grid edge {edge}"
                )));
            }
        }
        Ok(())
    }
}
