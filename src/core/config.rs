//! Serializable solver configuration and the named numerical defaults.

use serde::{Deserialize, Serialize};

use super::PdeError;

/// Crank-Nicolson weighting.
pub const DEFAULT_THETA: f64 = 0.5;
/// Plain Gauss-Seidel relaxation.
pub const DEFAULT_SOR_OMEGA: f64 = 1.0;
/// Relative squared-correction threshold that ends the relaxation loop.
pub const DEFAULT_SOR_TOLERANCE: f64 = 1.0e-18;
/// Added to the squared solution scale so near-zero solutions still converge.
pub const DEFAULT_SCALE_FLOOR: f64 = 1.0e-10;
/// Relaxation sweeps allowed per linear solve before giving up.
pub const DEFAULT_MAX_SWEEPS: usize = 100_000;
/// Allowed gap between a boundary level and the matching grid edge.
pub const BOUNDARY_LEVEL_TOLERANCE: f64 = 1.0e-7;

/// Successive-over-relaxation controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SorConfig {
    /// Relaxation factor, `1.0` is Gauss-Seidel.
    #[serde(default = "default_omega")]
    pub omega: f64,
    /// Stop once `sum(correction^2) / (sum(f^2) + scale_floor)` drops to this level.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_scale_floor")]
    pub scale_floor: f64,
    /// Sweep cap; hitting it is reported as a convergence failure.
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,
}

const fn default_omega() -> f64 {
    DEFAULT_SOR_OMEGA
}

const fn default_tolerance() -> f64 {
    DEFAULT_SOR_TOLERANCE
}

const fn default_scale_floor() -> f64 {
    DEFAULT_SCALE_FLOOR
}

const fn default_max_sweeps() -> usize {
    DEFAULT_MAX_SWEEPS
}

const fn default_theta() -> f64 {
    DEFAULT_THETA
}

impl Default for SorConfig {
    fn default() -> Self {
        Self {
            omega: DEFAULT_SOR_OMEGA,
            tolerance: DEFAULT_SOR_TOLERANCE,
            scale_floor: DEFAULT_SCALE_FLOOR,
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }
}

impl SorConfig {
    /// Checks the relaxation controls are usable.
    pub fn validate(&self) -> Result<(), PdeError> {
        if !self.omega.is_finite() || self.omega <= 0.0 || self.omega >= 2.0 {
            return Err(PdeError::InvalidInput(
                "sor omega must lie in (0, 2)".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(PdeError::InvalidInput(
                "sor tolerance must be finite and > 0".to_string(),
            ));
        }
        if !self.scale_floor.is_finite() || self.scale_floor < 0.0 {
            return Err(PdeError::InvalidInput(
                "sor scale_floor must be finite and >= 0".to_string(),
            ));
        }
        if self.max_sweeps == 0 {
            return Err(PdeError::InvalidInput(
                "sor max_sweeps must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the theta-weighted time-stepping solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaSolverConfig {
    /// `0` explicit, `0.5` Crank-Nicolson, `1` fully implicit.
    #[serde(default = "default_theta")]
    pub theta: f64,
    /// Keep every time slice instead of only the terminal one.
    #[serde(default)]
    pub full_results: bool,
    #[serde(default)]
    pub sor: SorConfig,
}

impl Default for ThetaSolverConfig {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            full_results: false,
            sor: SorConfig::default(),
        }
    }
}

impl ThetaSolverConfig {
    pub fn validate(&self) -> Result<(), PdeError> {
        if !(0.0..=1.0).contains(&self.theta) {
            return Err(PdeError::InvalidInput(
                "theta must be in the range 0 to 1".to_string(),
            ));
        }
        self.sor.validate()
    }
}
