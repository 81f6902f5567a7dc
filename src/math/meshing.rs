//! Point distributions used to lay out grid coordinates.
//!
//! [`HyperbolicMeshing`] concentrates points around a chosen interior location
//! with the sinh family `x_i = H + beta * sinh(gamma * i + delta)`; the
//! endpoints are pinned exactly to the requested bounds.

use crate::core::PdeError;

/// A monotone sequence of `num_points` coordinates.
pub trait MeshingFunction: std::fmt::Debug + Send + Sync {
    fn num_points(&self) -> usize;

    /// Coordinate of point `i`, `0 <= i < num_points()`.
    fn point(&self, i: usize) -> f64;

    fn points(&self) -> Vec<f64> {
        (0..self.num_points()).map(|i| self.point(i)).collect()
    }
}

fn check_bounds(lower: f64, upper: f64, num_points: usize) -> Result<(), PdeError> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(PdeError::InvalidInput(
            "mesh bounds must be finite".to_string(),
        ));
    }
    if upper <= lower {
        return Err(PdeError::InvalidInput(format!(
            "mesh upper bound {upper} must exceed lower bound {lower}"
        )));
    }
    if num_points < 2 {
        return Err(PdeError::InvalidInput(
            "mesh needs at least 2 points".to_string(),
        ));
    }
    Ok(())
}

/// Evenly spaced points from `lower` to `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformMeshing {
    lower: f64,
    upper: f64,
    num_points: usize,
}

impl UniformMeshing {
    pub fn new(lower: f64, upper: f64, num_points: usize) -> Result<Self, PdeError> {
        check_bounds(lower, upper, num_points)?;
        Ok(Self {
            lower,
            upper,
            num_points,
        })
    }
}

impl MeshingFunction for UniformMeshing {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn point(&self, i: usize) -> f64 {
        let n = self.num_points - 1;
        if i == n {
            return self.upper;
        }
        self.lower + (self.upper - self.lower) * i as f64 / n as f64
    }
}

/// Points bunched around `heart` using a hyperbolic-sine map.
///
/// `bunching` is relative to the domain width: small values give tight
/// concentration near `heart`, values around 1 or more are close to uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperbolicMeshing {
    lower: f64,
    upper: f64,
    heart: f64,
    num_points: usize,
    beta: f64,
    gamma: f64,
    delta: f64,
}

impl HyperbolicMeshing {
    pub fn new(
        lower: f64,
        upper: f64,
        heart: f64,
        num_points: usize,
        bunching: f64,
    ) -> Result<Self, PdeError> {
        check_bounds(lower, upper, num_points)?;
        if !heart.is_finite() || heart < lower || heart > upper {
            return Err(PdeError::InvalidInput(format!(
                "mesh heart {heart} must lie in [{lower}, {upper}]"
            )));
        }
        if !bunching.is_finite() || bunching <= 0.0 {
            return Err(PdeError::InvalidInput(
                "mesh bunching parameter must be finite and > 0".to_string(),
            ));
        }

        let beta = bunching * (upper - lower);
        let delta = ((lower - heart) / beta).asinh();
        let gamma = (((upper - heart) / beta).asinh() - delta) / (num_points - 1) as f64;

        Ok(Self {
            lower,
            upper,
            heart,
            num_points,
            beta,
            gamma,
            delta,
        })
    }

    pub fn heart(&self) -> f64 {
        self.heart
    }
}

impl MeshingFunction for HyperbolicMeshing {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn point(&self, i: usize) -> f64 {
        if i == 0 {
            return self.lower;
        }
        if i == self.num_points - 1 {
            return self.upper;
        }
        self.heart + self.beta * (self.gamma * i as f64 + self.delta).sinh()
    }
}
