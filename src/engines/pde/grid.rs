//! Time/space discretization and its finite-difference stencils.
//!
//! All stencils are three-point and account for unequal neighbouring steps,
//! so they hold for mesh-generated grids as well as uniform ones.

use serde::{Deserialize, Serialize};

use crate::core::PdeError;
use crate::math::meshing::MeshingFunction;

/// Three weights applied to consecutive nodes `start, start + 1, start + 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub start: usize,
    pub weights: [f64; 3],
}

impl Stencil {
    /// Weighted sum of `values` over the stencil nodes.
    #[inline]
    pub fn apply(&self, values: &[f64]) -> f64 {
        let v = &values[self.start..self.start + 3];
        self.weights[0] * v[0] + self.weights[1] * v[1] + self.weights[2] * v[2]
    }
}

#[derive(Deserialize)]
struct GridNodes {
    time_nodes: Vec<f64>,
    space_nodes: Vec<f64>,
}

impl TryFrom<GridNodes> for PdeGrid1D {
    type Error = PdeError;

    fn try_from(nodes: GridNodes) -> Result<Self, Self::Error> {
        PdeGrid1D::new(nodes.time_nodes, nodes.space_nodes)
    }
}

/// Immutable grid of strictly increasing time and space nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridNodes")]
pub struct PdeGrid1D {
    time_nodes: Vec<f64>,
    space_nodes: Vec<f64>,
    #[serde(skip_serializing)]
    dt: Vec<f64>,
    #[serde(skip_serializing)]
    dx: Vec<f64>,
}

fn check_strictly_increasing(nodes: &[f64], what: &str) -> Result<(), PdeError> {
    if nodes.iter().any(|x| !x.is_finite()) {
        return Err(PdeError::InvalidGrid(format!("{what} nodes must be finite")));
    }
    if let Some(pos) = nodes.windows(2).position(|w| w[1] <= w[0]) {
        return Err(PdeError::InvalidGrid(format!(
            "{what} nodes must be strictly increasing (index {})",
            pos + 1
        )));
    }
    Ok(())
}

impl PdeGrid1D {
    /// Grid from explicit coordinates; needs at least 2 time and 3 space nodes.
    pub fn new(time_nodes: Vec<f64>, space_nodes: Vec<f64>) -> Result<Self, PdeError> {
        if time_nodes.len() < 2 {
            return Err(PdeError::InvalidGrid(
                "need at least 2 time nodes".to_string(),
            ));
        }
        if space_nodes.len() < 3 {
            return Err(PdeError::InvalidGrid(
                "need at least 3 space nodes".to_string(),
            ));
        }
        check_strictly_increasing(&time_nodes, "time")?;
        check_strictly_increasing(&space_nodes, "space")?;

        let dt = time_nodes.windows(2).map(|w| w[1] - w[0]).collect();
        let dx = space_nodes.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(Self {
            time_nodes,
            space_nodes,
            dt,
            dx,
        })
    }

    /// Uniform grid on `[0, t_max] x [x_min, x_max]`.
    pub fn uniform(
        time_steps: usize,
        space_steps: usize,
        t_max: f64,
        x_min: f64,
        x_max: f64,
    ) -> Result<Self, PdeError> {
        if time_steps == 0 || space_steps < 2 {
            return Err(PdeError::InvalidGrid(
                "time_steps must be > 0 and space_steps must be >= 2".to_string(),
            ));
        }
        if !t_max.is_finite() || t_max <= 0.0 {
            return Err(PdeError::InvalidGrid(
                "t_max must be finite and > 0".to_string(),
            ));
        }
        if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
            return Err(PdeError::InvalidGrid(format!(
                "space range [{x_min}, {x_max}] must be finite and non-empty"
            )));
        }

        let time_nodes = (0..=time_steps)
            .map(|i| {
                if i == time_steps {
                    t_max
                } else {
                    t_max * i as f64 / time_steps as f64
                }
            })
            .collect();
        let space_nodes = (0..=space_steps)
            .map(|i| {
                if i == space_steps {
                    x_max
                } else {
                    x_min + (x_max - x_min) * i as f64 / space_steps as f64
                }
            })
            .collect();
        Self::new(time_nodes, space_nodes)
    }

    /// Grid from two meshing functions.
    pub fn from_meshes(
        time_mesh: &dyn MeshingFunction,
        space_mesh: &dyn MeshingFunction,
    ) -> Result<Self, PdeError> {
        Self::new(time_mesh.points(), space_mesh.points())
    }

    /// Same space nodes, with a midpoint inserted between every pair of time nodes.
    pub fn with_double_time_steps(&self) -> Self {
        let mut time_nodes = Vec::with_capacity(2 * self.time_nodes.len() - 1);
        for w in self.time_nodes.windows(2) {
            time_nodes.push(w[0]);
            time_nodes.push(0.5 * (w[0] + w[1]));
        }
        time_nodes.push(self.time_nodes[self.time_nodes.len() - 1]);

        let dt = time_nodes.windows(2).map(|w| w[1] - w[0]).collect();
        Self {
            time_nodes,
            space_nodes: self.space_nodes.clone(),
            dt,
            dx: self.dx.clone(),
        }
    }

    pub fn num_time_nodes(&self) -> usize {
        self.time_nodes.len()
    }

    pub fn num_space_nodes(&self) -> usize {
        self.space_nodes.len()
    }

    pub fn time_nodes(&self) -> &[f64] {
        &self.time_nodes
    }

    pub fn space_nodes(&self) -> &[f64] {
        &self.space_nodes
    }

    #[inline]
    pub fn time_node(&self, i: usize) -> f64 {
        self.time_nodes[i]
    }

    #[inline]
    pub fn space_node(&self, i: usize) -> f64 {
        self.space_nodes[i]
    }

    /// `t[i + 1] - t[i]`.
    #[inline]
    pub fn time_step(&self, i: usize) -> f64 {
        self.dt[i]
    }

    /// `x[i + 1] - x[i]`.
    #[inline]
    pub fn space_step(&self, i: usize) -> f64 {
        self.dx[i]
    }

    pub fn lower_level(&self) -> f64 {
        self.space_nodes[0]
    }

    pub fn upper_level(&self) -> f64 {
        self.space_nodes[self.space_nodes.len() - 1]
    }

    pub fn t_max(&self) -> f64 {
        self.time_nodes[self.time_nodes.len() - 1]
    }

    /// True when every space step is within `rel_tol` of the mean step.
    pub fn is_uniform_in_space(&self, rel_tol: f64) -> bool {
        is_uniform(&self.dx, rel_tol)
    }

    /// True when every time step is within `rel_tol` of the mean step.
    pub fn is_uniform_in_time(&self, rel_tol: f64) -> bool {
        is_uniform(&self.dt, rel_tol)
    }

    /// Central first-derivative weights at interior node `i` (nodes `i-1, i, i+1`).
    ///
    /// # Panics
    ///
    /// Panics if `i` is an edge node or lies outside the grid.
    pub fn first_derivative_coefficients(&self, i: usize) -> Stencil {
        assert!(
            i >= 1 && i + 1 < self.space_nodes.len(),
            "central stencil needs an interior node, got {i}"
        );
        let h_m = self.dx[i - 1];
        let h_p = self.dx[i];
        Stencil {
            start: i - 1,
            weights: [
                -h_p / (h_m * (h_m + h_p)),
                (h_p - h_m) / (h_m * h_p),
                h_m / (h_p * (h_m + h_p)),
            ],
        }
    }

    /// One-sided first-derivative weights at node `i` using `i, i+1, i+2`.
    ///
    /// # Panics
    ///
    /// Panics unless `i + 2` is a node of the grid.
    pub fn first_derivative_forward_coefficients(&self, i: usize) -> Stencil {
        assert!(
            i + 2 < self.space_nodes.len(),
            "forward stencil needs two nodes above {i}"
        );
        let h0 = self.dx[i];
        let h1 = self.dx[i + 1];
        Stencil {
            start: i,
            weights: [
                -(2.0 * h0 + h1) / (h0 * (h0 + h1)),
                (h0 + h1) / (h0 * h1),
                -h0 / (h1 * (h0 + h1)),
            ],
        }
    }

    /// One-sided first-derivative weights at node `i` using `i-2, i-1, i`.
    ///
    /// # Panics
    ///
    /// Panics if `i < 2` or `i` lies outside the grid.
    pub fn first_derivative_backward_coefficients(&self, i: usize) -> Stencil {
        assert!(
            i >= 2 && i < self.space_nodes.len(),
            "backward stencil needs two nodes below {i}"
        );
        let h0 = self.dx[i - 2];
        let h1 = self.dx[i - 1];
        Stencil {
            start: i - 2,
            weights: [
                h1 / (h0 * (h0 + h1)),
                -(h0 + h1) / (h0 * h1),
                (h0 + 2.0 * h1) / (h1 * (h0 + h1)),
            ],
        }
    }

    /// Second-derivative weights at node `i`.
    ///
    /// At the two edge nodes the stencil of the adjacent interior node is
    /// reused (first-order accurate there).
    ///
    /// # Panics
    ///
    /// Panics if `i` lies outside the grid.
    pub fn second_derivative_coefficients(&self, i: usize) -> Stencil {
        let n = self.space_nodes.len();
        assert!(i < n, "node {i} outside grid of {n} nodes");
        let centre = i.clamp(1, n - 2);
        let h_m = self.dx[centre - 1];
        let h_p = self.dx[centre];
        Stencil {
            start: centre - 1,
            weights: [
                2.0 / (h_m * (h_m + h_p)),
                -2.0 / (h_m * h_p),
                2.0 / (h_p * (h_m + h_p)),
            ],
        }
    }
}

fn is_uniform(steps: &[f64], rel_tol: f64) -> bool {
    let mean = steps.iter().sum::<f64>() / steps.len() as f64;
    steps
        .iter()
        .all(|h| (h - mean).abs() <= rel_tol * mean.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::meshing::{HyperbolicMeshing, UniformMeshing};
    use approx::assert_relative_eq;

    fn non_uniform_grid() -> PdeGrid1D {
        PdeGrid1D::new(vec![0.0, 0.5, 1.0], vec![0.0, 0.1, 0.3, 0.6, 1.0]).unwrap()
    }

    #[test]
    fn uniform_grid_hits_bounds_exactly() {
        let grid = PdeGrid1D::uniform(10, 20, 2.0, -1.0, 3.0).unwrap();
        assert_eq!(grid.num_time_nodes(), 11);
        assert_eq!(grid.num_space_nodes(), 21);
        assert_eq!(grid.t_max(), 2.0);
        assert_eq!(grid.lower_level(), -1.0);
        assert_eq!(grid.upper_level(), 3.0);
        assert_relative_eq!(grid.space_step(7), 0.2, epsilon = 1e-12);
        assert!(grid.is_uniform_in_space(1e-9));
        assert!(grid.is_uniform_in_time(1e-9));
    }

    #[test]
    fn non_monotone_or_short_grids_are_rejected() {
        assert!(matches!(
            PdeGrid1D::new(vec![0.0, 1.0], vec![0.0, 0.5, 0.5, 1.0]),
            Err(PdeError::InvalidGrid(_))
        ));
        assert!(PdeGrid1D::new(vec![0.0, 1.0, 0.5], vec![0.0, 0.5, 1.0]).is_err());
        assert!(PdeGrid1D::new(vec![0.0], vec![0.0, 0.5, 1.0]).is_err());
        assert!(PdeGrid1D::new(vec![0.0, 1.0], vec![0.0, 1.0]).is_err());
        assert!(PdeGrid1D::new(vec![0.0, 1.0], vec![0.0, f64::NAN, 1.0]).is_err());
        assert!(PdeGrid1D::uniform(0, 10, 1.0, 0.0, 1.0).is_err());
        assert!(PdeGrid1D::uniform(10, 10, 1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn stencils_are_exact_for_quadratics() {
        // f = 3x^2 - 2x + 1: f' = 6x - 2, f'' = 6.
        let grid = non_uniform_grid();
        let f: Vec<f64> = grid
            .space_nodes()
            .iter()
            .map(|x| 3.0 * x * x - 2.0 * x + 1.0)
            .collect();
        let df = |x: f64| 6.0 * x - 2.0;

        for i in 1..4 {
            let x = grid.space_node(i);
            assert_relative_eq!(
                grid.first_derivative_coefficients(i).apply(&f),
                df(x),
                epsilon = 1e-10
            );
            assert_relative_eq!(
                grid.second_derivative_coefficients(i).apply(&f),
                6.0,
                epsilon = 1e-10
            );
        }
        assert_relative_eq!(
            grid.first_derivative_forward_coefficients(0).apply(&f),
            df(0.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(
            grid.first_derivative_backward_coefficients(4).apply(&f),
            df(1.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(
            grid.second_derivative_coefficients(0).apply(&f),
            6.0,
            epsilon = 1e-10
        );
        assert_eq!(grid.second_derivative_coefficients(4).start, 2);
    }

    #[test]
    fn uniform_stencils_reduce_to_textbook_weights() {
        let grid = PdeGrid1D::uniform(1, 4, 1.0, 0.0, 2.0).unwrap();
        let h = 0.5;
        let d1 = grid.first_derivative_coefficients(2).weights;
        let d2 = grid.second_derivative_coefficients(2).weights;
        assert_relative_eq!(d1[0], -1.0 / (2.0 * h), epsilon = 1e-12);
        assert_relative_eq!(d1[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(d1[2], 1.0 / (2.0 * h), epsilon = 1e-12);
        assert_relative_eq!(d2[0], 1.0 / (h * h), epsilon = 1e-12);
        assert_relative_eq!(d2[1], -2.0 / (h * h), epsilon = 1e-12);
        assert_relative_eq!(d2[2], 1.0 / (h * h), epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "central stencil needs an interior node")]
    fn central_stencil_at_an_edge_panics() {
        non_uniform_grid().first_derivative_coefficients(0);
    }

    #[test]
    #[should_panic(expected = "forward stencil needs two nodes above")]
    fn forward_stencil_past_the_upper_edge_panics() {
        non_uniform_grid().first_derivative_forward_coefficients(3);
    }

    #[test]
    #[should_panic(expected = "outside grid of 5 nodes")]
    fn second_derivative_outside_the_grid_panics() {
        non_uniform_grid().second_derivative_coefficients(5);
    }

    #[test]
    fn doubling_time_steps_keeps_space_and_inserts_midpoints() {
        let grid = PdeGrid1D::new(vec![0.0, 0.2, 1.0], vec![0.0, 0.5, 1.0]).unwrap();
        let fine = grid.with_double_time_steps();
        let expected = [0.0, 0.1, 0.2, 0.6, 1.0];
        assert_eq!(fine.num_time_nodes(), expected.len());
        for (t, e) in fine.time_nodes().iter().zip(expected) {
            assert_relative_eq!(*t, e, epsilon = 1e-15);
        }
        assert_eq!(fine.space_nodes(), grid.space_nodes());
        assert_relative_eq!(fine.time_step(3), 0.4, epsilon = 1e-15);
        assert_eq!(grid.num_time_nodes(), 3);
    }

    #[test]
    fn grid_from_meshes_is_strictly_increasing() {
        let time = UniformMeshing::new(0.0, 1.0, 11).unwrap();
        let space = HyperbolicMeshing::new(0.0, 4.0, 1.0, 41, 0.05).unwrap();
        let grid = PdeGrid1D::from_meshes(&time, &space).unwrap();
        assert!(grid.space_nodes().windows(2).all(|w| w[1] > w[0]));
        assert!(grid.time_nodes().windows(2).all(|w| w[1] > w[0]));
        assert!(!grid.is_uniform_in_space(1e-6));
    }

    #[test]
    fn serde_round_trip_revalidates_nodes() {
        let grid = non_uniform_grid();
        let json = serde_json::to_string(&grid).unwrap();
        assert!(!json.contains("dx"));
        let back: PdeGrid1D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let bad = r#"{"time_nodes":[0.0,1.0],"space_nodes":[0.0,2.0,1.0]}"#;
        assert!(serde_json::from_str::<PdeGrid1D>(bad).is_err());
    }
}
