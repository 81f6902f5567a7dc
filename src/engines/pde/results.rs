//! Solver output: terminal slice only, or the whole time x space surface.

use serde::Serialize;

use super::grid::PdeGrid1D;
use crate::core::PdeError;

/// Values at the final time node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdeTerminalResults {
    grid: PdeGrid1D,
    values: Vec<f64>,
}

impl PdeTerminalResults {
    pub fn new(grid: PdeGrid1D, values: Vec<f64>) -> Result<Self, PdeError> {
        if values.len() != grid.num_space_nodes() {
            return Err(PdeError::InvalidInput(format!(
                "expected {} terminal values, got {}",
                grid.num_space_nodes(),
                values.len()
            )));
        }
        Ok(Self { grid, values })
    }

    pub fn grid(&self) -> &PdeGrid1D {
        &self.grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn num_space_nodes(&self) -> usize {
        self.values.len()
    }

    pub fn space_value(&self, i: usize) -> f64 {
        self.grid.space_node(i)
    }

    pub fn function_value(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// df/dx at node `i`; one-sided at the two edges.
    pub fn first_spatial_derivative(&self, i: usize) -> f64 {
        first_derivative(&self.grid, &self.values, i)
    }

    pub fn second_spatial_derivative(&self, i: usize) -> f64 {
        self.grid.second_derivative_coefficients(i).apply(&self.values)
    }
}

fn first_derivative(grid: &PdeGrid1D, values: &[f64], i: usize) -> f64 {
    let last = grid.num_space_nodes() - 1;
    let stencil = if i == 0 {
        grid.first_derivative_forward_coefficients(0)
    } else if i == last {
        grid.first_derivative_backward_coefficients(last)
    } else {
        grid.first_derivative_coefficients(i)
    };
    stencil.apply(values)
}

/// Values at every (time node, space node).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdeFullResults {
    grid: PdeGrid1D,
    values: Vec<Vec<f64>>,
}

impl PdeFullResults {
    /// `values[n]` is the slice at time node `n`.
    pub fn new(grid: PdeGrid1D, values: Vec<Vec<f64>>) -> Result<Self, PdeError> {
        if values.len() != grid.num_time_nodes() {
            return Err(PdeError::InvalidInput(format!(
                "expected {} time slices, got {}",
                grid.num_time_nodes(),
                values.len()
            )));
        }
        if values.iter().any(|row| row.len() != grid.num_space_nodes()) {
            return Err(PdeError::InvalidInput(format!(
                "every time slice must hold {} values",
                grid.num_space_nodes()
            )));
        }
        Ok(Self { grid, values })
    }

    pub fn grid(&self) -> &PdeGrid1D {
        &self.grid
    }

    pub fn num_time_nodes(&self) -> usize {
        self.values.len()
    }

    pub fn function_value(&self, space_index: usize, time_index: usize) -> f64 {
        self.values[time_index][space_index]
    }

    pub fn time_slice(&self, time_index: usize) -> &[f64] {
        &self.values[time_index]
    }

    pub fn slices(&self) -> impl Iterator<Item = &[f64]> {
        self.values.iter().map(Vec::as_slice)
    }

    pub fn terminal_values(&self) -> &[f64] {
        &self.values[self.values.len() - 1]
    }

    pub fn first_spatial_derivative(&self, space_index: usize, time_index: usize) -> f64 {
        first_derivative(&self.grid, &self.values[time_index], space_index)
    }

    pub fn second_spatial_derivative(&self, space_index: usize, time_index: usize) -> f64 {
        self.grid
            .second_derivative_coefficients(space_index)
            .apply(&self.values[time_index])
    }

    pub fn to_terminal(&self) -> PdeTerminalResults {
        PdeTerminalResults {
            grid: self.grid.clone(),
            values: self.terminal_values().to_vec(),
        }
    }
}

/// Output of a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PdeResults {
    Terminal(PdeTerminalResults),
    Full(PdeFullResults),
}

impl PdeResults {
    pub fn grid(&self) -> &PdeGrid1D {
        match self {
            Self::Terminal(r) => r.grid(),
            Self::Full(r) => r.grid(),
        }
    }

    pub fn terminal_values(&self) -> &[f64] {
        match self {
            Self::Terminal(r) => r.values(),
            Self::Full(r) => r.terminal_values(),
        }
    }

    /// Terminal value at space node `i`.
    pub fn function_value(&self, i: usize) -> f64 {
        self.terminal_values()[i]
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    pub fn as_full(&self) -> Option<&PdeFullResults> {
        match self {
            Self::Full(r) => Some(r),
            Self::Terminal(_) => None,
        }
    }

    pub fn into_terminal(self) -> PdeTerminalResults {
        match self {
            Self::Terminal(r) => r,
            Self::Full(r) => r.to_terminal(),
        }
    }
}
