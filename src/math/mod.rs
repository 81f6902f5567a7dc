//! Numerical kernels shared by the PDE engines.

pub mod meshing;
pub mod sor;
pub mod tridiagonal;

pub use meshing::{HyperbolicMeshing, MeshingFunction, UniformMeshing};
pub use sor::{DenseSystem, SorReport, SorSolver};
pub use tridiagonal::TridiagonalSystem;
