//! Solver engine implementations.

pub mod pde;
