//! nksol: inexact Newton–Krylov solver for small nonlinear systems
//!
//! This crate provides a serial vector type, a restarted GMRES linear solver and a nonlinear
//! solver context that drives them, plus the example system solved by the `simple_kinsol`
//! binary.

pub mod config;
pub mod context;
pub mod core;
pub mod driver;
pub mod error;
pub mod nonlinear;
pub mod nvector;
pub mod problem;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use error::*;
pub use nonlinear::{GlobalStrategy, SolveStatus};
pub use nvector::SerialVector;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
