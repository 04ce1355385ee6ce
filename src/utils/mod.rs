//! Utilities shared by the solvers and the example program.
//!
//! - [`convergence`]: stopping criteria and statistics of the linear solves.
//! - [`check`]: status checks for library calls, reported on standard error.

pub mod check;
pub mod convergence;

pub use check::{CheckMode, Returned, check_flag};
