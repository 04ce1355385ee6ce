//! Solver contexts.
//!
//! Contexts hold configuration and workspace across calls and own whatever is attached to them.
//!
//! Modules:
//! - [`kin_context`]: the `KinContext` nonlinear solver (inexact Newton with GMRES).
//! - [`spgmr_context`]: the `SpgmrContext` linear-solver handle attached to it.
//!
//! # Example
//! ```rust,ignore
//! use nksol::context::{KinContext, SpgmrContext};
//! let mut kin = KinContext::create();
//! kin.init(system, &template)?;
//! kin.set_linear_solver(SpgmrContext::new(&template, 0).unwrap())?;
//! let status = kin.solve(&mut u, GlobalStrategy::LineSearch, &scale, &scale)?;
//! ```

pub mod kin_context;
pub use kin_context::KinContext;
pub mod spgmr_context;
pub use spgmr_context::SpgmrContext;
