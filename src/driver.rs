//! The call sequence of the `simple_kinsol` program.
//!
//! Allocate the initial guess and scaling vectors, create and initialize the solver context,
//! attach the linear solver (and optionally the Jacobian-vector product), set the tolerances
//! and solve. Every call is checked; the first failure is returned as a [`CheckError`] and the
//! handles created so far are dropped.

use crate::config::PrintFlags;
use crate::context::{KinContext, SpgmrContext};
use crate::error::CheckError;
use crate::nonlinear::{GlobalStrategy, SolveStatus};
use crate::nvector::SerialVector;
use crate::problem::{self, INITIAL_GUESS, N};
use crate::utils::check;

/// Function-norm and scaled-step stopping tolerance.
pub const TOL: f64 = 1.0e-5;

/// Program switches.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Attach the analytic Jacobian-vector product.
    pub jtv: bool,
    /// Per-iteration diagnostics on standard error.
    pub verbose: bool,
    /// Nonlinear iteration limit (0 keeps the solver default).
    pub max_iters: usize,
}

/// State after a successful solve.
pub struct Outcome {
    pub kin: KinContext,
    pub y0: SerialVector,
    pub status: SolveStatus,
}

/// Allocate a solver vector, checked as a constructor handle.
pub fn new_vector(len: usize) -> Result<SerialVector, CheckError> {
    check::handle(SerialVector::new(len), "SerialVector::new")
}

pub fn run(opts: &RunOptions) -> Result<Outcome, CheckError> {
    let mut y0 = new_vector(N)?;
    y0.data_mut().copy_from_slice(&INITIAL_GUESS);
    let mut scale = new_vector(N)?;
    scale.fill(1.0);

    let mut kin = KinContext::create();
    check::flag(kin.init(problem::system, &y0), "KinContext::init")?;
    let ls = check::handle(SpgmrContext::new(&y0, 0), "SpgmrContext::new")?;
    check::flag(kin.set_linear_solver(ls), "KinContext::set_linear_solver")?;
    if opts.jtv {
        check::flag(kin.set_jac_times(problem::jac_times), "KinContext::set_jac_times")?;
    }
    check::flag(kin.set_func_norm_tol(TOL), "KinContext::set_func_norm_tol")?;
    check::flag(kin.set_scaled_step_tol(TOL), "KinContext::set_scaled_step_tol")?;
    check::flag(kin.set_num_max_iters(opts.max_iters), "KinContext::set_num_max_iters")?;
    if opts.verbose {
        kin.set_print_flags(PrintFlags::ALL);
    }

    let status = check::flag(kin.solve(&mut y0, GlobalStrategy::LineSearch, &scale, &scale), "KinContext::solve")?;
    Ok(Outcome { kin, y0, status })
}

/// Process exit status for a run: 0 on success, 1 on any checked failure.
pub fn exit_code<T>(result: &Result<T, CheckError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
