//! Building blocks of the inexact Newton iteration.
//!
//! - [`jtimes`]: the scaled Jacobian operator handed to GMRES, with a difference-quotient
//!   fallback when no Jacobian-vector callback is attached.
//! - [`forcing`]: forcing terms (relative tolerances of the inner linear solves).
//! - [`linesearch`]: backtracking line search along the Newton direction.
//!
//! The driver that ties them together is [`KinContext`](crate::context::KinContext).

use crate::error::{KinError, SysFnError};
use crate::nvector::SerialVector;

pub mod forcing;
pub mod jtimes;
pub mod linesearch;

/// System function `F(u)`: reads `u`, writes `F(u)` into the second argument.
pub type SysFnDyn = dyn FnMut(&SerialVector, &mut SerialVector) -> Result<(), SysFnError>;
pub type SysFn = Box<SysFnDyn>;

/// Jacobian-vector product `J(u) v`: arguments are `(v, jv, u)`.
pub type JacTimesDyn = dyn FnMut(&SerialVector, &mut SerialVector, &SerialVector) -> Result<(), SysFnError>;
pub type JacTimesFn = Box<JacTimesDyn>;

/// Globalization applied to each Newton direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlobalStrategy {
    /// Take the full Newton step (limited to the maximum step length).
    None,
    /// Backtrack along the Newton direction until the sufficient-decrease condition holds.
    LineSearch,
}

/// Successful outcomes of a nonlinear solve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// ‖D_F F(u)‖_∞ dropped below the function-norm tolerance.
    Success,
    /// The initial guess already satisfied the tolerance; no iteration was taken.
    InitialGuessOk,
    /// The last scaled step was below the step tolerance; `u` may be a root.
    StepLtStptol,
}

impl SolveStatus {
    /// Integer status flag (never negative).
    pub fn flag(&self) -> i32 {
        match self {
            SolveStatus::Success => 0,
            SolveStatus::InitialGuessOk => 1,
            SolveStatus::StepLtStptol => 2,
        }
    }
}

/// Work counters of one solve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Nonlinear iterations
    pub nni: usize,
    /// System function evaluations outside difference quotients
    pub nfe: usize,
    /// System function evaluations inside difference-quotient J·v
    pub nfe_dq: usize,
    /// Linear (GMRES) iterations
    pub nli: usize,
    /// Linear solves that stopped before reaching their tolerance
    pub nlcf: usize,
    /// Jacobian-vector products
    pub njtimes: usize,
    /// Line-search backtracks
    pub nbacktr: usize,
}

/// Evaluate `fval = F(u)`, counting the evaluation.
pub(crate) fn eval(
    func: &mut SysFn,
    counters: &mut Counters,
    u: &SerialVector,
    fval: &mut SerialVector,
) -> Result<(), SysFnError> {
    counters.nfe += 1;
    func(u, fval)
}

/// A zero-filled work vector of length `len`.
pub(crate) fn work_vector(len: usize) -> Result<SerialVector, KinError> {
    SerialVector::new(len).ok_or(KinError::MemFail)
}

/// max_i |v_i w_i|
pub(crate) fn scaled_max_norm(v: &SerialVector, w: &SerialVector) -> f64 {
    v.data()
        .iter()
        .zip(w.data())
        .fold(0.0_f64, |m, (vi, wi)| m.max((vi * wi).abs()))
}

/// Scaled step length: max_i |p_i| / max(|u_i|, 1 / w_i)
pub(crate) fn scaled_step_length(p: &SerialVector, u: &SerialVector, w: &SerialVector) -> f64 {
    p.data()
        .iter()
        .zip(u.data())
        .zip(w.data())
        .fold(0.0_f64, |m, ((pi, ui), wi)| m.max(pi.abs() / ui.abs().max(1.0 / wi)))
}
