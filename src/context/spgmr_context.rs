//! Linear-solver handle for the Newton systems.
//!
//! `SpgmrContext` owns a restarted [`GmresSolver`] sized for a template vector. It is created
//! by the caller, attached to a [`KinContext`](crate::context::KinContext) with
//! `set_linear_solver`, and from then on owned (and dropped) by the solver context.

use crate::core::traits::LinearOperator;
use crate::error::KinError;
use crate::nvector::SerialVector;
use crate::solver::{GmresSolver, LinearSolver};
use crate::utils::convergence::SolveStats;

/// Krylov dimension used when 0 is requested.
pub const DEFAULT_MAXL: usize = 5;

/// Scaled, preconditioner-free GMRES handle.
pub struct SpgmrContext {
    gmres: GmresSolver<f64>,
    len: usize,
    max_restarts: usize,
    last: Option<SolveStats<f64>>,
}

impl SpgmrContext {
    /// Create a handle for vectors shaped like `template` with Krylov dimension `maxl`
    /// (0 selects [`DEFAULT_MAXL`]).
    ///
    /// Returns `None` when the workspace cannot be reserved.
    pub fn new(template: &SerialVector, maxl: usize) -> Option<Self> {
        let maxl = if maxl == 0 { DEFAULT_MAXL } else { maxl };
        Some(Self {
            gmres: GmresSolver::new(maxl, 0.0, maxl)?,
            len: template.len(),
            max_restarts: 0,
            last: None,
        })
    }

    /// Number of restarts allowed in one linear solve.
    pub fn set_max_restarts(&mut self, max_restarts: usize) {
        self.max_restarts = max_restarts;
    }

    pub fn maxl(&self) -> usize {
        self.gmres.restart
    }

    pub fn max_restarts(&self) -> usize {
        self.max_restarts
    }

    /// Vector length this handle was created for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Statistics of the most recent solve.
    pub fn last_stats(&self) -> Option<&SolveStats<f64>> {
        self.last.as_ref()
    }

    /// Solve `A x = b` from `x = 0` until `‖b - A x‖₂ <= tol ‖b‖₂`.
    pub fn solve<A>(&mut self, a: &mut A, b: &SerialVector, x: &mut SerialVector, tol: f64) -> Result<SolveStats<f64>, KinError>
    where
        A: LinearOperator<SerialVector>,
    {
        if b.len() != self.len || x.len() != self.len {
            return Err(KinError::IllInput("vector length differs from the linear solver template"));
        }
        self.gmres.conv.tol = tol;
        self.gmres.conv.max_iters = self.gmres.restart * (self.max_restarts + 1);
        x.fill(0.0);
        let stats = self.gmres.solve(a, b, x)?;
        self.last = Some(stats.clone());
        Ok(stats)
    }
}
