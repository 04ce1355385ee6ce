//! Krylov solver interfaces.

use crate::utils::convergence::SolveStats;

/// Common interface for iterative linear solvers.
pub trait LinearSolver<A, V> {
    type Error;
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Solve A·x = b, writing result into `x` (which also holds the initial guess).
    /// Returns iteration stats (including convergence info).
    fn solve(
        &mut self,
        a: &mut A,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<Self::Scalar>, Self::Error>;
}

pub mod gmres;
pub use gmres::GmresSolver;
