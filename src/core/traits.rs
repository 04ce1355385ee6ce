//! Core linear-algebra traits for nksol.

use crate::error::KinError;

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// A linear operator whose application may fail or keep state.
///
/// Matrix-free operators (such as a Jacobian applied through the system
/// function) implement this directly; explicit matrices go through [`MatVec`].
pub trait LinearOperator<V> {
    /// Compute y = A · x.
    fn apply(&mut self, x: &V, y: &mut V) -> Result<(), KinError>;
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}
