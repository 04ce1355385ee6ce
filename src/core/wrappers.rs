//! Wrappers for faer dense matrix types and vector operations.
//!
//! This module provides implementations of the core linear algebra traits for `faer::Mat`,
//! `Vec<T>` and [`SerialVector`], enabling their use in the GMRES solver. Dense matrices are
//! mostly used to check matrix-free operators against an explicit Jacobian.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{InnerProduct, LinearOperator, MatVec};
use crate::error::KinError;
use crate::nvector::SerialVector;
use faer::Mat;
use num_traits::Float;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for i in 0..self.nrows() {
            y[i] = T::zero();
            for j in 0..self.ncols() {
                y[i] = y[i] + self[(i, j)] * x[j];
            }
        }
    }
}

impl MatVec<SerialVector> for Mat<f64> {
    fn matvec(&self, x: &SerialVector, y: &mut SerialVector) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for i in 0..self.nrows() {
            y[i] = (0..self.ncols()).map(|j| self[(i, j)] * x[j]).sum();
        }
    }
}

impl<T: Float> LinearOperator<Vec<T>> for Mat<T> {
    fn apply(&mut self, x: &Vec<T>, y: &mut Vec<T>) -> Result<(), KinError> {
        self.matvec(x, y);
        Ok(())
    }
}

impl LinearOperator<SerialVector> for Mat<f64> {
    fn apply(&mut self, x: &SerialVector, y: &mut SerialVector) -> Result<(), KinError> {
        self.matvec(x, y);
        Ok(())
    }
}

/// Inner product and Euclidean norm for plain vectors.
impl<T: Float + From<f64>> InnerProduct<Vec<T>> for () {
    type Scalar = T;
    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| *xi * *yi)
            .fold(T::zero(), |acc, v| acc + v)
    }
    /// Computes the Euclidean norm of a vector: `||x||_2`.
    fn norm(&self, x: &Vec<T>) -> T {
        x.iter()
            .map(|xi| *xi * *xi)
            .fold(T::zero(), |acc, v| acc + v)
            .sqrt()
    }
}

impl InnerProduct<SerialVector> for () {
    type Scalar = f64;
    fn dot(&self, x: &SerialVector, y: &SerialVector) -> f64 {
        x.dot(y)
    }
    fn norm(&self, x: &SerialVector) -> f64 {
        x.dot(x).sqrt()
    }
}
