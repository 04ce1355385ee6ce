//! Tests for core dense operations: matrix-vector multiplication, dot product, and norm.
//!
//! These tests verify the MatVec and InnerProduct implementations for dense matrices, plain
//! vectors and serial vectors, using random and fixed data.

use approx::assert_abs_diff_eq;
use faer::Mat;
use nksol::SerialVector;
use nksol::core::traits::{InnerProduct, LinearOperator, MatVec};
use rand::Rng;

/// Test matrix-vector multiplication for a small random dense matrix.
#[test]
fn matvec_random_small() {
    let n = 5;
    let mut rng = rand::thread_rng();
    let vals: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    // Use from_fn to build a column-major matrix
    let a = Mat::from_fn(n, n, |i, j| vals[j * n + i]);
    let x: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    let mut y = vec![0.0; n];
    a.matvec(&x, &mut y);

    // check y[i] == sum_j A[i,j]*x[j]
    for i in 0..n {
        let expected = (0..n).map(|j| vals[j * n + i] * x[j]).sum::<f64>();
        assert_abs_diff_eq!(y[i], expected, epsilon = 1e-12);
    }

    // Same product through a serial vector and the operator interface
    let xs = SerialVector::from_slice(&x).unwrap();
    let mut ys = xs.clone_empty().unwrap();
    let mut a = a;
    a.apply(&xs, &mut ys).unwrap();
    for i in 0..n {
        assert_abs_diff_eq!(ys[i], y[i], epsilon = 1e-12);
    }
}

/// Test dot product and Euclidean norm for small vectors.
#[test]
fn dot_and_norm() {
    let x = vec![1.0, 2.0, 3.0];
    let y = vec![4.0, -5.0, 6.0];
    let ip = ();
    let dot = ip.dot(&x, &y);
    assert_abs_diff_eq!(dot, 1.0 * 4.0 + 2.0 * (-5.0) + 3.0 * 6.0, epsilon = 1e-12);
    let norm_x = ip.norm(&x);
    let expected_norm = ((1.0f64).powi(2) + 2.0f64.powi(2) + 3.0f64.powi(2)).sqrt();
    assert_abs_diff_eq!(norm_x, expected_norm, epsilon = 1e-12);

    let xs = SerialVector::try_from(x).unwrap();
    let ys = SerialVector::try_from(y).unwrap();
    assert_abs_diff_eq!(ip.dot(&xs, &ys), dot, epsilon = 1e-12);
    assert_abs_diff_eq!(ip.norm(&xs), expected_norm, epsilon = 1e-12);
}

/// Weighted norms used by the nonlinear stopping tests.
#[test]
fn weighted_norms() {
    let x = SerialVector::from_slice(&[3.0, -4.0]).unwrap();
    let mut w = x.clone_empty().unwrap();
    w.fill(1.0);
    assert_abs_diff_eq!(x.wl2_norm(&w), 5.0, epsilon = 1e-14);
    w.fill(0.5);
    assert_abs_diff_eq!(x.wl2_norm(&w), 2.5, epsilon = 1e-14);
    assert_eq!(x.max_norm(), 4.0);
    assert_eq!(x.l1_norm(), 7.0);
}
