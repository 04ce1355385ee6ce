//! Generalized Minimal Residual (GMRES) solver with fixed restart (Saad §6.4)
//!
//! This module implements the restarted GMRES algorithm for the Newton systems `J p = -F`.
//! The operator is only ever touched through [`LinearOperator::apply`], so matrix-free
//! Jacobians work the same as explicit matrices. No preconditioning is applied; scaling
//! is folded into the operator by the caller.
//!
//! # Features
//! - Double (iterative) modified Gram-Schmidt orthogonalization for numerical stability
//! - Happy breakdown detection for early termination
//! - Givens rotations for least-squares update
//! - Robust back-substitution with zero-pivot protection
//! - Hessenberg and rotation workspace reserved once and reused across solves
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §6.4
//! - https://en.wikipedia.org/wiki/Generalized_minimal_residual_method

use crate::core::traits::{InnerProduct, LinearOperator};
use crate::error::KinError;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats};
use num_traits::Float;

/// GMRES solver struct with restart and its reusable workspace.
///
/// # Type Parameters
/// * `T` - Scalar type (e.g., f32, f64)
pub struct GmresSolver<T> {
    /// Number of Arnoldi vectors before restart
    pub restart: usize,
    /// Convergence criteria (relative tolerance and max iterations)
    pub conv: Convergence<T>,
    h: Vec<Vec<T>>,
    g: Vec<T>,
    cs: Vec<T>,
    sn: Vec<T>,
}

fn reserve_zeroed<T: Float>(len: usize) -> Option<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).ok()?;
    v.resize(len, T::zero());
    Some(v)
}

impl<T: Copy + Float> GmresSolver<T> {
    /// Create a new GMRES solver with restart, tolerance, and max iterations.
    ///
    /// Returns `None` when the Hessenberg and rotation workspace cannot be reserved.
    pub fn new(restart: usize, tol: T, max_iters: usize) -> Option<Self> {
        let restart = restart.max(1);
        let mut h = Vec::new();
        h.try_reserve_exact(restart + 1).ok()?;
        for _ in 0..=restart {
            h.push(reserve_zeroed(restart)?);
        }
        Some(Self {
            restart,
            conv: Convergence { tol, max_iters },
            h,
            g: reserve_zeroed(restart + 1)?,
            cs: reserve_zeroed(restart)?,
            sn: reserve_zeroed(restart)?,
        })
    }

    fn reset_workspace(&mut self) {
        for row in self.h.iter_mut() {
            row.iter_mut().for_each(|x| *x = T::zero());
        }
        self.g.iter_mut().for_each(|x| *x = T::zero());
        self.cs.iter_mut().for_each(|x| *x = T::zero());
        self.sn.iter_mut().for_each(|x| *x = T::zero());
    }

    // --- Arnoldi process with double orthogonalization and happy breakdown ---
    /// Perform one step of the Arnoldi process.
    /// Returns true if happy breakdown is detected.
    fn arnoldi<A, V>(
        a: &mut A,
        ip: &(),
        v_basis: &mut Vec<V>,
        h: &mut [Vec<T>],
        j: usize,
        epsilon: T,
    ) -> Result<bool, KinError>
    where
        A: LinearOperator<V>,
        (): InnerProduct<V, Scalar = T>,
        V: AsMut<[T]> + AsRef<[T]> + Clone,
    {
        let mut w = v_basis[j].clone();
        a.apply(&v_basis[j], &mut w)?;
        let w_norm0 = ip.norm(&w);
        // Modified Gram-Schmidt orthogonalization
        for i in 0..=j {
            h[i][j] = ip.dot(&w, &v_basis[i]);
            for (wk, vik) in w.as_mut().iter_mut().zip(v_basis[i].as_ref()) {
                *wk = *wk - h[i][j] * *vik;
            }
        }
        // Iterative refinement (second orthogonalization)
        for i in 0..=j {
            let tmp = ip.dot(&w, &v_basis[i]);
            h[i][j] = h[i][j] + tmp;
            for (wk, vik) in w.as_mut().iter_mut().zip(v_basis[i].as_ref()) {
                *wk = *wk - tmp * *vik;
            }
        }
        h[j + 1][j] = ip.norm(&w);
        // Happy breakdown: the new direction vanished relative to A v_j
        if h[j + 1][j].abs() <= epsilon * w_norm0 {
            return Ok(true);
        }
        let inv = T::one() / h[j + 1][j];
        w.as_mut().iter_mut().for_each(|wk| *wk = *wk * inv);
        v_basis.push(w);
        Ok(false)
    }

    // --- Apply Givens rotation and update g together ---
    /// Apply Givens rotations to Hessenberg matrix and update g vector.
    fn apply_givens_and_update_g(h: &mut [Vec<T>], g: &mut [T], cs: &mut [T], sn: &mut [T], j: usize, epsilon: T) {
        for i in 0..j {
            let temp = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
            h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
            h[i][j] = temp;
        }
        let h_kk = h[j][j];
        let h_k1k = h[j + 1][j];
        let r = (h_kk * h_kk + h_k1k * h_k1k).sqrt();
        if r.abs() < epsilon {
            cs[j] = T::one();
            sn[j] = T::zero();
        } else {
            cs[j] = h_kk / r;
            sn[j] = h_k1k / r;
        }
        h[j][j] = cs[j] * h_kk + sn[j] * h_k1k;
        h[j + 1][j] = T::zero();
        let temp = cs[j] * g[j] + sn[j] * g[j + 1];
        g[j + 1] = -sn[j] * g[j] + cs[j] * g[j + 1];
        g[j] = temp;
    }

    // --- Back-substitution for least squares with zero-pivot protection ---
    /// Solve upper-triangular system Hy = g for y, with zero-pivot protection.
    fn back_substitution(h: &[Vec<T>], g: &[T], y: &mut [T], m: usize, epsilon: T) {
        for i in (0..m).rev() {
            y[i] = g[i];
            for j in (i + 1)..m {
                y[i] = y[i] - h[i][j] * y[j];
            }
            if h[i][i].abs() > epsilon {
                y[i] = y[i] / h[i][i];
            } else {
                y[i] = T::zero();
            }
        }
    }

    /// r = b - A x, written into `r`
    fn residual<A, V>(a: &mut A, b: &V, x: &V, r: &mut V) -> Result<(), KinError>
    where
        A: LinearOperator<V>,
        V: AsMut<[T]> + AsRef<[T]>,
    {
        a.apply(x, r)?;
        for (ri, &bi) in r.as_mut().iter_mut().zip(b.as_ref()) {
            *ri = bi - *ri;
        }
        Ok(())
    }
}

impl<A, V, T> LinearSolver<A, V> for GmresSolver<T>
where
    A: LinearOperator<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + Clone,
    T: Float + From<f64>,
{
    type Error = KinError;
    type Scalar = T;

    /// Solve the linear system Ax = b using restarted GMRES.
    ///
    /// Krylov vectors are cloned from `b`, so any vector type with slice access works.
    ///
    /// # Arguments
    /// * `a` - Operator implementing `LinearOperator`
    /// * `b` - Right-hand side vector
    /// * `x` - On input: initial guess; on output: solution vector
    ///
    /// # Returns
    /// * `Ok(SolveStats)` if converged or max iterations reached
    /// * `Err(KinError)` if the operator fails
    fn solve(&mut self, a: &mut A, b: &V, x: &mut V) -> Result<SolveStats<T>, KinError> {
        let ip = ();
        if x.as_ref().len() != b.as_ref().len() {
            return Err(KinError::IllInput("GMRES vectors have different lengths"));
        }
        let mut r0 = b.clone();
        Self::residual(a, b, x, &mut r0)?;
        let mut beta = ip.norm(&r0);
        let res0 = beta;
        let mut stats = SolveStats { iterations: 0, final_residual: beta, converged: false };
        if beta == T::zero() {
            stats.converged = true;
            return Ok(stats);
        }

        let n_outer = self.conv.max_iters.div_ceil(self.restart);
        let mut iteration = 0;
        let epsilon: T = From::from(1e-12);
        let tiny: T = From::from(1e-300);
        let mut v_basis: Vec<V> = Vec::with_capacity(self.restart + 1);
        let mut y = vec![T::zero(); self.restart];
        for _ in 0..n_outer {
            self.reset_workspace();
            v_basis.clear();
            let inv_beta = T::one() / beta;
            r0.as_mut().iter_mut().for_each(|ri| *ri = *ri * inv_beta);
            v_basis.push(r0.clone());
            self.g[0] = beta;
            let mut m = 0;
            for j in 0..self.restart {
                iteration += 1;
                let happy_breakdown = Self::arnoldi(a, &ip, &mut v_basis, &mut self.h, j, epsilon)?;
                Self::apply_givens_and_update_g(&mut self.h, &mut self.g, &mut self.cs, &mut self.sn, j, tiny);
                let res_norm = self.g[j + 1].abs();
                let (stop, s) = self.conv.check(res_norm, res0, iteration);
                stats = s;
                m = j + 1;
                if stop || happy_breakdown {
                    break;
                }
            }
            // Solve least-squares problem for y
            Self::back_substitution(&self.h, &self.g, &mut y, m, tiny);
            // x = x + sum y[j] * v_basis[j]
            for (yj, vj) in y[..m].iter().zip(&v_basis) {
                for (xi, vji) in x.as_mut().iter_mut().zip(vj.as_ref()) {
                    *xi = *xi + *yj * *vji;
                }
            }
            // Update stats with true residual
            Self::residual(a, b, x, &mut r0)?;
            beta = ip.norm(&r0);
            stats.final_residual = beta;
            stats.converged = beta <= self.conv.tol * res0;
            if stats.converged || iteration >= self.conv.max_iters || beta == T::zero() {
                break;
            }
        }
        Ok(stats)
    }
}
