//! The example system: the right-hand side of the stiff linear ODE
//! `y0' = -101 y0 - 100 y1`, `y1' = y0`, whose root is the origin.

use crate::error::SysFnError;
use crate::nvector::SerialVector;

/// Problem dimension.
pub const N: usize = 2;

/// Starting point of the solve.
pub const INITIAL_GUESS: [f64; N] = [2.0, 1.0];

/// `F(u) = (-101 u0 - 100 u1, u0)`
pub fn residual(u: [f64; N]) -> [f64; N] {
    [-101.0 * u[0] - 100.0 * u[1], u[0]]
}

/// `J v` for the constant Jacobian `[[-101, -100], [1, 0]]`.
pub fn jtv(v: [f64; N]) -> [f64; N] {
    [-101.0 * v[0] - 100.0 * v[1], v[0]]
}

/// System function callback.
pub fn system(u: &SerialVector, f: &mut SerialVector) -> Result<(), SysFnError> {
    let fu = residual([u[0], u[1]]);
    f.data_mut().copy_from_slice(&fu);
    Ok(())
}

/// Jacobian-vector product callback. The Jacobian does not depend on `u`.
pub fn jac_times(v: &SerialVector, jv: &mut SerialVector, _u: &SerialVector) -> Result<(), SysFnError> {
    let p = jtv([v[0], v[1]]);
    jv.data_mut().copy_from_slice(&p);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn residual_at_initial_guess() {
        assert_eq!(residual(INITIAL_GUESS), [-302.0, 2.0]);
        assert_eq!(residual([0.0, 0.0]), [0.0, 0.0]);
    }

    #[test]
    fn residual_is_linear() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let a: [f64; N] = [rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)];
            let b: [f64; N] = [rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)];
            let s: f64 = rng.gen_range(-3.0..3.0);
            let lhs = residual([a[0] + s * b[0], a[1] + s * b[1]]);
            let (fa, fb) = (residual(a), residual(b));
            for i in 0..N {
                approx::assert_abs_diff_eq!(lhs[i], fa[i] + s * fb[i], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn jacobian_columns() {
        assert_eq!(jtv([1.0, 0.0]), [-101.0, 1.0]);
        assert_eq!(jtv([0.0, 1.0]), [-100.0, 0.0]);
    }

    #[test]
    fn callbacks_match_pure_functions() {
        let u = SerialVector::from_slice(&INITIAL_GUESS).unwrap();
        let mut f = u.clone_empty().unwrap();
        system(&u, &mut f).unwrap();
        assert_eq!(f.data(), &[-302.0, 2.0]);
        let v = SerialVector::from_slice(&[1.0, 0.0]).unwrap();
        jac_times(&v, &mut f, &u).unwrap();
        assert_eq!(f.data(), &[-101.0, 1.0]);
    }
}
