//! Scaled Jacobian operator for the Newton systems.
//!
//! GMRES works on `(D_F J D_u⁻¹) (D_u p) = -D_F F`, so the operator applied to a Krylov
//! vector `x` is `D_F J (x ./ d_u)`. `J v` comes from the attached callback or, without one,
//! from a forward difference of the system function.

use crate::core::traits::LinearOperator;
use crate::error::{KinError, SysFnError};
use crate::nonlinear::{Counters, JacTimesFn, SysFn, work_vector};
use crate::nvector::SerialVector;

pub(crate) struct JacobianOperator<'a> {
    func: &'a mut SysFn,
    jtimes: Option<&'a mut JacTimesFn>,
    u: &'a SerialVector,
    fval: &'a SerialVector,
    u_scale: &'a SerialVector,
    f_scale: &'a SerialVector,
    counters: &'a mut Counters,
    v: SerialVector,
    utmp: SerialVector,
}

impl<'a> JacobianOperator<'a> {
    pub fn new(
        func: &'a mut SysFn,
        jtimes: Option<&'a mut JacTimesFn>,
        u: &'a SerialVector,
        fval: &'a SerialVector,
        u_scale: &'a SerialVector,
        f_scale: &'a SerialVector,
        counters: &'a mut Counters,
    ) -> Result<Self, KinError> {
        Ok(Self {
            func,
            jtimes,
            u,
            fval,
            u_scale,
            f_scale,
            counters,
            v: work_vector(u.len())?,
            utmp: work_vector(u.len())?,
        })
    }

    /// jv = J(u) v
    fn jac_times(&mut self, jv: &mut SerialVector) -> Result<(), KinError> {
        self.counters.njtimes += 1;
        match self.jtimes.as_mut() {
            Some(jtimes) => (**jtimes)(&self.v, jv, self.u).map_err(|e| match e {
                SysFnError::Recoverable => KinError::LsolveFail("Jacobian-vector product failed".into()),
                SysFnError::Unrecoverable => KinError::SysFuncFail,
            }),
            None => self.dq_jac_times(jv),
        }
    }

    /// Forward-difference J v with the increment
    /// `sigma = sign(su·sv) sqrt(eps) max(|su·sv|, ‖sv‖₁) / ‖sv‖₂²`, `su = d_u u`, `sv = d_u v`.
    fn dq_jac_times(&mut self, jv: &mut SerialVector) -> Result<(), KinError> {
        let (mut sutsv, mut vtv, mut sq1norm) = (0.0, 0.0, 0.0);
        for ((ui, vi), wi) in self.u.data().iter().zip(self.v.data()).zip(self.u_scale.data()) {
            let sv = vi * wi;
            sutsv += ui * wi * sv;
            vtv += sv * sv;
            sq1norm += sv.abs();
        }
        if vtv == 0.0 {
            jv.fill(0.0);
            return Ok(());
        }
        let sign = if sutsv >= 0.0 { 1.0 } else { -1.0 };
        let sigma = sign * f64::EPSILON.sqrt() * sutsv.abs().max(sq1norm) / vtv;
        self.utmp.linear_sum(1.0, self.u, sigma, &self.v);
        self.counters.nfe_dq += 1;
        (self.func)(&self.utmp, jv).map_err(|e| match e {
            SysFnError::Recoverable => {
                KinError::LsolveFail("system function failed in difference-quotient J*v".into())
            }
            SysFnError::Unrecoverable => KinError::SysFuncFail,
        })?;
        for (jvi, fi) in jv.data_mut().iter_mut().zip(self.fval.data()) {
            *jvi = (*jvi - fi) / sigma;
        }
        Ok(())
    }
}

impl LinearOperator<SerialVector> for JacobianOperator<'_> {
    fn apply(&mut self, x: &SerialVector, y: &mut SerialVector) -> Result<(), KinError> {
        self.v.div(x, self.u_scale);
        self.jac_times(y)?;
        for (yi, wi) in y.data_mut().iter_mut().zip(self.f_scale.data()) {
            *yi *= wi;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quadratic() -> SysFn {
        // F(u) = (u0^2 - 4, u0 u1)
        Box::new(|u: &SerialVector, f: &mut SerialVector| -> Result<(), SysFnError> {
            f[0] = u[0] * u[0] - 4.0;
            f[1] = u[0] * u[1];
            Ok(())
        })
    }

    #[test]
    fn difference_quotient_matches_analytic_jacobian() {
        let mut func = quadratic();
        let u = SerialVector::from_slice(&[3.0, -2.0]).unwrap();
        let mut fval = u.clone_empty().unwrap();
        func(&u, &mut fval).unwrap();
        let ones = SerialVector::from_slice(&[1.0, 1.0]).unwrap();
        let mut counters = Counters::default();
        let x = SerialVector::from_slice(&[1.0, 2.0]).unwrap();
        let mut y = x.clone_empty().unwrap();
        {
            let mut op = JacobianOperator::new(&mut func, None, &u, &fval, &ones, &ones, &mut counters).unwrap();
            op.apply(&x, &mut y).unwrap();
        }
        // J = [[2 u0, 0], [u1, u0]] = [[6, 0], [-2, 3]]
        assert_abs_diff_eq!(y[0], 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y[1], 4.0, epsilon = 1e-6);
        assert_eq!(counters.njtimes, 1);
        assert_eq!(counters.nfe_dq, 1);
    }

    #[test]
    fn scaling_is_applied_on_both_sides() {
        let mut func = quadratic();
        let u = SerialVector::from_slice(&[3.0, -2.0]).unwrap();
        let mut fval = u.clone_empty().unwrap();
        func(&u, &mut fval).unwrap();
        let u_scale = SerialVector::from_slice(&[2.0, 4.0]).unwrap();
        let f_scale = SerialVector::from_slice(&[0.5, 10.0]).unwrap();
        let mut jtv: JacTimesFn = Box::new(|v: &SerialVector, jv: &mut SerialVector, u: &SerialVector| -> Result<(), SysFnError> {
            jv[0] = 2.0 * u[0] * v[0];
            jv[1] = u[1] * v[0] + u[0] * v[1];
            Ok(())
        });
        let mut counters = Counters::default();
        let x = SerialVector::from_slice(&[2.0, 4.0]).unwrap();
        let mut y = x.clone_empty().unwrap();
        {
            let mut op = JacobianOperator::new(&mut func, Some(&mut jtv), &u, &fval, &u_scale, &f_scale, &mut counters).unwrap();
            op.apply(&x, &mut y).unwrap();
        }
        // v = (1, 1); J v = (6, 1); D_F J v = (3, 10)
        assert_eq!(y.data(), &[3.0, 10.0]);
        assert_eq!(counters.nfe_dq, 0);
    }

    #[test]
    fn zero_direction_gives_zero_product() {
        let mut func = quadratic();
        let u = SerialVector::from_slice(&[3.0, -2.0]).unwrap();
        let fval = u.clone_empty().unwrap();
        let ones = SerialVector::from_slice(&[1.0, 1.0]).unwrap();
        let mut counters = Counters::default();
        let mut op = JacobianOperator::new(&mut func, None, &u, &fval, &ones, &ones, &mut counters).unwrap();
        let x = u.clone_empty().unwrap();
        let mut y = SerialVector::from_slice(&[7.0, 7.0]).unwrap();
        op.apply(&x, &mut y).unwrap();
        assert_eq!(y.data(), &[0.0, 0.0]);
    }
}
