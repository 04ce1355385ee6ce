//! Step selection along the Newton direction (Dennis & Schnabel, Alg. A6.3.1).
//!
//! Both strategies first shorten `p` to the maximum scaled step length. The full step then
//! only halves on recoverable system-function failures; the line search backtracks until
//! `f(u + λp) <= f(u) + α λ ∇f·p` with `f = ½‖D_F F‖₂²`, reducing `λ` by a quadratic and then
//! cubic model, kept within `[0.1 λ, 0.5 λ]`.

use crate::error::{KinError, SysFnError};
use crate::nonlinear::{Counters, SysFn, eval, scaled_step_length};
use crate::nvector::SerialVector;

/// Sufficient-decrease constant.
const ALPHA: f64 = 1.0e-4;
/// Step halvings allowed after recoverable failures of a full step.
const MAX_RECOVERY: usize = 5;

/// Accepted step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    /// ½‖D_F F(u_new)‖₂²
    pub f1norm: f64,
    /// Fraction λ of the (possibly shortened) Newton step taken
    pub step_length: f64,
    /// Whether a full step of maximum length was taken
    pub max_step_taken: bool,
}

pub(crate) struct StepControl<'a> {
    pub u_scale: &'a SerialVector,
    pub f_scale: &'a SerialVector,
    pub mxnewtstep: f64,
    pub scsteptol: f64,
    pub print: bool,
}

impl StepControl<'_> {
    /// Shorten `p` to the maximum step length. Returns the reduction ratio.
    fn limit(&self, p: &mut SerialVector) -> f64 {
        let pnorm = p.wl2_norm(self.u_scale);
        if pnorm > self.mxnewtstep {
            let ratio = self.mxnewtstep / pnorm;
            p.scale_in_place(ratio);
            ratio
        } else {
            1.0
        }
    }

    fn f1norm(&self, fval: &SerialVector) -> f64 {
        let fnorm = fval.wl2_norm(self.f_scale);
        0.5 * fnorm * fnorm
    }

    /// Take `u_new = u + p`, halving on recoverable failures of the system function.
    pub fn full_step(
        &self,
        func: &mut SysFn,
        counters: &mut Counters,
        u: &SerialVector,
        p: &mut SerialVector,
        unew: &mut SerialVector,
        fnew: &mut SerialVector,
    ) -> Result<Step, KinError> {
        let ratio = self.limit(p);
        let mut rl = 1.0;
        for _ in 0..=MAX_RECOVERY {
            unew.linear_sum(1.0, u, rl, p);
            match eval(func, counters, unew, fnew) {
                Ok(()) => {
                    return Ok(Step {
                        f1norm: self.f1norm(fnew),
                        step_length: rl,
                        max_step_taken: ratio < 1.0 && rl == 1.0,
                    });
                }
                Err(SysFnError::Recoverable) => rl *= 0.5,
                Err(SysFnError::Unrecoverable) => return Err(KinError::SysFuncFail),
            }
        }
        Err(KinError::RepeatedSysFuncErr)
    }

    /// Backtracking line search from `u` along `p`.
    ///
    /// `f1norm` is ½‖D_F F(u)‖₂² and `slpi` the directional derivative `(D_F F)·(D_F J p)`.
    #[allow(clippy::too_many_arguments)]
    pub fn line_search(
        &self,
        func: &mut SysFn,
        counters: &mut Counters,
        u: &SerialVector,
        p: &mut SerialVector,
        f1norm: f64,
        slpi: f64,
        unew: &mut SerialVector,
        fnew: &mut SerialVector,
    ) -> Result<Step, KinError> {
        let ratio = self.limit(p);
        let slpi = slpi * ratio;
        let rlength = scaled_step_length(p, u, self.u_scale);
        let rlmin = self.scsteptol / rlength;
        let mut rl = 1.0;
        // (λ, f) of the previous trial, once there is one
        let mut prev: Option<(f64, f64)> = None;
        loop {
            unew.linear_sum(1.0, u, rl, p);
            match eval(func, counters, unew, fnew) {
                Ok(()) => {}
                Err(SysFnError::Unrecoverable) => return Err(KinError::SysFuncFail),
                Err(SysFnError::Recoverable) => {
                    rl *= 0.5;
                    prev = None;
                    counters.nbacktr += 1;
                    if rl < rlmin {
                        return Err(KinError::LineSearchNonConv);
                    }
                    continue;
                }
            }
            let f1normp = self.f1norm(fnew);
            if f1normp <= f1norm + ALPHA * slpi * rl {
                return Ok(Step {
                    f1norm: f1normp,
                    step_length: rl,
                    max_step_taken: ratio < 1.0 && rl == 1.0,
                });
            }
            let rltmp = match prev {
                None => -slpi / (2.0 * (f1normp - f1norm - slpi)),
                Some((rlprev, f1nprv)) => cubic_step(rl, f1normp, rlprev, f1nprv, f1norm, slpi),
            };
            prev = Some((rl, f1normp));
            let rltmp = if rltmp.is_finite() { rltmp.min(0.5 * rl) } else { 0.5 * rl };
            rl = rltmp.max(0.1 * rl);
            counters.nbacktr += 1;
            if self.print {
                eprintln!("nksol: backtrack rl = {:e}, f1norm = {:e}, f1normp = {:e}", rl, f1norm, f1normp);
            }
            if rl < rlmin {
                return Err(KinError::LineSearchNonConv);
            }
        }
    }
}

/// Minimizer of the cubic through f(0), f'(0) and the last two trials.
fn cubic_step(rl: f64, f1normp: f64, rlprev: f64, f1nprv: f64, f1norm: f64, slpi: f64) -> f64 {
    let t1 = f1normp - f1norm - rl * slpi;
    let t2 = f1nprv - f1norm - rlprev * slpi;
    let rlsq = rl * rl;
    let rlprvsq = rlprev * rlprev;
    let a = (t1 / rlsq - t2 / rlprvsq) / (rl - rlprev);
    let b = (-rlprev * t1 / rlsq + rl * t2 / rlprvsq) / (rl - rlprev);
    if a == 0.0 {
        return -slpi / (2.0 * b);
    }
    let disc = b * b - 3.0 * a * slpi;
    if disc < 0.0 {
        return 0.5 * rl;
    }
    (-b + disc.sqrt()) / (3.0 * a)
}
