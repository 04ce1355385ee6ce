//! Nonlinear solver context.
//!
//! `KinContext` solves `F(u) = 0` with an inexact Newton iteration: every Newton system
//! `J p = -F` is solved by the attached [`SpgmrContext`] in the scaled norm to the relative
//! tolerance given by the forcing term, and the step is globalized by a full (length-limited)
//! Newton step or a backtracking line search.
//!
//! # Usage
//!
//! 1. `create()`, then `init(func, template)` to register the system function.
//! 2. Attach a linear solver with `set_linear_solver`, optionally a Jacobian-vector product
//!    with `set_jac_times`.
//! 3. Adjust optional inputs with the setters (or `with_options`).
//! 4. Call `solve`; counters and norms of the last solve are available afterwards.
//!
//! # References
//! - Brown, P. N. & Saad, Y. (1990). Hybrid Krylov methods for nonlinear systems of equations.
//! - Dennis, J. E. & Schnabel, R. B. (1996). Numerical Methods for Unconstrained Optimization
//!   and Nonlinear Equations. SIAM.

use crate::config::{EtaChoice, KinOptions, PrintFlags};
use crate::context::SpgmrContext;
use crate::core::traits::LinearOperator;
use crate::error::{KinError, SysFnError};
use crate::nonlinear::forcing::{self, Forcing};
use crate::nonlinear::jtimes::JacobianOperator;
use crate::nonlinear::linesearch::StepControl;
use crate::nonlinear::{
    Counters, GlobalStrategy, JacTimesFn, SolveStatus, SysFn, scaled_max_norm, scaled_step_length, work_vector,
};
use crate::nvector::SerialVector;

/// Consecutive maximum-length steps tolerated before giving up.
const MAX_STEPS_AT_MAX_LENGTH: usize = 5;
const DEFAULT_MAX_ITERS: usize = 200;
const DEFAULT_ETA_CONST: f64 = 0.1;
const DEFAULT_ETA_GAMMA: f64 = 0.9;
const DEFAULT_ETA_ALPHA: f64 = 2.0;

/// Inexact Newton–Krylov solver context.
pub struct KinContext {
    func: Option<SysFn>,
    jtimes: Option<JacTimesFn>,
    ls: Option<SpgmrContext>,
    template_len: usize,
    opts: KinOptions,
    counters: Counters,
    fnorm: f64,
    step_length: f64,
}

impl Default for KinContext {
    fn default() -> Self {
        Self::create()
    }
}

impl KinContext {
    /// Create an uninitialized context with default options.
    pub fn create() -> Self {
        Self {
            func: None,
            jtimes: None,
            ls: None,
            template_len: 0,
            opts: KinOptions::default(),
            counters: Counters::default(),
            fnorm: 0.0,
            step_length: 0.0,
        }
    }

    /// Register the system function and the shape of the vectors it works on.
    pub fn init<F>(&mut self, func: F, template: &SerialVector) -> Result<(), KinError>
    where
        F: FnMut(&SerialVector, &mut SerialVector) -> Result<(), SysFnError> + 'static,
    {
        if template.is_empty() {
            return Err(KinError::IllInput("template vector is empty"));
        }
        self.func = Some(Box::new(func));
        self.template_len = template.len();
        Ok(())
    }

    /// Attach the linear solver used for the Newton systems. The context takes ownership.
    pub fn set_linear_solver(&mut self, ls: SpgmrContext) -> Result<(), KinError> {
        if self.func.is_none() {
            return Err(KinError::NoMalloc);
        }
        if ls.len() != self.template_len {
            return Err(KinError::IllInput("linear solver template length differs from the system"));
        }
        self.ls = Some(ls);
        Ok(())
    }

    /// Use `jtimes(v, jv, u)` for Jacobian-vector products instead of difference quotients.
    pub fn set_jac_times<J>(&mut self, jtimes: J) -> Result<(), KinError>
    where
        J: FnMut(&SerialVector, &mut SerialVector, &SerialVector) -> Result<(), SysFnError> + 'static,
    {
        if self.ls.is_none() {
            return Err(KinError::IllInput("no linear solver attached"));
        }
        self.jtimes = Some(Box::new(jtimes));
        Ok(())
    }

    /// Stopping tolerance on ‖D_F F(u)‖_∞ (0 selects ε^(1/3)).
    pub fn set_func_norm_tol(&mut self, tol: f64) -> Result<(), KinError> {
        if !(tol >= 0.0) {
            return Err(KinError::IllInput("function-norm tolerance is negative"));
        }
        self.opts.func_norm_tol = tol;
        Ok(())
    }

    /// Stopping tolerance on the scaled step length (0 selects ε^(2/3)).
    pub fn set_scaled_step_tol(&mut self, tol: f64) -> Result<(), KinError> {
        if !(tol >= 0.0) {
            return Err(KinError::IllInput("scaled-step tolerance is negative"));
        }
        self.opts.scaled_step_tol = tol;
        Ok(())
    }

    /// Maximum number of nonlinear iterations (0 selects 200).
    pub fn set_num_max_iters(&mut self, max_iters: usize) -> Result<(), KinError> {
        self.opts.max_iters = if max_iters == 0 { DEFAULT_MAX_ITERS } else { max_iters };
        Ok(())
    }

    /// Maximum scaled length of a Newton step (0 selects 1000 · max(‖D_u u₀‖₂, 1)).
    pub fn set_max_newton_step(&mut self, mxnewtstep: f64) -> Result<(), KinError> {
        if !(mxnewtstep >= 0.0) {
            return Err(KinError::IllInput("maximum Newton step is negative"));
        }
        self.opts.max_newton_step = mxnewtstep;
        Ok(())
    }

    pub fn set_eta_choice(&mut self, choice: EtaChoice) -> Result<(), KinError> {
        forcing::validate(&choice)?;
        self.opts.eta_choice = choice;
        Ok(())
    }

    /// Use a constant forcing term `eta` (0 selects 0.1).
    pub fn set_eta_const_value(&mut self, eta: f64) -> Result<(), KinError> {
        let eta = if eta == 0.0 { DEFAULT_ETA_CONST } else { eta };
        self.set_eta_choice(EtaChoice::Constant(eta))
    }

    /// Use forcing-term choice 2 with `gamma` and `alpha` (0 selects 0.9 and 2).
    pub fn set_eta_params(&mut self, gamma: f64, alpha: f64) -> Result<(), KinError> {
        let gamma = if gamma == 0.0 { DEFAULT_ETA_GAMMA } else { gamma };
        let alpha = if alpha == 0.0 { DEFAULT_ETA_ALPHA } else { alpha };
        self.set_eta_choice(EtaChoice::Choice2 { gamma, alpha })
    }

    pub fn set_print_flags(&mut self, print: PrintFlags) {
        self.opts.print = print;
    }

    /// Replace all optional inputs at once.
    pub fn with_options(mut self, opts: KinOptions) -> Result<Self, KinError> {
        self.set_func_norm_tol(opts.func_norm_tol)?;
        self.set_scaled_step_tol(opts.scaled_step_tol)?;
        self.set_num_max_iters(opts.max_iters)?;
        self.set_max_newton_step(opts.max_newton_step)?;
        self.set_eta_choice(opts.eta_choice)?;
        self.set_print_flags(opts.print);
        Ok(self)
    }

    pub fn options(&self) -> &KinOptions {
        &self.opts
    }

    /// Solve `F(u) = 0` starting from `u`, which is overwritten with the last iterate.
    ///
    /// `u_scale` and `f_scale` are the positive diagonal scalings `D_u` and `D_F`.
    pub fn solve(
        &mut self,
        u: &mut SerialVector,
        strategy: GlobalStrategy,
        u_scale: &SerialVector,
        f_scale: &SerialVector,
    ) -> Result<SolveStatus, KinError> {
        let Self { func, jtimes, ls, template_len, opts, counters, fnorm: fnorm_out, step_length } = self;
        let func = func.as_mut().ok_or(KinError::NoMalloc)?;
        let n = *template_len;
        if u.len() != n || u_scale.len() != n || f_scale.len() != n {
            return Err(KinError::IllInput("vector length differs from the template"));
        }
        if !(u_scale.min() > 0.0) || !(f_scale.min() > 0.0) {
            return Err(KinError::IllInput("scaling vectors must be positive"));
        }
        let ls = ls.as_mut().ok_or(KinError::LinitFail("no linear solver attached"))?;

        let fnormtol = if opts.func_norm_tol > 0.0 { opts.func_norm_tol } else { f64::EPSILON.cbrt() };
        let scsteptol = if opts.scaled_step_tol > 0.0 { opts.scaled_step_tol } else { f64::EPSILON.powf(2.0 / 3.0) };
        let mxnewtstep = if opts.max_newton_step > 0.0 {
            opts.max_newton_step
        } else {
            1000.0 * u.wl2_norm(u_scale).max(1.0)
        };
        let verbose = opts.print.contains(PrintFlags::NONLINEAR);
        let control = StepControl {
            u_scale,
            f_scale,
            mxnewtstep,
            scsteptol,
            print: opts.print.contains(PrintFlags::LINESEARCH),
        };

        *counters = Counters::default();
        *step_length = 0.0;
        let mut forcing = Forcing::new(opts.eta_choice);

        let mut fval = work_vector(u.len())?;
        counters.nfe += 1;
        func(u, &mut fval).map_err(|e| match e {
            SysFnError::Recoverable => KinError::FirstSysFuncErr,
            SysFnError::Unrecoverable => KinError::SysFuncFail,
        })?;
        let mut fnorm = fval.wl2_norm(f_scale);
        *fnorm_out = fnorm;
        if scaled_max_norm(&fval, f_scale) <= 0.01 * fnormtol {
            if verbose {
                eprintln!("nksol: initial guess satisfies the tolerance, fnorm = {:e}", fnorm);
            }
            return Ok(SolveStatus::InitialGuessOk);
        }
        if verbose {
            eprintln!("nksol: nni = {:>4}  nfe = {:>5}  fnorm = {:e}", 0, counters.nfe, fnorm);
        }

        let mut b = work_vector(u.len())?;
        let mut xt = work_vector(u.len())?;
        let mut p = work_vector(u.len())?;
        let mut unew = work_vector(u.len())?;
        let mut fnew = work_vector(u.len())?;
        let mut work = work_vector(u.len())?;
        let mut max_steps = 0;

        loop {
            counters.nni += 1;

            // b = -D_F F(u)
            b.prod(f_scale, &fval);
            b.scale_in_place(-1.0);
            let eta = forcing.eta();
            let (stats, slpi) = {
                let mut op = JacobianOperator::new(func, jtimes.as_mut(), u, &fval, u_scale, f_scale, counters)?;
                let stats = ls.solve(&mut op, &b, &mut xt, eta)?;
                // directional derivative of ½‖D_F F‖² along p: -(b · Ã x̃)
                let slpi = if strategy == GlobalStrategy::LineSearch {
                    op.apply(&xt, &mut work)?;
                    -b.dot(&work)
                } else {
                    0.0
                };
                (stats, slpi)
            };
            counters.nli += stats.iterations;
            if !stats.converged {
                counters.nlcf += 1;
            }
            if opts.print.contains(PrintFlags::LINEAR) {
                eprintln!(
                    "nksol: gmres iterations = {}, residual = {:e}, eta = {:e}, converged = {}",
                    stats.iterations, stats.final_residual, eta, stats.converged
                );
            }
            let lin_res = stats.final_residual;
            p.div(&xt, u_scale);

            let step = match strategy {
                GlobalStrategy::None => control.full_step(func, counters, u, &mut p, &mut unew, &mut fnew)?,
                GlobalStrategy::LineSearch => {
                    if !(slpi < 0.0) {
                        return Err(KinError::LinSolvNoRecovery);
                    }
                    let f1norm = 0.5 * fnorm * fnorm;
                    control.line_search(func, counters, u, &mut p, f1norm, slpi, &mut unew, &mut fnew)?
                }
            };

            let fnorm_new = (2.0 * step.f1norm).sqrt();
            let fmax = scaled_max_norm(&fnew, f_scale);
            work.linear_sum(1.0, &unew, -1.0, u);
            let rlength = scaled_step_length(&work, &unew, u_scale);
            forcing.update(fnorm_new, fnorm, lin_res);

            std::mem::swap(u, &mut unew);
            std::mem::swap(&mut fval, &mut fnew);
            fnorm = fnorm_new;
            *fnorm_out = fnorm;
            *step_length = step.step_length;

            if verbose {
                eprintln!(
                    "nksol: nni = {:>4}  nfe = {:>5}  fnorm = {:e}  step = {:e}",
                    counters.nni, counters.nfe, fnorm, step.step_length
                );
            }

            if fmax <= fnormtol {
                return Ok(SolveStatus::Success);
            }
            if rlength <= scsteptol {
                return Ok(SolveStatus::StepLtStptol);
            }
            if step.max_step_taken {
                max_steps += 1;
                if max_steps == MAX_STEPS_AT_MAX_LENGTH {
                    return Err(KinError::MxNewt5xExceeded);
                }
            } else {
                max_steps = 0;
            }
            if counters.nni >= opts.max_iters {
                return Err(KinError::MaxIterReached(opts.max_iters));
            }
        }
    }

    /// Nonlinear iterations of the last solve.
    pub fn num_nonlin_solv_iters(&self) -> usize {
        self.counters.nni
    }

    /// System function evaluations, excluding those of difference quotients.
    pub fn num_func_evals(&self) -> usize {
        self.counters.nfe
    }

    pub fn num_lin_iters(&self) -> usize {
        self.counters.nli
    }

    /// Linear solves that stopped short of their tolerance.
    pub fn num_lin_conv_fails(&self) -> usize {
        self.counters.nlcf
    }

    pub fn num_jtimes_evals(&self) -> usize {
        self.counters.njtimes
    }

    /// System function evaluations made by difference-quotient Jacobian-vector products.
    pub fn num_lin_func_evals(&self) -> usize {
        self.counters.nfe_dq
    }

    pub fn num_backtrack_ops(&self) -> usize {
        self.counters.nbacktr
    }

    /// ‖D_F F(u)‖₂ at the last iterate.
    pub fn func_norm(&self) -> f64 {
        self.fnorm
    }

    /// Fraction of the Newton step taken in the last iteration.
    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    /// The attached linear solver, if any.
    pub fn linear_solver(&self) -> Option<&SpgmrContext> {
        self.ls.as_ref()
    }
}
