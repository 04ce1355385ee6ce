//! API options for the nonlinear solver.
//!
//! This module provides the `KinOptions` struct, which collects the optional inputs of a
//! [`KinContext`](crate::context::KinContext): stopping tolerances, iteration and step limits,
//! the forcing-term strategy of the inexact Newton iteration, and which diagnostics to print.
//! A zero tolerance or step limit selects the solver default.

use bitflags::bitflags;

bitflags! {
    /// Diagnostics written to standard error while solving.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct PrintFlags: u32 {
        const NONLINEAR  = 0b001; // one line per Newton iteration
        const LINEAR     = 0b010; // GMRES iterations and residual per linear solve
        const LINESEARCH = 0b100; // every backtracking step
        const ALL        = Self::NONLINEAR.bits() | Self::LINEAR.bits() | Self::LINESEARCH.bits();
    }
}

/// Forcing-term strategy for the inexact Newton iteration.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum EtaChoice {
    /// Eisenstat–Walker choice 1: `|‖F_k‖ - ‖F_{k-1} + J p_{k-1}‖| / ‖F_{k-1}‖`
    #[default]
    Choice1,
    /// Eisenstat–Walker choice 2: `gamma (‖F_k‖ / ‖F_{k-1}‖)^alpha`
    Choice2 { gamma: f64, alpha: f64 },
    /// Fixed relative tolerance for every linear solve
    Constant(f64),
}

/// Nonlinear solver options.
#[derive(Debug, Clone)]
pub struct KinOptions {
    /// Stopping tolerance on ‖D_F F(u)‖_∞ (0 = ε^(1/3))
    pub func_norm_tol: f64,

    /// Stopping tolerance on the scaled step length (0 = ε^(2/3))
    pub scaled_step_tol: f64,

    /// Maximum number of nonlinear iterations
    pub max_iters: usize,

    /// Maximum scaled length of a Newton step (0 = 1000 · max(‖D_u u₀‖₂, 1))
    pub max_newton_step: f64,

    /// Forcing-term strategy
    pub eta_choice: EtaChoice,

    /// Diagnostics to print
    pub print: PrintFlags,
}

impl Default for KinOptions {
    fn default() -> Self {
        Self {
            func_norm_tol: 0.0,
            scaled_step_tol: 0.0,
            max_iters: 200,
            max_newton_step: 0.0,
            eta_choice: EtaChoice::default(),
            print: PrintFlags::empty(),
        }
    }
}
