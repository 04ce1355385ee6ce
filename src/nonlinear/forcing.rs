//! Forcing terms for the inexact Newton iteration (Eisenstat & Walker, 1996).
//!
//! The forcing term `eta` is the relative tolerance handed to GMRES for the next Newton
//! system. Choices 1 and 2 start at 0.5, are safeguarded against dropping too fast, and
//! stay within `[1e-4, 0.9]`.

use crate::config::EtaChoice;
use crate::error::KinError;

const ETA_INITIAL: f64 = 0.5;
const ETA_MIN: f64 = 1e-4;
const ETA_MAX: f64 = 0.9;
const SAFEGUARD: f64 = 0.1;

pub(crate) struct Forcing {
    choice: EtaChoice,
    eta: f64,
}

impl Forcing {
    pub fn new(choice: EtaChoice) -> Self {
        let eta = match choice {
            EtaChoice::Constant(c) => c,
            _ => ETA_INITIAL,
        };
        Self { choice, eta }
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Update `eta` after a step.
    ///
    /// `fnorm` and `fnorm_prev` are the scaled L2 norms of F at the new and the old iterate;
    /// `lin_res` is the scaled norm of the linear model residual `F_prev + J p`.
    pub fn update(&mut self, fnorm: f64, fnorm_prev: f64, lin_res: f64) {
        if fnorm_prev <= 0.0 {
            return;
        }
        let eta = match self.choice {
            EtaChoice::Constant(c) => c,
            EtaChoice::Choice1 => {
                let alpha = 0.5 * (1.0 + 5f64.sqrt());
                let eta = (fnorm - lin_res).abs() / fnorm_prev;
                let safe = self.eta.powf(alpha);
                let eta = if safe > SAFEGUARD { eta.max(safe) } else { eta };
                eta.clamp(ETA_MIN, ETA_MAX)
            }
            EtaChoice::Choice2 { gamma, alpha } => {
                let eta = gamma * (fnorm / fnorm_prev).powf(alpha);
                let safe = gamma * self.eta.powf(alpha);
                let eta = if safe > SAFEGUARD { eta.max(safe) } else { eta };
                eta.clamp(ETA_MIN, ETA_MAX)
            }
        };
        self.eta = eta;
    }
}

/// Reject forcing-term parameters outside their admissible ranges.
pub(crate) fn validate(choice: &EtaChoice) -> Result<(), KinError> {
    match *choice {
        EtaChoice::Choice1 => Ok(()),
        EtaChoice::Constant(c) if c > 0.0 && c < 1.0 => Ok(()),
        EtaChoice::Constant(_) => Err(KinError::IllInput("constant eta must lie in (0, 1)")),
        EtaChoice::Choice2 { gamma, alpha } => {
            if !(gamma > 0.0 && gamma <= 1.0) {
                Err(KinError::IllInput("eta gamma must lie in (0, 1]"))
            } else if !(alpha > 1.0 && alpha <= 2.0) {
                Err(KinError::IllInput("eta alpha must lie in (1, 2]"))
            } else {
                Ok(())
            }
        }
    }
}
