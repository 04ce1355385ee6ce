use thiserror::Error;

// Unified error types for nksol

/// Failure reported by a user callback (system function or Jacobian-vector product).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysFnError {
    /// The callback could not evaluate at this point, but a smaller step might succeed.
    #[error("recoverable callback failure")]
    Recoverable,
    /// The callback failed and the solve cannot continue.
    #[error("unrecoverable callback failure")]
    Unrecoverable,
}

/// Operational failures of the solver layer.
///
/// Each variant maps to a negative integer flag through [`KinError::flag`], so
/// callers that check integer status codes see the same values a C-style
/// solver interface would return.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinError {
    #[error("illegal input: {0}")]
    IllInput(&'static str),
    #[error("solver memory was not initialized with init()")]
    NoMalloc,
    #[error("could not reserve solver workspace")]
    MemFail,
    #[error("line search could not find an acceptable step")]
    LineSearchNonConv,
    #[error("maximum number of nonlinear iterations ({0}) reached")]
    MaxIterReached(usize),
    #[error("five consecutive steps of maximum length")]
    MxNewt5xExceeded,
    #[error("linear solver failed to reduce the residual and cannot recover")]
    LinSolvNoRecovery,
    #[error("linear solver initialization failed: {0}")]
    LinitFail(&'static str),
    #[error("linear solve failed: {0}")]
    LsolveFail(String),
    #[error("system function failed unrecoverably")]
    SysFuncFail,
    #[error("system function failed recoverably at the initial guess")]
    FirstSysFuncErr,
    #[error("system function failed recoverably too many times")]
    RepeatedSysFuncErr,
}

impl KinError {
    /// Integer status flag for this failure (always negative).
    pub fn flag(&self) -> i32 {
        match self {
            KinError::IllInput(_) => -2,
            KinError::NoMalloc => -3,
            KinError::MemFail => -4,
            KinError::LineSearchNonConv => -5,
            KinError::MaxIterReached(_) => -6,
            KinError::MxNewt5xExceeded => -7,
            KinError::LinSolvNoRecovery => -9,
            KinError::LinitFail(_) => -10,
            KinError::LsolveFail(_) => -12,
            KinError::SysFuncFail => -13,
            KinError::FirstSysFuncErr => -14,
            KinError::RepeatedSysFuncErr => -15,
        }
    }
}

/// Diagnostics raised by the status checks of an example program.
///
/// The display text is the exact line written to standard error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("SOLVER_ERROR: {func}() failed - returned NULL pointer")]
    NullHandle { func: &'static str },
    #[error("SOLVER_ERROR: {func}() failed with flag = {flag}")]
    Flag {
        func: &'static str,
        flag: i32,
        #[source]
        source: Option<KinError>,
    },
    #[error("MEMORY_ERROR: {func}() failed - returned NULL pointer")]
    NullMemory { func: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_negative_and_distinct() {
        let all = [
            KinError::IllInput("x"),
            KinError::NoMalloc,
            KinError::MemFail,
            KinError::LineSearchNonConv,
            KinError::MaxIterReached(1),
            KinError::MxNewt5xExceeded,
            KinError::LinSolvNoRecovery,
            KinError::LinitFail("x"),
            KinError::LsolveFail("x".into()),
            KinError::SysFuncFail,
            KinError::FirstSysFuncErr,
            KinError::RepeatedSysFuncErr,
        ];
        let mut flags: Vec<i32> = all.iter().map(KinError::flag).collect();
        assert!(flags.iter().all(|&f| f < 0));
        flags.sort_unstable();
        flags.dedup();
        assert_eq!(flags.len(), all.len());
    }

    #[test]
    fn check_error_messages() {
        let e = CheckError::NullHandle { func: "SerialVector::new" };
        assert_eq!(e.to_string(), "SOLVER_ERROR: SerialVector::new() failed - returned NULL pointer");
        let e = CheckError::Flag { func: "KinContext::solve", flag: -6, source: None };
        assert_eq!(e.to_string(), "SOLVER_ERROR: KinContext::solve() failed with flag = -6");
        let e = CheckError::NullMemory { func: "SpgmrContext::new" };
        assert_eq!(e.to_string(), "MEMORY_ERROR: SpgmrContext::new() failed - returned NULL pointer");
    }
}
