//! Status checks for library calls.
//!
//! Creation calls return `Option` handles and operations return `Result`s carrying an integer
//! flag. [`check_flag`] inspects either kind of artifact under one of three modes and reports a
//! failure on standard error; [`handle`], [`memory`] and [`flag`] do the same check but return a
//! [`CheckError`] so callers can propagate with `?`.

use std::io::{self, Write};

use crate::error::{CheckError, KinError};
use crate::nonlinear::SolveStatus;

/// What a status check looks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckMode {
    /// A missing handle from a solver constructor.
    Handle = 0,
    /// A negative status flag.
    Flag = 1,
    /// A missing handle from an allocation.
    Memory = 2,
}

impl TryFrom<i32> for CheckMode {
    type Error = i32;

    fn try_from(mode: i32) -> Result<Self, i32> {
        match mode {
            0 => Ok(CheckMode::Handle),
            1 => Ok(CheckMode::Flag),
            2 => Ok(CheckMode::Memory),
            other => Err(other),
        }
    }
}

/// The artifact a library call returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Returned {
    Null,
    Handle,
    Flag(i32),
}

impl<T> From<&Option<T>> for Returned {
    fn from(handle: &Option<T>) -> Self {
        match handle {
            Some(_) => Returned::Handle,
            None => Returned::Null,
        }
    }
}

impl From<i32> for Returned {
    fn from(flag: i32) -> Self {
        Returned::Flag(flag)
    }
}

/// Integer flag of a successful call.
pub trait ReturnFlag {
    fn return_flag(&self) -> i32;
}

impl ReturnFlag for () {
    fn return_flag(&self) -> i32 {
        0
    }
}

impl ReturnFlag for SolveStatus {
    fn return_flag(&self) -> i32 {
        self.flag()
    }
}

impl<T: ReturnFlag> From<&Result<T, KinError>> for Returned {
    fn from(result: &Result<T, KinError>) -> Self {
        match result {
            Ok(v) => Returned::Flag(v.return_flag()),
            Err(e) => Returned::Flag(e.flag()),
        }
    }
}

/// The diagnostic for `returned` under `mode`, if it signals a failure.
///
/// An artifact of the wrong kind for the mode is never a failure.
pub fn diagnose(returned: Returned, funcname: &'static str, mode: CheckMode) -> Option<CheckError> {
    match (mode, returned) {
        (CheckMode::Handle, Returned::Null) => Some(CheckError::NullHandle { func: funcname }),
        (CheckMode::Flag, Returned::Flag(flag)) if flag < 0 => {
            Some(CheckError::Flag { func: funcname, flag, source: None })
        }
        (CheckMode::Memory, Returned::Null) => Some(CheckError::NullMemory { func: funcname }),
        _ => None,
    }
}

/// The diagnostic text framed by blank lines, as written to standard error.
pub fn framed(err: &CheckError) -> String {
    format!("\n{err}\n\n")
}

/// Write the framed diagnostic to `out`.
pub fn report_to<W: Write>(out: &mut W, err: &CheckError) -> io::Result<()> {
    out.write_all(framed(err).as_bytes())?;
    out.flush()
}

/// Write a diagnostic to standard error, framed by blank lines.
pub fn report(err: &CheckError) {
    // Nothing sensible to do if stderr is gone.
    let _ = report_to(&mut io::stderr().lock(), err);
}

/// Check a returned artifact; on failure report it and return `true`.
pub fn check_flag(returned: impl Into<Returned>, funcname: &'static str, mode: CheckMode) -> bool {
    match diagnose(returned.into(), funcname, mode) {
        Some(err) => {
            report(&err);
            true
        }
        None => false,
    }
}

/// Unwrap a handle from a solver constructor.
pub fn handle<T>(h: Option<T>, funcname: &'static str) -> Result<T, CheckError> {
    h.ok_or(CheckError::NullHandle { func: funcname })
}

/// Unwrap a handle from an allocation.
pub fn memory<T>(h: Option<T>, funcname: &'static str) -> Result<T, CheckError> {
    h.ok_or(CheckError::NullMemory { func: funcname })
}

/// Pass a successful result through; a failure becomes a flag diagnostic.
pub fn flag<T>(result: Result<T, KinError>, funcname: &'static str) -> Result<T, CheckError> {
    result.map_err(|e| CheckError::Flag { func: funcname, flag: e.flag(), source: Some(e) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_integer() {
        assert_eq!(CheckMode::try_from(0), Ok(CheckMode::Handle));
        assert_eq!(CheckMode::try_from(1), Ok(CheckMode::Flag));
        assert_eq!(CheckMode::try_from(2), Ok(CheckMode::Memory));
        assert_eq!(CheckMode::try_from(3), Err(3));
        assert_eq!(CheckMode::Memory as i32, 2);
    }

    #[test]
    fn null_handles_fail_in_handle_and_memory_modes() {
        let none: Option<u8> = None;
        assert!(check_flag(&none, "make", CheckMode::Handle));
        assert!(check_flag(&none, "make", CheckMode::Memory));
        assert!(!check_flag(&Some(1u8), "make", CheckMode::Handle));
        assert!(!check_flag(&Some(1u8), "make", CheckMode::Memory));
    }

    #[test]
    fn negative_flags_fail_in_flag_mode() {
        assert!(check_flag(-1_i32, "call", CheckMode::Flag));
        assert!(!check_flag(0_i32, "call", CheckMode::Flag));
        assert!(!check_flag(2_i32, "call", CheckMode::Flag));
        let ok: Result<SolveStatus, KinError> = Ok(SolveStatus::StepLtStptol);
        assert!(!check_flag(&ok, "call", CheckMode::Flag));
        let err: Result<(), KinError> = Err(KinError::MemFail);
        assert_eq!(
            diagnose((&err).into(), "call", CheckMode::Flag),
            Some(CheckError::Flag { func: "call", flag: -4, source: None })
        );
    }

    #[test]
    fn wrong_artifact_kind_is_not_a_failure() {
        assert!(!check_flag(-1_i32, "call", CheckMode::Handle));
        assert!(!check_flag(-1_i32, "call", CheckMode::Memory));
        let none: Option<u8> = None;
        assert!(!check_flag(&none, "call", CheckMode::Flag));
    }

    #[test]
    fn result_helpers_carry_the_message() {
        let err = memory::<u8>(None, "SerialVector::new").unwrap_err();
        assert_eq!(err.to_string(), "MEMORY_ERROR: SerialVector::new() failed - returned NULL pointer");
        let err = handle::<u8>(None, "SpgmrContext::new").unwrap_err();
        assert_eq!(err.to_string(), "SOLVER_ERROR: SpgmrContext::new() failed - returned NULL pointer");
        let err = flag::<()>(Err(KinError::NoMalloc), "KinContext::solve").unwrap_err();
        assert_eq!(err.to_string(), "SOLVER_ERROR: KinContext::solve() failed with flag = -3");
        assert_eq!(flag(Ok(7), "x").unwrap(), 7);
        assert_eq!(handle(Some(5), "x").unwrap(), 5);
    }

    #[test]
    fn report_writes_the_framed_bytes() {
        let err = CheckError::Flag { func: "KinContext::solve", flag: -6, source: None };
        assert_eq!(framed(&err), "\nSOLVER_ERROR: KinContext::solve() failed with flag = -6\n\n");
        let mut out = Vec::new();
        report_to(&mut out, &err).unwrap();
        assert_eq!(out, b"\nSOLVER_ERROR: KinContext::solve() failed with flag = -6\n\n");

        let mut out = Vec::new();
        report_to(&mut out, &CheckError::NullMemory { func: "SerialVector::new" }).unwrap();
        assert_eq!(out, b"\nMEMORY_ERROR: SerialVector::new() failed - returned NULL pointer\n\n");
    }
}
