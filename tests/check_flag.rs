//! Status-check behaviour against real library calls.

use nksol::error::CheckError;
use nksol::nonlinear::GlobalStrategy;
use nksol::utils::check::{self, CheckMode, Returned, check_flag, diagnose};
use nksol::{KinContext, SerialVector, SpgmrContext};

#[test]
fn allocation_results() {
    assert!(check_flag(&SerialVector::new(0), "SerialVector::new", CheckMode::Memory));
    assert!(!check_flag(&SerialVector::new(2), "SerialVector::new", CheckMode::Memory));
    let t = SerialVector::new(2).unwrap();
    assert!(!check_flag(&SpgmrContext::new(&t, 0), "SpgmrContext::new", CheckMode::Handle));
}

#[test]
fn flag_results() {
    let mut kin = KinContext::create();
    let mut u = SerialVector::from_slice(&[1.0, 1.0]).unwrap();
    let s = u.clone();
    let res = kin.solve(&mut u, GlobalStrategy::LineSearch, &s, &s);
    assert_eq!(Returned::from(&res), Returned::Flag(-3));
    assert!(check_flag(&res, "KinContext::solve", CheckMode::Flag));
    assert!(!check_flag(&kin.set_func_norm_tol(1e-5), "KinContext::set_func_norm_tol", CheckMode::Flag));
}

#[test]
fn integer_modes() {
    let mode = CheckMode::try_from(1).unwrap();
    assert_eq!(
        diagnose(Returned::Flag(-1), "KINSol", mode).map(|e| e.to_string()),
        Some("SOLVER_ERROR: KINSol() failed with flag = -1".to_string())
    );
    assert!(diagnose(Returned::Null, "N_VNew", CheckMode::try_from(2).unwrap()).is_some());
    assert!(diagnose(Returned::Handle, "KINCreate", CheckMode::try_from(0).unwrap()).is_none());
}

#[test]
fn propagated_flag_keeps_its_source() {
    let mut kin = KinContext::create();
    let err = check::flag(kin.set_max_newton_step(-1.0), "KinContext::set_max_newton_step").unwrap_err();
    match err {
        CheckError::Flag { flag, source, .. } => {
            assert_eq!(flag, -2);
            assert!(source.is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
}
