use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nksol::nonlinear::GlobalStrategy;
use nksol::problem::{self, INITIAL_GUESS};
use nksol::{KinContext, SerialVector, SpgmrContext};

fn context(jtv: bool, template: &SerialVector) -> KinContext {
    let mut kin = KinContext::create();
    kin.init(problem::system, template).unwrap();
    kin.set_linear_solver(SpgmrContext::new(template, 0).unwrap()).unwrap();
    if jtv {
        kin.set_jac_times(problem::jac_times).unwrap();
    }
    kin.set_func_norm_tol(1e-5).unwrap();
    kin.set_scaled_step_tol(1e-5).unwrap();
    kin
}

fn bench_simple_kinsol(c: &mut Criterion) {
    let y0 = SerialVector::from_slice(&INITIAL_GUESS).unwrap();
    let mut scale = y0.clone_empty().unwrap();
    scale.fill(1.0);

    for (name, jtv) in [("nksol difference-quotient J*v", false), ("nksol user J*v", true)] {
        let mut kin = context(jtv, &y0);
        c.bench_function(name, |ben| {
            ben.iter(|| {
                let mut u = y0.clone();
                let _status = kin
                    .solve(black_box(&mut u), GlobalStrategy::LineSearch, black_box(&scale), black_box(&scale))
                    .unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_simple_kinsol);
criterion_main!(benches);
