use std::process::ExitCode;

use nksol::KinContext;
use nksol::driver::{self, RunOptions};
use nksol::utils::check;

#[derive(Default)]
struct Args {
    run: RunOptions,
    stats: bool,
}

fn usage() {
    eprintln!("usage: simple_kinsol [--jtv] [--stats] [--verbose] [--max-iters N]");
}

fn parse_args() -> Option<Args> {
    let mut args = Args::default();
    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--jtv" => args.run.jtv = true,
            "--stats" => args.stats = true,
            "--verbose" => args.run.verbose = true,
            "--max-iters" => args.run.max_iters = argv.next()?.parse().ok()?,
            _ => return None,
        }
    }
    Some(args)
}

fn print_stats(kin: &KinContext) {
    println!("Final Statistics:");
    println!("nni = {:>5}    nli   = {:>5}", kin.num_nonlin_solv_iters(), kin.num_lin_iters());
    println!("nfe = {:>5}    nfeLS = {:>5}", kin.num_func_evals(), kin.num_lin_func_evals());
    println!("njt = {:>5}    nlcf  = {:>5}", kin.num_jtimes_evals(), kin.num_lin_conv_fails());
    println!("nbt = {:>5}    fnorm = {:e}", kin.num_backtrack_ops(), kin.func_norm());
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        usage();
        return ExitCode::from(2);
    };
    let result = driver::run(&args.run);
    match &result {
        Ok(out) => {
            println!("Final Value of y0 vector: ");
            out.y0.print();
            if args.stats {
                print_stats(&out.kin);
            }
        }
        Err(err) => check::report(err),
    }
    ExitCode::from(driver::exit_code(&result))
}
