// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use cegis::cegis::*;
use cegis::ir::*;
use cegis::solver::*;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "synth")]
#[command(author = "Kevin Laeufer <laeufer@cornell.edu>")]
#[command(version)]
#[command(about = "Synthesizes constants for small bit-vector benchmarks.", long_about = None)]
struct Args {
    #[arg(value_enum, index = 1)]
    benchmark: Benchmark,
    #[arg(long, value_enum, default_value = "enumerate")]
    solver: SolverKind,
    #[arg(long, default_value_t = 4, help = "bit-width of the benchmark variables")]
    width: WidthInt,
    #[arg(long, help = "print the result as a single CSV line")]
    csv: bool,
    #[arg(long, help = "log solver communication to this file")]
    replay: Option<PathBuf>,
    #[arg(long, default_value_t = 20, help = "enumeration limit of the built-in solver")]
    max_free_bits: u32,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Benchmark {
    /// choose between an inverter and a buffer
    Not,
    /// find `k` with `x & k == x`
    Mask,
    /// find `s` with `x << s == x * 4`
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolverKind {
    Enumerate,
    Z3,
    Bitwuzla,
    Yices2,
}

fn main() {
    let args = Args::parse();
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = Context::default();
    let problem = build_problem(&mut ctx, args.benchmark, args.width);
    let impl_vars = problem.impl_vars().to_vec();

    let result = match args.solver {
        SolverKind::Enumerate => {
            let opts = EnumerativeSolverOptions {
                max_free_bits: args.max_free_bits,
            };
            let engine = CegisEngine::new(
                problem,
                EnumerativeSolver::new(opts),
                EnumerativeSolver::new(opts),
            );
            engine.run(&mut ctx)
        }
        SolverKind::Z3 | SolverKind::Bitwuzla | SolverKind::Yices2 => {
            let cmd = match args.solver {
                SolverKind::Z3 => Z3_CMD,
                SolverKind::Bitwuzla => BITWUZLA_CMD,
                _ => YICES2_CMD,
            };
            let impl_opts = SmtSolverOptions {
                save_smt_replay: args.replay.clone(),
            };
            let ce_opts = SmtSolverOptions {
                save_smt_replay: args.replay.as_ref().map(|p| p.with_extension("ce.smt")),
            };
            let impl_solver = SmtSolver::new(cmd, &impl_opts).expect("failed to start solver");
            let ce_solver = SmtSolver::new(cmd, &ce_opts).expect("failed to start solver");
            CegisEngine::new(problem, impl_solver, ce_solver).run(&mut ctx)
        }
    };
    let result = result.expect("synthesis failed");

    let format = if args.csv {
        ReportFormat::Csv
    } else {
        ReportFormat::Human
    };
    result
        .write_report(&mut std::io::stdout(), format)
        .expect("failed to write report");
    if !args.csv {
        for var in impl_vars {
            if let Ok(value) = result.get_valuation(&mut ctx, var) {
                println!(
                    "{} = {}",
                    var.serialize_to_str(&ctx),
                    value.serialize_to_str(&ctx)
                );
            }
        }
    }
}

fn build_problem(ctx: &mut Context, benchmark: Benchmark, width: WidthInt) -> CegisProblem {
    let tru = ctx.tru();
    let (impl_var, input, helper, behavioral, correctness) = match benchmark {
        Benchmark::Not => {
            let f = ctx.bool_symbol("f");
            let x = ctx.bv_symbol("x", width);
            let y = ctx.bv_symbol("y", width);
            let not_x = ctx.not(x);
            let ite = ctx.bv_ite(f, not_x, x);
            let behavioral = ctx.bv_equal(y, ite);
            let correctness = ctx.bv_equal(y, not_x);
            (f, x, y, behavioral, correctness)
        }
        Benchmark::Mask => {
            let k = ctx.bv_symbol("k", width);
            let x = ctx.bv_symbol("x", width);
            let y = ctx.bv_symbol("y", width);
            let x_and_k = ctx.and(x, k);
            let behavioral = ctx.bv_equal(y, x_and_k);
            let correctness = ctx.bv_equal(y, x);
            (k, x, y, behavioral, correctness)
        }
        Benchmark::Shift => {
            let s = ctx.bv_symbol("s", width);
            let x = ctx.bv_symbol("x", width);
            let y = ctx.bv_symbol("y", width);
            let shifted = ctx.shift_left(x, s);
            let behavioral = ctx.bv_equal(y, shifted);
            let four = ctx.bv_lit(4 & (u64::MAX >> (64 - width)), width);
            let times_four = ctx.mul(x, four);
            let correctness = ctx.bv_equal(y, times_four);
            (s, x, y, behavioral, correctness)
        }
    };
    let name = format!("{benchmark:?}").to_lowercase();
    CegisProblem::new(
        ctx,
        &[impl_var],
        &[input],
        &[helper],
        tru,
        behavioral,
        correctness,
    )
    .expect("benchmark problems are well formed")
    .with_name(name)
}
