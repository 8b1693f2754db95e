// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Counter-example guided inductive synthesis.
//!
//! Given implementation variables, input variables and helper variables, the engine looks for
//! an assignment to the implementation variables such that for all inputs, every helper
//! assignment allowed by the `behavioral` relation also satisfies `correctness`.

mod engine;
mod problem;
mod rename;
mod result;
mod valuation;

pub use engine::{CegisEngine, SolverOutcome};
pub use problem::CegisProblem;
pub use rename::{is_reserved_name, renamed_symbol, substitute_vars, NamingPattern};
pub use result::{CegisResult, ReportFormat};
pub use valuation::{CounterExample, CounterExampleIds, Implementation};
