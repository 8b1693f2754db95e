// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Incremental satisfiability backends.
//!
//! A [`Solver`] keeps a stack of asserted Boolean formulas. After a `sat` answer, the values
//! of symbols can be read back as a [`Model`].

mod enumerate;
mod smt;

pub use enumerate::{EnumerativeSolver, EnumerativeSolverOptions};
pub use smt::{SmtSolver, SmtSolverCmd, SmtSolverOptions, BITWUZLA_CMD, YICES2_CMD, Z3_CMD};

use crate::ir::{substitute, Context, ExprRef, TypeCheck};
use crate::Result;
use baa::{BitVecOps, BitVecValue};
use std::fmt::{Display, Formatter};

/// Answer of a satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    Sat,
    Unsat,
    Unknown,
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Sat => write!(f, "sat"),
            Response::Unsat => write!(f, "unsat"),
            Response::Unknown => write!(f, "unknown"),
        }
    }
}

pub trait Solver {
    /// Adds `formula` (a 1-bit expression) to the current scope.
    fn assert(&mut self, ctx: &Context, formula: ExprRef) -> Result<()>;
    /// Opens a new assertion scope.
    fn push(&mut self) -> Result<()>;
    /// Drops all assertions made since the matching `push`.
    fn pop(&mut self) -> Result<()>;
    /// Checks whether the conjunction of all active assertions is satisfiable.
    fn check(&mut self, ctx: &Context) -> Result<Response>;
    /// Reads the values of `symbols` after a `sat` answer. Symbols that the solver has never
    /// seen in an assertion are left out of the model.
    fn model(&mut self, ctx: &Context, symbols: &[ExprRef]) -> Result<Model>;
}

/// Snapshot of symbol values returned by a solver.
#[derive(Debug, Clone, Default)]
pub struct Model {
    values: Vec<(ExprRef, BitVecValue)>,
}

impl Model {
    pub fn new(values: Vec<(ExprRef, BitVecValue)>) -> Self {
        Self { values }
    }

    pub fn get(&self, symbol: ExprRef) -> Option<&BitVecValue> {
        self.values
            .iter()
            .find(|(e, _)| *e == symbol)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, symbol: ExprRef) -> bool {
        self.get(symbol).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ExprRef, BitVecValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every symbol with a known value by a literal.
    pub fn eval(&self, ctx: &mut Context, expr: ExprRef) -> ExprRef {
        let replacements: Vec<_> = self
            .values
            .iter()
            .map(|(symbol, value)| (*symbol, value_to_literal(ctx, value)))
            .collect();
        substitute(ctx, expr, &replacements)
    }

    pub fn as_slice(&self) -> &[(ExprRef, BitVecValue)] {
        &self.values
    }
}

pub(crate) fn value_to_literal(ctx: &mut Context, value: &BitVecValue) -> ExprRef {
    let raw = value
        .to_u64()
        .expect("our IR only supports literals of up to 64 bits");
    ctx.bv_lit(raw, value.width())
}

/// Checks that `value` has the width of `symbol`.
pub(crate) fn value_matches_symbol(ctx: &Context, symbol: ExprRef, value: &BitVecValue) -> bool {
    symbol.get_bv_type(ctx) == Some(value.width())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_eval_replaces_known_symbols() {
        let mut ctx = Context::default();
        let a = ctx.bv_symbol("a", 4);
        let b = ctx.bv_symbol("b", 4);
        let sum = ctx.add(a, b);
        let model = Model::new(vec![(a, BitVecValue::from_u64(3, 4))]);
        assert!(model.contains(a));
        assert!(!model.contains(b));

        let three = ctx.bv_lit(3, 4);
        let expected = ctx.add(three, b);
        assert_eq!(model.eval(&mut ctx, sum), expected);
        // nothing known, nothing changes
        assert_eq!(Model::default().eval(&mut ctx, sum), sum);
    }

    #[test]
    fn response_display() {
        assert_eq!(Response::Sat.to_string(), "sat");
        assert_eq!(Response::Unsat.to_string(), "unsat");
        assert_eq!(Response::Unknown.to_string(), "unknown");
    }
}
