// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! A tiny in-process backend which exhaustively enumerates assignments.
//!
//! Top-level conjuncts of the form `sym == expr` are used as definitions whenever that does
//! not introduce a cycle. Only the remaining free symbols are enumerated, which keeps
//! problems with many helper variables tractable.

use super::{Model, Response, Solver};
use crate::ir::*;
use crate::{CegisError, Result};
use baa::{BitVecOps, BitVecValue};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerativeSolverOptions {
    /// Give up and answer `unknown` when more than this many bits need to be enumerated.
    pub max_free_bits: u32,
}

impl Default for EnumerativeSolverOptions {
    fn default() -> Self {
        Self { max_free_bits: 20 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumerativeSolver {
    opts: EnumerativeSolverOptions,
    assertions: Vec<ExprRef>,
    /// number of assertions at the time of each `push`
    scopes: Vec<usize>,
    /// satisfying assignment found by the last `check`
    last_model: Option<HashMap<ExprRef, BitVecValue>>,
}

impl EnumerativeSolver {
    pub fn new(opts: EnumerativeSolverOptions) -> Self {
        Self {
            opts,
            ..Default::default()
        }
    }

    pub fn num_assertions(&self) -> usize {
        self.assertions.len()
    }

    pub fn num_scopes(&self) -> usize {
        self.scopes.len()
    }
}

impl Solver for EnumerativeSolver {
    fn assert(&mut self, ctx: &Context, formula: ExprRef) -> Result<()> {
        if !formula.get_type(ctx).is_bool() {
            return Err(CegisError::Smt(format!(
                "cannot assert non-boolean expression {}",
                formula.serialize_to_str(ctx)
            )));
        }
        self.last_model = None;
        self.assertions.push(formula);
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        self.scopes.push(self.assertions.len());
        Ok(())
    }

    fn pop(&mut self) -> Result<()> {
        let len = self
            .scopes
            .pop()
            .ok_or_else(|| CegisError::Smt("pop without matching push".to_string()))?;
        self.assertions.truncate(len);
        self.last_model = None;
        Ok(())
    }

    fn check(&mut self, ctx: &Context) -> Result<Response> {
        self.last_model = None;
        let problem = match Problem::analyze(ctx, &self.assertions) {
            Some(p) => p,
            None => return Ok(Response::Unsat), // a conjunct is literally false
        };
        let free_bits: u32 = problem.free.iter().map(|(_, w)| *w).sum();
        if free_bits > self.opts.max_free_bits || free_bits >= u64::BITS {
            tracing::debug!(
                "{free_bits} free bits exceed the enumeration limit of {}",
                self.opts.max_free_bits
            );
            return Ok(Response::Unknown);
        }
        tracing::trace!(
            "enumerating {free_bits} bits over {} free symbols, {} definitions and {} constraints",
            problem.free.len(),
            problem.definitions.len(),
            problem.constraints.len()
        );

        for assignment in 0..(1u64 << free_bits) {
            let values = problem.assign(ctx, assignment);
            let satisfied = problem
                .constraints
                .iter()
                .all(|c| eval_bv_expr(ctx, &values, *c).is_tru());
            if satisfied {
                self.last_model = Some(values);
                return Ok(Response::Sat);
            }
        }
        Ok(Response::Unsat)
    }

    fn model(&mut self, _ctx: &Context, symbols: &[ExprRef]) -> Result<Model> {
        let values = self
            .last_model
            .as_ref()
            .ok_or_else(|| CegisError::Smt("no model available, last check was not sat".into()))?;
        let out = symbols
            .iter()
            .filter_map(|s| values.get(s).map(|v| (*s, v.clone())))
            .collect();
        Ok(Model::new(out))
    }
}

/// Active assertions split into what we need to enumerate and what we can compute.
struct Problem {
    /// symbols to enumerate, in order of first appearance
    free: Vec<(ExprRef, WidthInt)>,
    /// `(symbol, expr)` in an order where each definition only depends on earlier ones
    definitions: Vec<(ExprRef, ExprRef)>,
    constraints: Vec<ExprRef>,
}

impl Problem {
    fn analyze(ctx: &Context, assertions: &[ExprRef]) -> Option<Self> {
        let conjuncts = flatten_conjuncts(ctx, assertions)?;

        let mut defs: HashMap<ExprRef, ExprRef> = HashMap::new();
        let mut def_order = Vec::new();
        let mut constraints = Vec::new();
        for &c in conjuncts.iter() {
            match find_definition(ctx, &defs, c) {
                Some((symbol, value)) => {
                    defs.insert(symbol, value);
                    def_order.push(symbol);
                }
                None => constraints.push(c),
            }
        }

        let mut free = Vec::new();
        let mut seen = HashSet::new();
        for &c in conjuncts.iter() {
            for symbol in free_symbols(ctx, c) {
                if !defs.contains_key(&symbol) && seen.insert(symbol) {
                    let width = symbol.get_bv_type(ctx).unwrap_or(1);
                    free.push((symbol, width));
                }
            }
        }

        let definitions = topological_order(ctx, &defs, &def_order);
        Some(Self {
            free,
            definitions,
            constraints,
        })
    }

    /// Distributes the bits of `assignment` over the free symbols (first symbol gets the
    /// least significant bits) and computes all defined symbols.
    fn assign(&self, ctx: &Context, mut assignment: u64) -> HashMap<ExprRef, BitVecValue> {
        let mut values = HashMap::with_capacity(self.free.len() + self.definitions.len());
        for &(symbol, width) in self.free.iter() {
            let mask = if width >= u64::BITS {
                u64::MAX
            } else {
                (1u64 << width) - 1
            };
            values.insert(symbol, BitVecValue::from_u64(assignment & mask, width));
            assignment = assignment.checked_shr(width).unwrap_or(0);
        }
        for &(symbol, expr) in self.definitions.iter() {
            let value = eval_bv_expr(ctx, &values, expr);
            values.insert(symbol, value);
        }
        values
    }
}

/// Splits all assertions into their top-level conjuncts. Literal `true` conjuncts are dropped.
/// Returns `None` if any conjunct is literal `false`.
fn flatten_conjuncts(ctx: &Context, assertions: &[ExprRef]) -> Option<Vec<ExprRef>> {
    let mut out = Vec::new();
    let mut todo: Vec<ExprRef> = assertions.iter().rev().cloned().collect();
    while let Some(e) = todo.pop() {
        match ctx.get(e) {
            Expr::BVAnd(a, b, 1) => {
                todo.push(*b);
                todo.push(*a);
            }
            Expr::BVLiteral { value: 1, width: 1 } => {}
            Expr::BVLiteral { value: 0, width: 1 } => return None,
            _ => out.push(e),
        }
    }
    Some(out)
}

/// Tries to interpret `conjunct` as `symbol == expr` where `expr` does not depend on
/// `symbol` through any existing definition.
fn find_definition(
    ctx: &Context,
    defs: &HashMap<ExprRef, ExprRef>,
    conjunct: ExprRef,
) -> Option<(ExprRef, ExprRef)> {
    let (a, b) = match ctx.get(conjunct) {
        Expr::BVEqual(a, b) => (*a, *b),
        _ => return None,
    };
    [(a, b), (b, a)].into_iter().find(|&(symbol, value)| {
        symbol.is_symbol(ctx)
            && !defs.contains_key(&symbol)
            && !depends_on(ctx, defs, value, symbol)
    })
}

fn depends_on(
    ctx: &Context,
    defs: &HashMap<ExprRef, ExprRef>,
    expr: ExprRef,
    symbol: ExprRef,
) -> bool {
    let mut visited = HashSet::new();
    let mut todo = vec![expr];
    while let Some(e) = todo.pop() {
        for s in free_symbols(ctx, e) {
            if s == symbol {
                return true;
            }
            if visited.insert(s) {
                if let Some(def) = defs.get(&s) {
                    todo.push(*def);
                }
            }
        }
    }
    false
}

fn topological_order(
    ctx: &Context,
    defs: &HashMap<ExprRef, ExprRef>,
    def_order: &[ExprRef],
) -> Vec<(ExprRef, ExprRef)> {
    let mut out = Vec::with_capacity(def_order.len());
    let mut done = HashSet::new();
    // (symbol, dependencies_done)
    let mut todo: Vec<(ExprRef, bool)> = def_order.iter().rev().map(|s| (*s, false)).collect();
    while let Some((symbol, deps_done)) = todo.pop() {
        if done.contains(&symbol) {
            continue;
        }
        let def = defs[&symbol];
        if deps_done {
            done.insert(symbol);
            out.push((symbol, def));
        } else {
            todo.push((symbol, true));
            for dep in free_symbols(ctx, def) {
                if defs.contains_key(&dep) && !done.contains(&dep) {
                    todo.push((dep, false));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_model_in_enumeration_order() {
        let mut ctx = Context::default();
        let x = ctx.bv_symbol("x", 4);
        let three = ctx.bv_lit(3, 4);
        let formula = ctx.greater(x, three);
        let mut solver = EnumerativeSolver::default();
        solver.assert(&ctx, formula).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        let model = solver.model(&ctx, &[x]).unwrap();
        assert_eq!(model.get(x).unwrap().to_u64().unwrap(), 4);
    }

    #[test]
    fn push_pop_restores_assertions() {
        let mut ctx = Context::default();
        let a = ctx.bool_symbol("a");
        let not_a = ctx.not(a);
        let mut solver = EnumerativeSolver::default();
        solver.assert(&ctx, a).unwrap();
        solver.push().unwrap();
        solver.assert(&ctx, not_a).unwrap();
        assert_eq!(solver.num_scopes(), 1);
        assert_eq!(solver.check(&ctx).unwrap(), Response::Unsat);
        assert!(solver.model(&ctx, &[a]).is_err());
        solver.pop().unwrap();
        assert_eq!(solver.num_assertions(), 1);
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        assert!(solver.model(&ctx, &[a]).unwrap().get(a).unwrap().is_tru());
        assert!(solver.pop().is_err());
    }

    #[test]
    fn definitions_are_not_enumerated() {
        let mut ctx = Context::default();
        let x = ctx.bv_symbol("x", 4);
        let y = ctx.bv_symbol("y", 16);
        let z = ctx.bv_symbol("z", 16);
        let x_ext = ctx.zero_extend(x, 12);
        let y_def = ctx.bv_equal(y, x_ext);
        let z_def = ctx.bv_equal(z, y);
        let nine = ctx.bv_lit(9, 16);
        let goal = ctx.bv_equal(z, nine);
        let formula = ctx.and_many([z_def, y_def, goal]);
        // only the four bits of `x` need to be enumerated
        let mut solver = EnumerativeSolver::new(EnumerativeSolverOptions { max_free_bits: 4 });
        solver.assert(&ctx, formula).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        let model = solver.model(&ctx, &[x, y, z]).unwrap();
        assert_eq!(model.get(x).unwrap().to_u64().unwrap(), 9);
        assert_eq!(model.get(z).unwrap().to_u64().unwrap(), 9);
    }

    #[test]
    fn cyclic_equalities_stay_constraints() {
        let mut ctx = Context::default();
        let a = ctx.bv_symbol("a", 2);
        let b = ctx.bv_symbol("b", 2);
        let a_is_b = ctx.bv_equal(a, b);
        let b_is_a = ctx.bv_equal(b, a);
        let one = ctx.one(2);
        let a_plus_one = ctx.add(a, one);
        let contradiction = ctx.bv_equal(b, a_plus_one);
        let mut solver = EnumerativeSolver::default();
        solver.assert(&ctx, a_is_b).unwrap();
        solver.assert(&ctx, b_is_a).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        solver.assert(&ctx, contradiction).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Unsat);
    }

    #[test]
    fn too_many_free_bits_is_unknown() {
        let mut ctx = Context::default();
        let x = ctx.bv_symbol("x", 8);
        let y = ctx.bv_symbol("y", 8);
        let formula = ctx.greater(x, y);
        let mut solver = EnumerativeSolver::new(EnumerativeSolverOptions { max_free_bits: 12 });
        solver.assert(&ctx, formula).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Unknown);
    }

    #[test]
    fn literal_false_is_unsat() {
        let mut ctx = Context::default();
        let a = ctx.bool_symbol("a");
        let fals = ctx.fals();
        let formula = ctx.and(a, fals);
        let mut solver = EnumerativeSolver::default();
        solver.assert(&ctx, formula).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Unsat);
    }

    #[test]
    fn unseen_symbols_are_absent_from_model() {
        let mut ctx = Context::default();
        let a = ctx.bool_symbol("a");
        let b = ctx.bool_symbol("b");
        let mut solver = EnumerativeSolver::default();
        solver.assert(&ctx, a).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        let model = solver.model(&ctx, &[a, b]).unwrap();
        assert_eq!(model.len(), 1);
        assert!(!model.contains(b));
    }
}
