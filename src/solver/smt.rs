// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{value_matches_symbol, Model, Response, Solver};
use crate::ir::*;
use crate::smt::{convert_expr, convert_tpe, escape_smt_identifier, parse_smt_bit_vec};
use crate::{CegisError, Result};
use easy_smt as smt;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtSolverCmd {
    pub name: &'static str,
    pub args: &'static [&'static str],
}

pub const BITWUZLA_CMD: SmtSolverCmd = SmtSolverCmd {
    name: "bitwuzla",
    args: &["--smt2", "--incremental"],
};

pub const YICES2_CMD: SmtSolverCmd = SmtSolverCmd {
    name: "yices-smt2",
    args: &["--incremental"],
};

pub const Z3_CMD: SmtSolverCmd = SmtSolverCmd {
    name: "z3",
    args: &["-smt2", "-in"],
};

#[derive(Debug, Clone, Default)]
pub struct SmtSolverOptions {
    /// If set, the communication with the SMT solver will be logged into this file.
    pub save_smt_replay: Option<PathBuf>,
}

/// Incremental solver backed by an external SMT-LIB process.
pub struct SmtSolver {
    cmd: SmtSolverCmd,
    smt_ctx: smt::Context,
    /// symbols declared in each open scope, the first entry is the base scope
    declared: Vec<Vec<ExprRef>>,
    known: HashSet<ExprRef>,
}

impl SmtSolver {
    pub fn new(cmd: SmtSolverCmd, opts: &SmtSolverOptions) -> Result<Self> {
        let replay_file = match &opts.save_smt_replay {
            Some(path) => Some(std::fs::File::create(path)?),
            None => None,
        };
        let mut smt_ctx = smt::ContextBuilder::new()
            .solver(cmd.name, cmd.args)
            .replay_file(replay_file)
            .build()?;

        // z3 does not always accept a quantifier free logic together with incremental solving
        let logic = if cmd.name == "z3" { "ALL" } else { "QF_BV" };
        smt_ctx.set_logic(logic)?;
        tracing::debug!("started {} with logic {logic}", cmd.name);

        Ok(Self {
            cmd,
            smt_ctx,
            declared: vec![Vec::new()],
            known: HashSet::new(),
        })
    }

    pub fn cmd(&self) -> SmtSolverCmd {
        self.cmd
    }

    fn declare_symbols(&mut self, ctx: &Context, formula: ExprRef) -> Result<()> {
        for symbol in free_symbols(ctx, formula) {
            if self.known.contains(&symbol) {
                continue;
            }
            let name = symbol.get_symbol_name(ctx).unwrap_or_default();
            let tpe = convert_tpe(&self.smt_ctx, symbol.get_type(ctx));
            self.smt_ctx
                .declare_const(escape_smt_identifier(name), tpe)?;
            self.known.insert(symbol);
            if let Some(scope) = self.declared.last_mut() {
                scope.push(symbol);
            }
        }
        Ok(())
    }
}

impl Solver for SmtSolver {
    fn assert(&mut self, ctx: &Context, formula: ExprRef) -> Result<()> {
        self.declare_symbols(ctx, formula)?;
        let expr = convert_expr(&self.smt_ctx, ctx, formula);
        self.smt_ctx.assert(expr)?;
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        self.smt_ctx.push_many(1)?;
        self.declared.push(Vec::new());
        Ok(())
    }

    fn pop(&mut self) -> Result<()> {
        if self.declared.len() < 2 {
            return Err(CegisError::Smt("pop without matching push".to_string()));
        }
        self.smt_ctx.pop_many(1)?;
        if let Some(scope) = self.declared.pop() {
            for symbol in scope {
                self.known.remove(&symbol);
            }
        }
        Ok(())
    }

    fn check(&mut self, _ctx: &Context) -> Result<Response> {
        let res = match self.smt_ctx.check()? {
            smt::Response::Sat => Response::Sat,
            smt::Response::Unsat => Response::Unsat,
            smt::Response::Unknown => Response::Unknown,
        };
        Ok(res)
    }

    fn model(&mut self, ctx: &Context, symbols: &[ExprRef]) -> Result<Model> {
        let requested: Vec<ExprRef> = symbols
            .iter()
            .cloned()
            .filter(|s| self.known.contains(s))
            .collect();
        if requested.is_empty() {
            return Ok(Model::default());
        }
        let exprs = requested
            .iter()
            .map(|s| convert_expr(&self.smt_ctx, ctx, *s))
            .collect();
        let values = self.smt_ctx.get_value(exprs)?;
        let mut out = Vec::with_capacity(requested.len());
        for (symbol, (_, smt_value)) in requested.into_iter().zip(values) {
            let value = parse_smt_bit_vec(&self.smt_ctx, smt_value).ok_or_else(|| {
                CegisError::Smt(format!(
                    "failed to parse value `{}`",
                    self.smt_ctx.display(smt_value)
                ))
            })?;
            if !value_matches_symbol(ctx, symbol, &value) {
                return Err(CegisError::Smt(format!(
                    "value `{}` does not match the type of {}",
                    self.smt_ctx.display(smt_value),
                    symbol.serialize_to_str(ctx)
                )));
            }
            out.push((symbol, value));
        }
        Ok(Model::new(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baa::BitVecOps;

    fn z3() -> Option<SmtSolver> {
        match SmtSolver::new(Z3_CMD, &SmtSolverOptions::default()) {
            Ok(solver) => Some(solver),
            Err(e) => {
                println!("skipping, z3 is not available: {e}");
                None
            }
        }
    }

    #[test]
    fn declarations_are_scoped() {
        let Some(mut solver) = z3() else { return };
        let mut ctx = Context::default();
        let a = ctx.bv_symbol("a", 8);
        let b = ctx.bv_symbol("b", 8);
        let forty_two = ctx.bv_lit(42, 8);
        let a_is_42 = ctx.bv_equal(a, forty_two);
        solver.assert(&ctx, a_is_42).unwrap();

        solver.push().unwrap();
        let b_is_a = ctx.bv_equal(b, a);
        solver.assert(&ctx, b_is_a).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        let model = solver.model(&ctx, &[a, b]).unwrap();
        assert_eq!(model.get(b).unwrap().to_u64().unwrap(), 42);
        solver.pop().unwrap();

        // `b` was declared inside the scope and is unknown again
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        let model = solver.model(&ctx, &[a, b]).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.get(a).unwrap().to_u64().unwrap(), 42);
        assert!(solver.pop().is_err());
    }

    #[test]
    fn boolean_model_values() {
        let Some(mut solver) = z3() else { return };
        let mut ctx = Context::default();
        let a = ctx.bool_symbol("a");
        let b = ctx.bool_symbol("b");
        let not_b = ctx.not(b);
        let formula = ctx.and(a, not_b);
        solver.assert(&ctx, formula).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Sat);
        let model = solver.model(&ctx, &[a, b]).unwrap();
        assert!(model.get(a).unwrap().is_tru());
        assert!(model.get(b).unwrap().is_fals());

        solver.assert(&ctx, b).unwrap();
        assert_eq!(solver.check(&ctx).unwrap(), Response::Unsat);
    }
}
