// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::rename::{renamed_symbol, NamingPattern};
use crate::ir::{Context, ExprRef};
use crate::solver::{value_to_literal, Model};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

lazy_static::lazy_static! {
    static ref GLOBAL_IDS: CounterExampleIds = CounterExampleIds::new();
}

/// Sequence of counter-example ids. Clones share the same underlying counter.
#[derive(Debug, Clone, Default)]
pub struct CounterExampleIds {
    next: Arc<AtomicU64>,
}

impl CounterExampleIds {
    /// A fresh sequence starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide sequence.
    pub fn global() -> Self {
        GLOBAL_IDS.clone()
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The id that the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Candidate implementation proposed by the synthesis solver.
#[derive(Debug, Clone)]
pub struct Implementation {
    model: Model,
}

impl Implementation {
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Conjunction of `v == value(v)` for every implementation variable the model knows.
    pub fn extract_constraints(&self, ctx: &mut Context, impl_vars: &[ExprRef]) -> ExprRef {
        let bindings: Vec<_> = impl_vars
            .iter()
            .filter_map(|var| self.model.get(*var).map(|value| (*var, value)))
            .map(|(var, value)| {
                let lit = value_to_literal(ctx, value);
                ctx.bv_equal(var, lit)
            })
            .collect();
        ctx.and_many(bindings)
    }

    /// Value of `var` as a literal or `var` itself if the model does not constrain it.
    pub fn get_valuation(&self, ctx: &mut Context, var: ExprRef) -> ExprRef {
        valuation(&self.model, ctx, var)
    }
}

/// Input assignment for which the last candidate implementation violates correctness.
#[derive(Debug, Clone)]
pub struct CounterExample {
    id: u64,
    model: Model,
}

impl CounterExample {
    /// Draws the next id from `ids`.
    pub fn new(model: Model, ids: &CounterExampleIds) -> Self {
        Self {
            id: ids.next_id(),
            model,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Conjunction of `rename(v_i) == value(v_i)` where every input is renamed with its
    /// position and the id of this counter-example.
    pub fn extract_constraints(
        &self,
        ctx: &mut Context,
        input_vars: &[ExprRef],
        pattern: NamingPattern,
    ) -> ExprRef {
        let mut bindings = Vec::with_capacity(input_vars.len());
        for (position, var) in input_vars.iter().enumerate() {
            if let Some(value) = self.model.get(*var) {
                let renamed = renamed_symbol(ctx, *var, pattern, position, self.id);
                let lit = value_to_literal(ctx, value);
                bindings.push(ctx.bv_equal(renamed, lit));
            }
        }
        ctx.and_many(bindings)
    }

    pub fn get_valuation(&self, ctx: &mut Context, var: ExprRef) -> ExprRef {
        valuation(&self.model, ctx, var)
    }
}

fn valuation(model: &Model, ctx: &mut Context, var: ExprRef) -> ExprRef {
    match model.get(var) {
        Some(value) => value_to_literal(ctx, value),
        None => var,
    }
}
