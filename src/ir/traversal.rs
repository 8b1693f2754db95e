// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{Context, ExprRef, ForEachChild};
use std::collections::HashSet;

/// Returns all symbols that `expr` depends on in the order in which they are first encountered
/// in a depth-first, left-to-right walk.
pub fn free_symbols(ctx: &Context, expr: ExprRef) -> Vec<ExprRef> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    let mut todo = vec![expr];
    while let Some(e) = todo.pop() {
        if !visited.insert(e) {
            continue;
        }
        let node = ctx.get(e);
        if node.is_symbol() {
            out.push(e);
        } else {
            let mut children = Vec::with_capacity(3);
            node.collect_children(&mut children);
            // reverse in order to visit the left most child first
            todo.extend(children.into_iter().rev());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_symbols_are_unique_and_ordered() {
        let mut ctx = Context::default();
        let a = ctx.bv_symbol("a", 4);
        let b = ctx.bv_symbol("b", 4);
        let c = ctx.bool_symbol("c");
        let a_plus_b = ctx.add(a, b);
        let b_plus_a = ctx.add(b, a_plus_b);
        let ite = ctx.bv_ite(c, b_plus_a, a);
        assert_eq!(free_symbols(&ctx, ite), [c, b, a]);
        let lit = ctx.one(4);
        assert!(free_symbols(&ctx, lit).is_empty());
    }

    #[test]
    fn free_symbols_of_shared_subexpressions() {
        let mut ctx = Context::default();
        let a = ctx.bv_symbol("a", 4);
        let b = ctx.bv_symbol("b", 4);
        // `a - b` appears twice, its symbols are reported once
        let diff = ctx.sub(a, b);
        let twice = ctx.add(diff, diff);
        let cmp = ctx.bv_equal(twice, b);
        assert_eq!(free_symbols(&ctx, cmp), [a, b]);
        assert_eq!(free_symbols(&ctx, a), [a]);
    }
}
