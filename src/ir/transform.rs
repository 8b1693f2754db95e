// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use crate::ir::*;
use std::collections::HashMap;

/// Replaces every occurrence of a `from` expression with the corresponding `to` expression.
/// Only nodes on a path to a replaced expression are re-created, all other nodes are shared
/// with the original expression.
pub fn substitute(ctx: &mut Context, expr: ExprRef, replacements: &[(ExprRef, ExprRef)]) -> ExprRef {
    if replacements.is_empty() {
        return expr;
    }
    let lookup: HashMap<ExprRef, ExprRef> = replacements.iter().cloned().collect();
    let transformed = do_transform_expr(ctx, vec![expr], |_ctx, e, _children| {
        lookup.get(&e).cloned()
    });
    transformed[&expr]
}

/// Rewrites expressions bottom up. `foo` is called once per sub-expression after all of its
/// children have been transformed and may return a replacement. The returned map contains
/// the new version of every visited expression.
pub fn do_transform_expr(
    ctx: &mut Context,
    mut todo: Vec<ExprRef>,
    mut foo: impl FnMut(&mut Context, ExprRef, &[ExprRef]) -> Option<ExprRef>,
) -> HashMap<ExprRef, ExprRef> {
    let mut transformed = HashMap::new();
    let mut children = Vec::with_capacity(4);

    while let Some(expr_ref) = todo.pop() {
        if transformed.contains_key(&expr_ref) {
            continue; // already done, might happen with shared sub-expressions
        }
        // check to see if we translated all the children
        children.clear();
        let mut children_changed = false; // track whether any of the children changed
        let mut all_transformed = true; // tracks whether all children have been transformed or if there is more work to do
        ctx.get(expr_ref).for_each_child(|c| {
            match transformed.get(c) {
                Some(&new_child_expr) => {
                    if new_child_expr != *c {
                        children_changed = true; // child changed
                    }
                    children.push(new_child_expr);
                }
                None => {
                    if all_transformed {
                        todo.push(expr_ref);
                    }
                    all_transformed = false;
                    todo.push(*c);
                }
            }
        });
        if !all_transformed {
            continue;
        }

        // call out to the transform
        let foo_res = (foo)(ctx, expr_ref, &children);
        let new_expr_ref = match foo_res {
            Some(e) => e,
            None => {
                if children_changed {
                    update_expr_children(ctx, expr_ref, &children)
                } else {
                    // if no children changed and the transform does not want to do changes,
                    // we can just keep the old expression
                    expr_ref
                }
            }
        };
        // remember the transformed version
        transformed.insert(expr_ref, new_expr_ref);
    }
    transformed
}

fn update_expr_children(ctx: &mut Context, expr_ref: ExprRef, children: &[ExprRef]) -> ExprRef {
    let new_expr = match (ctx.get(expr_ref).clone(), children) {
        (Expr::BVSymbol { .. }, _) | (Expr::BVLiteral { .. }, _) => {
            unreachable!("nullary expressions have no children to update")
        }
        (Expr::BVZeroExt { by, width, .. }, [e]) => Expr::BVZeroExt { e: *e, by, width },
        (Expr::BVSlice { hi, lo, .. }, [e]) => Expr::BVSlice { e: *e, hi, lo },
        (Expr::BVNot(_, width), [e]) => Expr::BVNot(*e, width),
        (Expr::BVNegate(_, width), [e]) => Expr::BVNegate(*e, width),
        (Expr::BVEqual(_, _), [a, b]) => Expr::BVEqual(*a, *b),
        (Expr::BVImplies(_, _), [a, b]) => Expr::BVImplies(*a, *b),
        (Expr::BVGreater(_, _), [a, b]) => Expr::BVGreater(*a, *b),
        (Expr::BVGreaterSigned(_, _), [a, b]) => Expr::BVGreaterSigned(*a, *b),
        (Expr::BVGreaterEqual(_, _), [a, b]) => Expr::BVGreaterEqual(*a, *b),
        (Expr::BVGreaterEqualSigned(_, _), [a, b]) => Expr::BVGreaterEqualSigned(*a, *b),
        (Expr::BVConcat(_, _, w), [a, b]) => Expr::BVConcat(*a, *b, w),
        (Expr::BVAnd(_, _, w), [a, b]) => Expr::BVAnd(*a, *b, w),
        (Expr::BVOr(_, _, w), [a, b]) => Expr::BVOr(*a, *b, w),
        (Expr::BVXor(_, _, w), [a, b]) => Expr::BVXor(*a, *b, w),
        (Expr::BVShiftLeft(_, _, w), [a, b]) => Expr::BVShiftLeft(*a, *b, w),
        (Expr::BVShiftRight(_, _, w), [a, b]) => Expr::BVShiftRight(*a, *b, w),
        (Expr::BVAdd(_, _, w), [a, b]) => Expr::BVAdd(*a, *b, w),
        (Expr::BVMul(_, _, w), [a, b]) => Expr::BVMul(*a, *b, w),
        (Expr::BVSub(_, _, w), [a, b]) => Expr::BVSub(*a, *b, w),
        (Expr::BVIte { .. }, [cond, tru, fals]) => Expr::BVIte {
            cond: *cond,
            tru: *tru,
            fals: *fals,
        },
        (other, _) => panic!(
            "wrong number of children ({}) for {other:?}",
            children.len()
        ),
    };
    ctx.add_expr(new_expr)
}
