// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

// web sources on expression tree evaluation:
// https://www.geeksforgeeks.org/evaluation-of-expression-tree/ (recursive, C++)
// https://medium.com/javarevisited/evaluation-of-binary-expression-tree-6768db3be82f (recursive, Java)
//

use crate::ir::{Context, Expr, ExprRef, ForEachChild, TypeCheck};
use baa::{BitVecOps, BitVecValue};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Returns a value for an expression if it is available.
pub trait GetExprValue {
    fn get_bv(&self, ctx: &Context, symbol: ExprRef) -> Option<BitVecValue>;
}

impl GetExprValue for HashMap<ExprRef, BitVecValue> {
    fn get_bv(&self, _ctx: &Context, symbol: ExprRef) -> Option<BitVecValue> {
        self.get(&symbol).cloned()
    }
}

impl GetExprValue for [(ExprRef, BitVecValue)] {
    fn get_bv(&self, _ctx: &Context, symbol: ExprRef) -> Option<BitVecValue> {
        self.iter()
            .find(|(e, _v)| *e == symbol)
            .map(|(_e, v)| v.clone())
    }
}

type BitVecStack = SmallVec<[BitVecValue; 4]>;

#[inline]
fn un_op(stack: &mut BitVecStack, op: impl Fn(BitVecValue) -> BitVecValue) {
    let e = stack.pop().unwrap_or_else(|| panic!("Stack is empty!"));
    let res = op(e);
    stack.push(res);
}

#[inline]
fn bin_op(stack: &mut BitVecStack, op: impl Fn(BitVecValue, BitVecValue) -> BitVecValue) {
    let a = stack.pop().unwrap_or_else(|| panic!("Stack is empty!"));
    let b = stack.pop().unwrap_or_else(|| panic!("Stack is empty!"));
    let res = op(a, b);
    stack.push(res);
}

/// Evaluates `expr` under the symbol values provided by `symbols`.
/// Panics if a symbol without value is encountered, use [`try_eval_bv_expr`] if the
/// assignment might be incomplete.
pub fn eval_bv_expr(
    ctx: &Context,
    symbols: &(impl GetExprValue + ?Sized),
    expr: ExprRef,
) -> BitVecValue {
    match try_eval_bv_expr(ctx, symbols, expr) {
        Ok(value) => value,
        Err(missing) => panic!(
            "No value found for symbol: {} : {}",
            missing.get_symbol_name(ctx).unwrap(),
            missing.get_type(ctx)
        ),
    }
}

/// Evaluates `expr`, returns the first symbol without a value as error.
pub fn try_eval_bv_expr(
    ctx: &Context,
    symbols: &(impl GetExprValue + ?Sized),
    expr: ExprRef,
) -> Result<BitVecValue, ExprRef> {
    let mut stack = eval_expr_internal(ctx, symbols, expr)?;
    debug_assert_eq!(stack.len(), 1);
    Ok(stack.pop().unwrap())
}

fn eval_expr_internal(
    ctx: &Context,
    values: &(impl GetExprValue + ?Sized),
    expr: ExprRef,
) -> Result<BitVecStack, ExprRef> {
    let mut bv_stack: BitVecStack = SmallVec::with_capacity(4);
    let mut todo: SmallVec<[(ExprRef, bool); 4]> = SmallVec::with_capacity(4);

    todo.push((expr, false));
    while let Some((e, args_available)) = todo.pop() {
        let expr = ctx.get(e);

        // Check if there are children that we need to compute first.
        if !args_available {
            // Check to see if a value is already provided. In that case, we do not
            // need to evaluate the children, we just directly use the value.
            if let Some(value) = values.get_bv(ctx, e) {
                bv_stack.push(value);
                continue; // done
            }

            // otherwise, we check if there are child expressions to evaluate
            let mut has_child = false;
            expr.for_each_child(|c| {
                if !has_child {
                    has_child = true;
                    todo.push((e, true));
                }
                todo.push((*c, false));
            });
            // we need to process the children first
            if has_child {
                continue;
            }
        }

        // Otherwise, all arguments are available on the stack for us to use.
        match expr {
            // nullary
            Expr::BVSymbol { .. } => return Err(e),
            Expr::BVLiteral { value, width } => {
                bv_stack.push(BitVecValue::from_u64(*value, *width))
            }
            // unary
            Expr::BVZeroExt { by, .. } => un_op(&mut bv_stack, |e| e.zero_extend(*by)),
            Expr::BVSlice { hi, lo, .. } => un_op(&mut bv_stack, |e| e.slice(*hi, *lo)),
            Expr::BVNot(_, _) => un_op(&mut bv_stack, |e| e.not()),
            Expr::BVNegate(_, _) => un_op(&mut bv_stack, |e| e.negate()),
            // binary
            Expr::BVEqual(_, _) => bin_op(&mut bv_stack, |a, b| a.is_equal(&b).into()),
            Expr::BVImplies(_, _) => bin_op(&mut bv_stack, |a, b| a.not().or(&b)),
            Expr::BVGreater(_, _) => bin_op(&mut bv_stack, |a, b| a.is_greater(&b).into()),
            Expr::BVGreaterSigned(_, _) => {
                bin_op(&mut bv_stack, |a, b| a.is_greater_signed(&b).into())
            }
            Expr::BVGreaterEqual(_, _) => {
                bin_op(&mut bv_stack, |a, b| a.is_greater_or_equal(&b).into())
            }
            Expr::BVGreaterEqualSigned(_, _) => bin_op(&mut bv_stack, |a, b| {
                a.is_greater_or_equal_signed(&b).into()
            }),
            Expr::BVConcat(_, _, _) => bin_op(&mut bv_stack, |a, b| a.concat(&b)),
            // binary arithmetic
            Expr::BVAnd(_, _, _) => bin_op(&mut bv_stack, |a, b| a.and(&b)),
            Expr::BVOr(_, _, _) => bin_op(&mut bv_stack, |a, b| a.or(&b)),
            Expr::BVXor(_, _, _) => bin_op(&mut bv_stack, |a, b| a.xor(&b)),
            Expr::BVShiftLeft(_, _, _) => bin_op(&mut bv_stack, |a, b| a.shift_left(&b)),
            Expr::BVShiftRight(_, _, _) => bin_op(&mut bv_stack, |a, b| a.shift_right(&b)),
            Expr::BVAdd(_, _, _) => bin_op(&mut bv_stack, |a, b| a.add(&b)),
            Expr::BVMul(_, _, _) => bin_op(&mut bv_stack, |a, b| a.mul(&b)),
            Expr::BVSub(_, _, _) => bin_op(&mut bv_stack, |a, b| a.sub(&b)),
            Expr::BVIte { .. } => {
                let cond = bv_stack.pop().unwrap().is_tru();
                if cond {
                    let tru = bv_stack.pop().unwrap();
                    bv_stack.pop().unwrap();
                    bv_stack.push(tru);
                } else {
                    bv_stack.pop().unwrap(); // just discard tru
                }
            }
        }
    }

    debug_assert_eq!(bv_stack.len(), 1);
    Ok(bv_stack)
}
