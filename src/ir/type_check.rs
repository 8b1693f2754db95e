// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use super::{Context, Expr, ExprRef, ForEachChild, Type, WidthInt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckError {
    msg: String,
}

impl TypeCheckError {
    pub fn get_msg(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for TypeCheckError {}

impl Type {
    fn expect_bv(&self, _op: &str) -> Result<WidthInt, TypeCheckError> {
        match self {
            Type::BV(width) => Ok(*width),
        }
    }
    fn expect_bv_of(&self, expected_width: WidthInt, op: &str) -> Result<Type, TypeCheckError> {
        match self {
            Type::BV(width) if *width == expected_width => Ok(*self),
            other => Err(TypeCheckError {
                msg: format!("{op} only works on bit-vectors of size {expected_width}, not {other}."),
            }),
        }
    }
}

fn expect_same_width_bvs(
    ctx: &Context,
    op: &str,
    a: ExprRef,
    b: ExprRef,
) -> Result<Type, TypeCheckError> {
    let a_width = a.get_type(ctx).expect_bv(op)?;
    let b_width = b.get_type(ctx).expect_bv(op)?;
    if a_width == b_width {
        Ok(Type::BV(a_width))
    } else {
        Err(TypeCheckError {
            msg: format!(
                "{op} requires two bit-vectors of the same width, not {a_width} and {b_width}"
            ),
        })
    }
}

fn expect_same_width_bvs_of(
    ctx: &Context,
    expected_width: WidthInt,
    op: &str,
    a: ExprRef,
    b: ExprRef,
) -> Result<Type, TypeCheckError> {
    expect_same_width_bvs(ctx, op, a, b)?.expect_bv_of(expected_width, op)
}

pub trait TypeCheck {
    /// Type check expression node. Does not recurse to lower nodes.
    fn type_check(&self, ctx: &Context) -> Result<Type, TypeCheckError>;
    /// gets type as fast as possible without performing any checks
    fn get_type(&self, ctx: &Context) -> Type;
    fn get_bv_type(&self, ctx: &Context) -> Option<WidthInt> {
        self.get_type(ctx).get_bit_vector_width()
    }
}

impl TypeCheck for Expr {
    fn type_check(&self, ctx: &Context) -> Result<Type, TypeCheckError> {
        match *self {
            Expr::BVSymbol { name: _, width } => Ok(Type::BV(width)),
            Expr::BVLiteral { value: _, width } => Ok(Type::BV(width)),
            Expr::BVZeroExt { e, by, width } => {
                e.get_type(ctx).expect_bv_of(width - by, "zero extend")?;
                Ok(Type::BV(width))
            }
            Expr::BVSlice { e, hi, lo } => {
                let e_width = e.get_type(ctx).expect_bv("slicing")?;
                if hi >= e_width {
                    Err(TypeCheckError{msg: format!("Bit-slice upper index must be smaller than the width {e_width}. Not: {hi}")})
                } else if hi < lo {
                    Err(TypeCheckError{msg: format!("Bit-slice upper index must be larger or the same as the lower index. But {hi} < {lo}")})
                } else {
                    Ok(Type::BV(hi - lo + 1))
                }
            }
            Expr::BVNot(e, width) => e.get_type(ctx).expect_bv_of(width, "not"),
            Expr::BVNegate(e, width) => e.get_type(ctx).expect_bv_of(width, "negate"),
            Expr::BVEqual(a, b) => {
                expect_same_width_bvs(ctx, "bit-vector equality", a, b)?;
                Ok(Type::BOOL)
            }
            Expr::BVImplies(a, b) => {
                a.get_type(ctx).expect_bv_of(1, "implies")?;
                b.get_type(ctx).expect_bv_of(1, "implies")?;
                Ok(Type::BOOL)
            }
            Expr::BVGreater(a, b) => {
                expect_same_width_bvs(ctx, "greater", a, b)?;
                Ok(Type::BOOL)
            }
            Expr::BVGreaterSigned(a, b) => {
                expect_same_width_bvs(ctx, "greater signed", a, b)?;
                Ok(Type::BOOL)
            }
            Expr::BVGreaterEqual(a, b) => {
                expect_same_width_bvs(ctx, "greater or equals", a, b)?;
                Ok(Type::BOOL)
            }
            Expr::BVGreaterEqualSigned(a, b) => {
                expect_same_width_bvs(ctx, "greater or equals signed", a, b)?;
                Ok(Type::BOOL)
            }
            Expr::BVConcat(a, b, width) => {
                let a_width = a.get_type(ctx).expect_bv("concat")?;
                let b_width = b.get_type(ctx).expect_bv("concat")?;
                let tpe = Type::BV(a_width + b_width);
                tpe.expect_bv_of(width, "concat")?;
                Ok(tpe)
            }
            Expr::BVAnd(a, b, width) => expect_same_width_bvs_of(ctx, width, "and", a, b),
            Expr::BVOr(a, b, width) => expect_same_width_bvs_of(ctx, width, "or", a, b),
            Expr::BVXor(a, b, width) => expect_same_width_bvs_of(ctx, width, "xor", a, b),
            Expr::BVShiftLeft(a, b, width) => {
                expect_same_width_bvs_of(ctx, width, "shift left", a, b)
            }
            Expr::BVShiftRight(a, b, width) => {
                expect_same_width_bvs_of(ctx, width, "shift right", a, b)
            }
            Expr::BVAdd(a, b, width) => expect_same_width_bvs_of(ctx, width, "add", a, b),
            Expr::BVMul(a, b, width) => expect_same_width_bvs_of(ctx, width, "mul", a, b),
            Expr::BVSub(a, b, width) => expect_same_width_bvs_of(ctx, width, "subtraction", a, b),
            Expr::BVIte { cond, tru, fals } => {
                cond.get_type(ctx).expect_bv_of(1, "ite condition")?;
                expect_same_width_bvs(ctx, "ite branches", tru, fals)
            }
        }
    }

    fn get_type(&self, ctx: &Context) -> Type {
        match *self {
            Expr::BVSymbol { name: _, width } => Type::BV(width),
            Expr::BVLiteral { value: _, width } => Type::BV(width),
            Expr::BVZeroExt { width, .. } => Type::BV(width),
            Expr::BVSlice { e: _, hi, lo } => Type::BV(hi - lo + 1),
            Expr::BVNot(_, width) => Type::BV(width),
            Expr::BVNegate(_, width) => Type::BV(width),
            Expr::BVEqual(_, _)
            | Expr::BVImplies(_, _)
            | Expr::BVGreater(_, _)
            | Expr::BVGreaterSigned(_, _)
            | Expr::BVGreaterEqual(_, _)
            | Expr::BVGreaterEqualSigned(_, _) => Type::BOOL,
            Expr::BVConcat(_, _, width)
            | Expr::BVAnd(_, _, width)
            | Expr::BVOr(_, _, width)
            | Expr::BVXor(_, _, width)
            | Expr::BVShiftLeft(_, _, width)
            | Expr::BVShiftRight(_, _, width)
            | Expr::BVAdd(_, _, width)
            | Expr::BVMul(_, _, width)
            | Expr::BVSub(_, _, width) => Type::BV(width),
            Expr::BVIte {
                cond: _,
                tru: _,
                fals,
            } => {
                // Here we need to recourse because adding a `width` field to BVIte
                // would have blown up the size of `Expr`.
                // We assume that the `fals` branch is less likely to be a nested ITE.
                fals.get_type(ctx)
            }
        }
    }
}

impl TypeCheck for ExprRef {
    fn type_check(&self, ctx: &Context) -> Result<Type, TypeCheckError> {
        ctx.get(*self).type_check(ctx)
    }

    fn get_type(&self, ctx: &Context) -> Type {
        ctx.get(*self).get_type(ctx)
    }
}

/// Type checks `expr` and all of its sub-expressions.
pub fn type_check_deep(ctx: &Context, expr: ExprRef) -> Result<Type, TypeCheckError> {
    let mut todo = vec![expr];
    let mut checked = std::collections::HashSet::new();
    while let Some(e) = todo.pop() {
        if !checked.insert(e) {
            continue;
        }
        ctx.get(e).for_each_child(|c| todo.push(*c));
        e.type_check(ctx)?;
    }
    expr.type_check(ctx)
}
