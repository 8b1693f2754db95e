// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use super::{Context, Expr, ExprRef, Type};
use std::io::Write;

pub trait SerializableIrNode {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()>;
    fn serialize_to_str(&self, ctx: &Context) -> String {
        let mut buf = Vec::new();
        self.serialize(ctx, &mut buf)
            .expect("Failed to write to string!");
        String::from_utf8(buf).expect("Failed to read string we wrote!")
    }
}

impl SerializableIrNode for Expr {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        serialize_expr(self, ctx, writer)
    }
}

impl SerializableIrNode for ExprRef {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        ctx.get(*self).serialize(ctx, writer)
    }
}

impl SerializableIrNode for Type {
    fn serialize<W: Write>(&self, _ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{}", self)
    }
}

fn serialize_expr<W: Write>(expr: &Expr, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
    match expr {
        Expr::BVSymbol { name, .. } => write!(writer, "{}", ctx.get_str(*name)),
        Expr::BVLiteral { value, width } => {
            if *width <= 8 {
                write!(writer, "{width}'b{value:0w$b}", w = *width as usize)
            } else {
                write!(writer, "{width}'x{value:x}")
            }
        }
        Expr::BVZeroExt { e, by, .. } => {
            write!(writer, "zext(")?;
            e.serialize(ctx, writer)?;
            write!(writer, ", {by})")
        }
        Expr::BVSlice { e, hi, lo, .. } => {
            e.serialize(ctx, writer)?;
            if hi == lo {
                write!(writer, "[{hi}]")
            } else {
                write!(writer, "[{hi}:{lo}]")
            }
        }
        Expr::BVNot(e, _) => serialize_call(ctx, writer, "not", &[*e]),
        Expr::BVNegate(e, _) => serialize_call(ctx, writer, "neg", &[*e]),
        Expr::BVEqual(a, b) => serialize_call(ctx, writer, "eq", &[*a, *b]),
        Expr::BVImplies(a, b) => serialize_call(ctx, writer, "implies", &[*a, *b]),
        Expr::BVGreater(a, b) => serialize_call(ctx, writer, "ugt", &[*a, *b]),
        Expr::BVGreaterSigned(a, b) => serialize_call(ctx, writer, "sgt", &[*a, *b]),
        Expr::BVGreaterEqual(a, b) => serialize_call(ctx, writer, "ugte", &[*a, *b]),
        Expr::BVGreaterEqualSigned(a, b) => serialize_call(ctx, writer, "sgte", &[*a, *b]),
        Expr::BVConcat(a, b, _) => serialize_call(ctx, writer, "concat", &[*a, *b]),
        Expr::BVAnd(a, b, _) => serialize_call(ctx, writer, "and", &[*a, *b]),
        Expr::BVOr(a, b, _) => serialize_call(ctx, writer, "or", &[*a, *b]),
        Expr::BVXor(a, b, _) => serialize_call(ctx, writer, "xor", &[*a, *b]),
        Expr::BVShiftLeft(a, b, _) => {
            serialize_call(ctx, writer, "logical_shift_left", &[*a, *b])
        }
        Expr::BVShiftRight(a, b, _) => {
            serialize_call(ctx, writer, "logical_shift_right", &[*a, *b])
        }
        Expr::BVAdd(a, b, _) => serialize_call(ctx, writer, "add", &[*a, *b]),
        Expr::BVMul(a, b, _) => serialize_call(ctx, writer, "mul", &[*a, *b]),
        Expr::BVSub(a, b, _) => serialize_call(ctx, writer, "sub", &[*a, *b]),
        Expr::BVIte { cond, tru, fals } => {
            serialize_call(ctx, writer, "ite", &[*cond, *tru, *fals])
        }
    }
}

fn serialize_call<W: Write>(
    ctx: &Context,
    writer: &mut W,
    name: &str,
    args: &[ExprRef],
) -> std::io::Result<()> {
    write!(writer, "{name}(")?;
    for (ii, arg) in args.iter().enumerate() {
        if ii > 0 {
            write!(writer, ", ")?;
        }
        arg.serialize(ctx, writer)?;
    }
    write!(writer, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_serialization() {
        let mut ctx = Context::default();
        let test_expr = ctx.bv_symbol("test", 3);
        assert_eq!("test", test_expr.serialize_to_str(&ctx));
        let five = ctx.bv_lit(5, 4);
        assert_eq!("4'b0101", five.serialize_to_str(&ctx));
        let big = ctx.bv_lit(0xbeef, 16);
        assert_eq!("16'xbeef", big.serialize_to_str(&ctx));
    }

    #[test]
    fn nested_serialization() {
        let mut ctx = Context::default();
        let a = ctx.bool_symbol("a");
        let b = ctx.bool_symbol("b");
        let not_b = ctx.not(b);
        let expr = ctx.and(a, not_b);
        assert_eq!("and(a, not(b))", expr.serialize_to_str(&ctx));
        let x = ctx.bv_symbol("x", 8);
        let slice = ctx.slice(x, 3, 3);
        let ite = ctx.bv_ite(slice, a, b);
        assert_eq!("ite(x[3], a, b)", ite.serialize_to_str(&ctx));
    }
}
