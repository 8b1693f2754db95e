// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{Context, ExprRef, StringRef};

/// This type restricts the maximum width that a bit-vector type is allowed to have in our IR.
pub type WidthInt = u32;

/// This restricts the maximum value that a bit-vector literal can carry.
pub type BVLiteralInt = u64;

/// Widest bit-vector that we can represent as a literal.
pub const MAX_LITERAL_WIDTH: WidthInt = BVLiteralInt::BITS;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
/// Represents a SMT bit-vector expression. Booleans are bit-vectors of width one.
pub enum Expr {
    // nullary
    BVSymbol {
        name: StringRef,
        width: WidthInt,
    },
    BVLiteral {
        value: BVLiteralInt,
        width: WidthInt,
    },
    // unary operations
    BVZeroExt {
        e: ExprRef,
        by: WidthInt,
        width: WidthInt,
    },
    BVSlice {
        e: ExprRef,
        hi: WidthInt,
        lo: WidthInt,
        // no `width` since it is easy to calculate from `hi` and `lo` without looking at `e`
    },
    BVNot(ExprRef, WidthInt),
    BVNegate(ExprRef, WidthInt),
    // binary operations
    BVEqual(ExprRef, ExprRef),
    BVImplies(ExprRef, ExprRef),
    BVGreater(ExprRef, ExprRef),
    BVGreaterSigned(ExprRef, ExprRef),
    BVGreaterEqual(ExprRef, ExprRef),
    BVGreaterEqualSigned(ExprRef, ExprRef),
    BVConcat(ExprRef, ExprRef, WidthInt),
    // binary arithmetic
    BVAnd(ExprRef, ExprRef, WidthInt),
    BVOr(ExprRef, ExprRef, WidthInt),
    BVXor(ExprRef, ExprRef, WidthInt),
    BVShiftLeft(ExprRef, ExprRef, WidthInt),
    BVShiftRight(ExprRef, ExprRef, WidthInt),
    BVAdd(ExprRef, ExprRef, WidthInt),
    BVMul(ExprRef, ExprRef, WidthInt),
    BVSub(ExprRef, ExprRef, WidthInt),
    // ternary op
    BVIte {
        cond: ExprRef,
        tru: ExprRef,
        fals: ExprRef,
    },
}

impl Expr {
    pub fn symbol(name: StringRef, tpe: Type) -> Expr {
        match tpe {
            Type::BV(width) => Expr::BVSymbol { name, width },
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::BVSymbol { .. })
    }

    pub fn is_bv_lit(&self) -> bool {
        matches!(self, Expr::BVLiteral { .. })
    }

    pub fn get_bv_lit(&self) -> Option<(BVLiteralInt, WidthInt)> {
        match self {
            Expr::BVLiteral { value, width } => Some((*value, *width)),
            _ => None,
        }
    }

    pub fn get_symbol_name_ref(&self) -> Option<StringRef> {
        match self {
            Expr::BVSymbol { name, .. } => Some(*name),
            _ => None,
        }
    }

    pub fn get_symbol_name<'a>(&self, ctx: &'a Context) -> Option<&'a str> {
        self.get_symbol_name_ref().map(|r| ctx.get_str(r))
    }
}

impl ExprRef {
    pub fn is_symbol(&self, ctx: &Context) -> bool {
        ctx.get(*self).is_symbol()
    }

    pub fn is_bv_lit(&self, ctx: &Context) -> bool {
        ctx.get(*self).is_bv_lit()
    }

    pub fn get_symbol_name_ref(&self, ctx: &Context) -> Option<StringRef> {
        ctx.get(*self).get_symbol_name_ref()
    }

    pub fn get_symbol_name<'a>(&self, ctx: &'a Context) -> Option<&'a str> {
        ctx.get(*self).get_symbol_name(ctx)
    }
}

pub trait ForEachChild<T: Clone> {
    fn for_each_child(&self, visitor: impl FnMut(&T));
    fn collect_children(&self, children: &mut Vec<T>) {
        self.for_each_child(|c: &T| {
            children.push(c.clone());
        });
    }
    fn num_children(&self) -> usize;
}

impl ForEachChild<ExprRef> for Expr {
    fn for_each_child(&self, mut visitor: impl FnMut(&ExprRef)) {
        match self {
            Expr::BVSymbol { .. } => {}  // no children
            Expr::BVLiteral { .. } => {} // no children
            Expr::BVZeroExt { e, .. } | Expr::BVSlice { e, .. } => {
                (visitor)(e);
            }
            Expr::BVNot(e, _) | Expr::BVNegate(e, _) => {
                (visitor)(e);
            }
            Expr::BVEqual(a, b)
            | Expr::BVImplies(a, b)
            | Expr::BVGreater(a, b)
            | Expr::BVGreaterSigned(a, b)
            | Expr::BVGreaterEqual(a, b)
            | Expr::BVGreaterEqualSigned(a, b) => {
                (visitor)(a);
                (visitor)(b);
            }
            Expr::BVConcat(a, b, _)
            | Expr::BVAnd(a, b, _)
            | Expr::BVOr(a, b, _)
            | Expr::BVXor(a, b, _)
            | Expr::BVShiftLeft(a, b, _)
            | Expr::BVShiftRight(a, b, _)
            | Expr::BVAdd(a, b, _)
            | Expr::BVMul(a, b, _)
            | Expr::BVSub(a, b, _) => {
                (visitor)(a);
                (visitor)(b);
            }
            Expr::BVIte { cond, tru, fals } => {
                (visitor)(cond);
                (visitor)(tru);
                (visitor)(fals);
            }
        }
    }

    fn num_children(&self) -> usize {
        let mut count = 0;
        self.for_each_child(|_| count += 1);
        count
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Type {
    BV(WidthInt),
}

impl Type {
    pub const BOOL: Type = Type::BV(1);

    pub fn is_bit_vector(&self) -> bool {
        true
    }

    pub fn is_bool(&self) -> bool {
        match &self {
            Type::BV(width) => *width == 1,
        }
    }

    pub fn get_bit_vector_width(&self) -> Option<WidthInt> {
        match &self {
            Type::BV(width) => Some(*width),
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Type::BV(width) => write!(f, "bv<{width}>"),
        }
    }
}
