// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::expr::*;
use crate::ir::TypeCheck;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;

#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct StringRef(NonZeroU32);

impl Debug for StringRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringRef({})", self.index())
    }
}

impl StringRef {
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ExprRef(NonZeroU32);

impl Debug for ExprRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // we need a custom implementation in order to show the zero based index
        write!(f, "ExprRef({})", self.index())
    }
}

impl ExprRef {
    pub(crate) fn from_index(index: usize) -> Self {
        ExprRef(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    pub(crate) fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Context which is used to create all SMT expressions. Expressions are interned such that
/// reference equivalence implies structural equivalence.
///
/// Every variable and formula handed to a synthesis run needs to come from the same context.
#[derive(Clone, Default)]
pub struct Context {
    strings: indexmap::IndexSet<String>,
    exprs: indexmap::IndexSet<Expr>,
}

/// Adding and removing nodes.
impl Context {
    pub fn get(&self, reference: ExprRef) -> &Expr {
        self.exprs
            .get_index(reference.index())
            .expect("Invalid ExprRef!")
    }

    pub(crate) fn add_expr(&mut self, value: Expr) -> ExprRef {
        let (index, _) = self.exprs.insert_full(value);
        ExprRef::from_index(index)
    }

    pub fn get_str(&self, reference: StringRef) -> &str {
        self.strings
            .get_index(reference.index())
            .expect("Invalid StringRef!")
    }

    pub fn string(&mut self, value: std::borrow::Cow<str>) -> StringRef {
        if let Some(index) = self.strings.get_index_of(value.as_ref()) {
            StringRef::from_index(index)
        } else {
            let (index, _) = self.strings.insert_full(value.into_owned());
            StringRef::from_index(index)
        }
    }

    /// Number of interned expressions.
    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }
}

/// Convenience methods to construct IR nodes.
impl Context {
    // helper functions to construct expressions
    pub fn bv_symbol(&mut self, name: &str, width: WidthInt) -> ExprRef {
        let name_ref = self.string(name.into());
        self.symbol(name_ref, Type::BV(width))
    }
    pub fn bool_symbol(&mut self, name: &str) -> ExprRef {
        self.bv_symbol(name, 1)
    }
    pub fn symbol(&mut self, name: StringRef, tpe: Type) -> ExprRef {
        assert_ne!(tpe, Type::BV(0), "0-bit bitvectors are not allowed");
        let width = tpe.get_bit_vector_width().unwrap();
        assert!(
            width <= MAX_LITERAL_WIDTH,
            "bv<{width}> symbols are not supported, values are limited to {MAX_LITERAL_WIDTH} bits"
        );
        self.add_expr(Expr::symbol(name, tpe))
    }
    pub fn bv_lit(&mut self, value: BVLiteralInt, width: WidthInt) -> ExprRef {
        assert!(width > 0, "0-bit bitvectors are not allowed");
        assert!(
            bv_value_fits_width(value, width),
            "{value} does not fit into {width} bits"
        );
        self.add_expr(Expr::BVLiteral { value, width })
    }
    pub fn zero(&mut self, width: WidthInt) -> ExprRef {
        self.bv_lit(0, width)
    }
    pub fn mask(&mut self, width: WidthInt) -> ExprRef {
        let value = BVLiteralInt::MAX >> (BVLiteralInt::BITS - width);
        self.bv_lit(value, width)
    }
    pub fn one(&mut self, width: WidthInt) -> ExprRef {
        self.bv_lit(1, width)
    }
    pub fn tru(&mut self) -> ExprRef {
        self.one(1)
    }
    pub fn fals(&mut self) -> ExprRef {
        self.zero(1)
    }
    pub fn bv_equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVEqual(a, b))
    }
    pub fn bv_ite(&mut self, cond: ExprRef, tru: ExprRef, fals: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVIte { cond, tru, fals })
    }
    pub fn implies(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVImplies(a, b))
    }
    pub fn greater_signed(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVGreaterSigned(a, b))
    }
    pub fn greater(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVGreater(a, b))
    }
    pub fn greater_or_equal_signed(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVGreaterEqualSigned(a, b))
    }
    pub fn greater_or_equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVGreaterEqual(a, b))
    }
    pub fn not(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVNot(e, e.get_bv_type(self).unwrap()))
    }
    pub fn negate(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVNegate(e, e.get_bv_type(self).unwrap()))
    }
    pub fn and(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVAnd(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn or(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVOr(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn xor(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVXor(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn shift_left(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVShiftLeft(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn shift_right(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVShiftRight(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn add(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVAdd(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn sub(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVSub(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn mul(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::BVMul(a, b, b.get_bv_type(self).unwrap()))
    }
    pub fn concat(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        let width = a.get_bv_type(self).unwrap() + b.get_bv_type(self).unwrap();
        self.add_expr(Expr::BVConcat(a, b, width))
    }
    pub fn slice(&mut self, e: ExprRef, hi: WidthInt, lo: WidthInt) -> ExprRef {
        if lo == 0 && hi + 1 == e.get_bv_type(self).unwrap() {
            e
        } else {
            assert!(hi >= lo, "{hi} < {lo} ... not allowed!");
            self.add_expr(Expr::BVSlice { e, hi, lo })
        }
    }
    pub fn zero_extend(&mut self, e: ExprRef, by: WidthInt) -> ExprRef {
        if by == 0 {
            e
        } else {
            let width = e.get_bv_type(self).unwrap() + by;
            self.add_expr(Expr::BVZeroExt { e, by, width })
        }
    }

    /// Conjunction of all boolean expressions. The empty conjunction is `true`.
    pub fn and_many(&mut self, exprs: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        let mut exprs = exprs.into_iter();
        match exprs.next() {
            None => self.tru(),
            Some(first) => exprs.fold(first, |acc, e| self.and(acc, e)),
        }
    }
}

pub fn bv_value_fits_width(value: BVLiteralInt, width: WidthInt) -> bool {
    let bits_required = BVLiteralInt::BITS - value.leading_zeros();
    width >= bits_required
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_ids() {
        let mut ctx = Context::default();
        let str_id0 = ctx.string("a".into());
        let id0 = ctx.add_expr(Expr::BVSymbol {
            name: str_id0,
            width: 1,
        });
        assert_eq!(id0.0.get(), 1, "ids start at one (for now)");
        let id0_b = ctx.add_expr(Expr::BVSymbol {
            name: str_id0,
            width: 1,
        });
        assert_eq!(id0.0, id0_b.0, "ids should be interned!");
        let id1 = ctx.add_expr(Expr::BVSymbol {
            name: str_id0,
            width: 2,
        });
        assert_eq!(id0.0.get() + 1, id1.0.get(), "ids should increment!");
    }

    #[test]
    fn symbols_are_interned_by_name_and_type() {
        let mut ctx = Context::default();
        let a = ctx.bv_symbol("a", 8);
        let name = ctx.string("a".into());
        assert_eq!(ctx.symbol(name, Type::BV(8)), a);
        assert_ne!(ctx.symbol(name, Type::BOOL), a);
        assert_eq!(a.get_symbol_name(&ctx), Some("a"));
    }

    #[test]
    fn literals() {
        let mut ctx = Context::default();
        let four_ones = ctx.mask(4);
        assert_eq!(ctx.get(four_ones), &Expr::BVLiteral { value: 15, width: 4 });
        let full = ctx.mask(64);
        assert_eq!(
            ctx.get(full),
            &Expr::BVLiteral {
                value: u64::MAX,
                width: 64
            }
        );
        assert!(bv_value_fits_width(3, 2));
        assert!(!bv_value_fits_width(4, 2));
    }

    #[test]
    #[should_panic]
    fn literal_needs_to_fit() {
        let mut ctx = Context::default();
        ctx.bv_lit(16, 4);
    }

    #[test]
    fn empty_conjunction_is_true() {
        let mut ctx = Context::default();
        let tru = ctx.tru();
        assert_eq!(ctx.and_many([]), tru);
        let a = ctx.bool_symbol("a");
        assert_eq!(ctx.and_many([a]), a);
        let b = ctx.bool_symbol("b");
        let a_and_b = ctx.and(a, b);
        assert_eq!(ctx.and_many([a, b]), a_and_b);
    }
}
