// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>
mod context;
mod eval;
mod expr;
mod serialize;
mod transform;
mod traversal;
mod type_check;

pub use context::{bv_value_fits_width, Context, ExprRef, StringRef};
pub use eval::{eval_bv_expr, try_eval_bv_expr, GetExprValue};
pub use expr::{BVLiteralInt, Expr, ForEachChild, Type, WidthInt, MAX_LITERAL_WIDTH};
pub use serialize::SerializableIrNode;
pub use transform::{do_transform_expr, substitute};
pub use traversal::free_symbols;
pub use type_check::{type_check_deep, TypeCheck, TypeCheckError};
