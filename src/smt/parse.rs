// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use baa::BitVecValue;
use easy_smt as smt;

/// Parses the value returned by a `get-value` call. Returns `None` if the response does not
/// look like a bit-vector or Boolean constant.
pub fn parse_smt_bit_vec(smt_ctx: &smt::Context, expr: smt::SExpr) -> Option<BitVecValue> {
    let data = smt_ctx.get(expr);
    match data {
        smt::SExprData::Atom(value) => smt_bit_vec_str_to_value(value),
        // unwraps expressions like: ((a true))
        smt::SExprData::List([inner]) => parse_smt_bit_vec(smt_ctx, *inner),
        // unwraps expressions like: (a true)
        smt::SExprData::List([_, value]) => parse_smt_bit_vec(smt_ctx, *value),
        _ => None,
    }
}

fn smt_bit_vec_str_to_value(a: &str) -> Option<BitVecValue> {
    if let Some(suffix) = a.strip_prefix("#b") {
        BitVecValue::from_bit_str(suffix).ok()
    } else if let Some(suffix) = a.strip_prefix("#x") {
        BitVecValue::from_hex_str(suffix).ok()
    } else if a == "true" {
        Some(BitVecValue::tru())
    } else if a == "false" {
        Some(BitVecValue::fals())
    } else {
        // decimal values carry no width information
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baa::*;
    use easy_smt::*;

    #[test]
    fn test_yices2_result_parsing() {
        // yices will produce responses like this for a `get-value` call:
        // ((n9@0 true))
        let ctx = ContextBuilder::new().build().unwrap();
        let r0 = ctx.list(vec![ctx.list(vec![ctx.atom("n9@0"), ctx.true_()])]);
        let val0 = parse_smt_bit_vec(&ctx, r0).unwrap();
        assert_eq!(val0.to_u64().unwrap(), 1);
        assert_eq!(val0.width(), 1);
        assert!(val0.is_tru());
    }

    #[test]
    fn test_bit_vector_constants() {
        let ctx = ContextBuilder::new().build().unwrap();
        let bin = ctx.list(vec![ctx.atom("k"), ctx.binary(4, 0b1010)]);
        let val = parse_smt_bit_vec(&ctx, bin).unwrap();
        assert_eq!(val.width(), 4);
        assert_eq!(val.to_u64().unwrap(), 0b1010);

        let hex = ctx.atom("#xbe");
        let val = parse_smt_bit_vec(&ctx, hex).unwrap();
        assert_eq!(val.width(), 8);
        assert_eq!(val.to_u64().unwrap(), 0xbe);

        assert!(parse_smt_bit_vec(&ctx, ctx.atom("17")).is_none());
    }
}
