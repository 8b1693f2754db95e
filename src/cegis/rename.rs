// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::*;

/// Determines the prefix of fresh symbols. Input and helper variables use different
/// prefixes so that their copies can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingPattern {
    Input,
    Helper,
}

impl NamingPattern {
    pub fn prefix(&self) -> &'static str {
        match self {
            NamingPattern::Input => "inp",
            NamingPattern::Helper => "hlp",
        }
    }

    /// `{prefix}_{position}_{iteration}`
    pub fn name(&self, position: usize, iteration: u64) -> String {
        format!("{}_{position}_{iteration}", self.prefix())
    }
}

/// Returns true iff `name` could be produced by one of our naming patterns.
pub fn is_reserved_name(name: &str) -> bool {
    [NamingPattern::Input, NamingPattern::Helper]
        .iter()
        .any(|p| match name.strip_prefix(p.prefix()) {
            Some(rest) => match rest.strip_prefix('_').and_then(|r| r.split_once('_')) {
                Some((position, iteration)) => is_number(position) && is_number(iteration),
                None => false,
            },
            None => false,
        })
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Creates the fresh copy of `var` for the given position and iteration. The copy has the
/// same type as `var`.
pub fn renamed_symbol(
    ctx: &mut Context,
    var: ExprRef,
    pattern: NamingPattern,
    position: usize,
    iteration: u64,
) -> ExprRef {
    let tpe = var.get_type(ctx);
    let name = ctx.string(pattern.name(position, iteration).into());
    ctx.symbol(name, tpe)
}

/// Replaces `vars[i]` with its fresh copy for `iteration` everywhere in `expr`.
pub fn substitute_vars(
    ctx: &mut Context,
    expr: ExprRef,
    vars: &[ExprRef],
    pattern: NamingPattern,
    iteration: u64,
) -> ExprRef {
    let replacements: Vec<_> = vars
        .iter()
        .enumerate()
        .map(|(position, var)| {
            (
                *var,
                renamed_symbol(ctx, *var, pattern, position, iteration),
            )
        })
        .collect();
    substitute(ctx, expr, &replacements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names() {
        assert!(is_reserved_name("inp_0_0"));
        assert!(is_reserved_name("hlp_12_345"));
        assert!(!is_reserved_name("inp_0"));
        assert!(!is_reserved_name("inp_a_0"));
        assert!(!is_reserved_name("inp_0_"));
        assert!(!is_reserved_name("input_0_0"));
        assert!(!is_reserved_name("x"));
    }

    #[test]
    fn renaming_is_deterministic() {
        let mut ctx = Context::default();
        let x = ctx.bv_symbol("x", 8);
        let y = ctx.bool_symbol("y");
        let one = ctx.one(8);
        let x_plus_one = ctx.add(x, one);
        let x_is_zero = ctx.bv_equal(x_plus_one, one);
        let expr = ctx.and(x_is_zero, y);

        let first = substitute_vars(&mut ctx, expr, &[x, y], NamingPattern::Input, 3);
        let second = substitute_vars(&mut ctx, expr, &[x, y], NamingPattern::Input, 3);
        assert_eq!(first, second);
        assert_eq!(
            first.serialize_to_str(&ctx),
            "and(eq(add(inp_0_3, 8'b00000001), 8'b00000001), inp_1_3)"
        );
        // fresh symbols keep the type of the original
        let renamed_x = renamed_symbol(&mut ctx, x, NamingPattern::Input, 0, 3);
        assert_eq!(renamed_x.get_type(&ctx), Type::BV(8));
    }

    #[test]
    fn different_iterations_do_not_collide() {
        let mut ctx = Context::default();
        let x = ctx.bv_symbol("x", 4);
        let h = ctx.bv_symbol("h", 4);
        let expr = ctx.bv_equal(x, h);

        let mut seen = std::collections::HashSet::new();
        for iteration in 0..4 {
            let e = substitute_vars(&mut ctx, expr, &[x], NamingPattern::Input, iteration);
            let e = substitute_vars(&mut ctx, e, &[h], NamingPattern::Helper, iteration);
            for symbol in free_symbols(&ctx, e) {
                assert!(seen.insert(symbol), "{}", symbol.serialize_to_str(&ctx));
            }
        }
        assert_eq!(seen.len(), 8);
    }
}
