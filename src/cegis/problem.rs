// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::rename::is_reserved_name;
use crate::ir::*;
use crate::ConfigError;
use std::collections::HashSet;

/// A synthesis problem: find values for `impl_vars` such that for all `input_vars` and
/// `helper_vars`, `behavioral` implies `correctness`, subject to `validity`.
#[derive(Debug, Clone)]
pub struct CegisProblem {
    impl_vars: Vec<ExprRef>,
    input_vars: Vec<ExprRef>,
    helper_vars: Vec<ExprRef>,
    validity: ExprRef,
    behavioral: ExprRef,
    correctness: ExprRef,
    name: String,
}

impl CegisProblem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &Context,
        impl_vars: &[ExprRef],
        input_vars: &[ExprRef],
        helper_vars: &[ExprRef],
        validity: ExprRef,
        behavioral: ExprRef,
        correctness: ExprRef,
    ) -> Result<Self, ConfigError> {
        let mut declared = HashSet::new();
        // symbols of different sorts may share a name, but not in one problem
        let mut names = HashSet::new();
        for &var in impl_vars.iter().chain(input_vars).chain(helper_vars) {
            let name = match var.get_symbol_name(ctx) {
                Some(name) => name,
                None => return Err(ConfigError::NotASymbol(var.serialize_to_str(ctx))),
            };
            if !declared.insert(var) || !names.insert(name) {
                return Err(ConfigError::DuplicateVariable(name.to_string()));
            }
            if is_reserved_name(name) {
                return Err(ConfigError::ReservedName(name.to_string()));
            }
        }

        for (formula, expr) in [
            ("validity", validity),
            ("behavioral", behavioral),
            ("correctness", correctness),
        ] {
            let tpe = type_check_deep(ctx, expr).map_err(|e| ConfigError::IllTyped {
                formula,
                msg: e.get_msg().to_string(),
            })?;
            if !tpe.is_bool() {
                return Err(ConfigError::NotBoolean {
                    formula,
                    found: tpe.to_string(),
                });
            }
            if let Some(unknown) = free_symbols(ctx, expr)
                .into_iter()
                .find(|s| !declared.contains(s))
            {
                return Err(ConfigError::UnknownSymbol {
                    formula,
                    symbol: unknown.serialize_to_str(ctx),
                });
            }
        }

        Ok(Self {
            impl_vars: impl_vars.to_vec(),
            input_vars: input_vars.to_vec(),
            helper_vars: helper_vars.to_vec(),
            validity,
            behavioral,
            correctness,
            name: String::new(),
        })
    }

    /// Name used in reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn impl_vars(&self) -> &[ExprRef] {
        &self.impl_vars
    }
    pub fn input_vars(&self) -> &[ExprRef] {
        &self.input_vars
    }
    pub fn helper_vars(&self) -> &[ExprRef] {
        &self.helper_vars
    }
    pub fn validity(&self) -> ExprRef {
        self.validity
    }
    pub fn behavioral(&self) -> ExprRef {
        self.behavioral
    }
    pub fn correctness(&self) -> ExprRef {
        self.correctness
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vars {
        f: ExprRef,
        x: ExprRef,
        y: ExprRef,
    }

    fn vars(ctx: &mut Context) -> Vars {
        Vars {
            f: ctx.bool_symbol("f"),
            x: ctx.bv_symbol("x", 4),
            y: ctx.bv_symbol("y", 4),
        }
    }

    #[test]
    fn accepts_well_formed_problem() {
        let mut ctx = Context::default();
        let Vars { f, x, y } = vars(&mut ctx);
        let tru = ctx.tru();
        let behavioral = ctx.bv_equal(y, x);
        let problem = CegisProblem::new(&ctx, &[f], &[x], &[y], tru, behavioral, f)
            .unwrap()
            .with_name("copy");
        assert_eq!(problem.name(), "copy");
        assert_eq!(problem.impl_vars(), [f]);
        assert_eq!(problem.helper_vars(), [y]);
    }

    #[test]
    fn rejects_bad_variables() {
        let mut ctx = Context::default();
        let Vars { f, x, y } = vars(&mut ctx);
        let tru = ctx.tru();
        let sum = ctx.add(x, y);
        assert_eq!(
            CegisProblem::new(&ctx, &[f], &[sum], &[], tru, tru, tru).unwrap_err(),
            ConfigError::NotASymbol("add(x, y)".to_string())
        );
        assert_eq!(
            CegisProblem::new(&ctx, &[f], &[x], &[x], tru, tru, tru).unwrap_err(),
            ConfigError::DuplicateVariable("x".to_string())
        );
        // same name, different sort
        let x_bool = ctx.bool_symbol("x");
        assert_ne!(x_bool, x);
        assert_eq!(
            CegisProblem::new(&ctx, &[x_bool], &[x], &[y], tru, tru, tru).unwrap_err(),
            ConfigError::DuplicateVariable("x".to_string())
        );
        let reserved = ctx.bv_symbol("hlp_0_1", 4);
        assert_eq!(
            CegisProblem::new(&ctx, &[f], &[x], &[reserved], tru, tru, tru).unwrap_err(),
            ConfigError::ReservedName("hlp_0_1".to_string())
        );
    }

    #[test]
    fn rejects_bad_formulas() {
        let mut ctx = Context::default();
        let Vars { f, x, y } = vars(&mut ctx);
        let tru = ctx.tru();
        assert_eq!(
            CegisProblem::new(&ctx, &[f], &[x], &[y], tru, x, tru).unwrap_err(),
            ConfigError::NotBoolean {
                formula: "behavioral",
                found: "bv<4>".to_string()
            }
        );
        let z = ctx.bool_symbol("z");
        let f_and_z = ctx.and(f, z);
        assert_eq!(
            CegisProblem::new(&ctx, &[f], &[x], &[y], f_and_z, tru, tru).unwrap_err(),
            ConfigError::UnknownSymbol {
                formula: "validity",
                symbol: "z".to_string()
            }
        );
    }
}
