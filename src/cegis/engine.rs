// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::problem::CegisProblem;
use super::rename::{substitute_vars, NamingPattern};
use super::result::CegisResult;
use super::valuation::{CounterExample, CounterExampleIds, Implementation};
use crate::ir::*;
use crate::solver::{Response, Solver};
use crate::Result;
use baa::{BitVecOps, BitVecValue};
use std::time::Instant;

/// Outcome of a single solver query.
#[derive(Debug, Clone)]
pub enum SolverOutcome<T> {
    Sat(T),
    Unsat,
    Unknown,
}

impl<T> SolverOutcome<T> {
    pub fn response(&self) -> Response {
        match self {
            SolverOutcome::Sat(_) => Response::Sat,
            SolverOutcome::Unsat => Response::Unsat,
            SolverOutcome::Unknown => Response::Unknown,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SolverOutcome::Sat(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            SolverOutcome::Sat(value) => Some(value),
            _ => None,
        }
    }
}

enum State {
    SearchingImplementation,
    SearchingCounterExample(Implementation),
    Done(SolverOutcome<Implementation>),
}

/// Counter-example guided inductive synthesis.
///
/// The implementation session accumulates one copy of `behavioral ∧ correctness` per
/// counter-example. The counter-example session holds `behavioral ∧ ¬correctness` and is
/// queried once per candidate implementation inside a temporary scope.
pub struct CegisEngine<I: Solver, C: Solver = I> {
    problem: CegisProblem,
    impl_solver: I,
    ce_solver: C,
    counter_examples: Vec<CounterExample>,
    ids: CounterExampleIds,
    seeded: bool,
}

impl<I: Solver, C: Solver> CegisEngine<I, C> {
    /// Counter-example ids are drawn from the process-wide sequence.
    pub fn new(problem: CegisProblem, impl_solver: I, ce_solver: C) -> Self {
        Self::with_ids(problem, impl_solver, ce_solver, CounterExampleIds::global())
    }

    pub fn with_ids(
        problem: CegisProblem,
        impl_solver: I,
        ce_solver: C,
        ids: CounterExampleIds,
    ) -> Self {
        Self {
            problem,
            impl_solver,
            ce_solver,
            counter_examples: Vec::new(),
            ids,
            seeded: false,
        }
    }

    pub fn problem(&self) -> &CegisProblem {
        &self.problem
    }

    pub fn counter_examples(&self) -> &[CounterExample] {
        &self.counter_examples
    }

    pub fn impl_solver(&self) -> &I {
        &self.impl_solver
    }

    pub fn ce_solver(&self) -> &C {
        &self.ce_solver
    }

    /// Asserts the base formulas into both sessions. Only has an effect the first time
    /// it is called.
    pub fn seed(&mut self, ctx: &mut Context) -> Result<()> {
        if self.seeded {
            return Ok(());
        }
        let validity = self.problem.validity();
        tracing::trace!("impl: assert {}", validity.serialize_to_str(ctx));
        self.impl_solver.assert(ctx, validity)?;

        let not_correct = ctx.not(self.problem.correctness());
        let violation = ctx.and(self.problem.behavioral(), not_correct);
        tracing::trace!("ce: assert {}", violation.serialize_to_str(ctx));
        self.ce_solver.assert(ctx, violation)?;
        self.seeded = true;
        Ok(())
    }

    /// Proposes an implementation that works for all counter-examples found so far.
    pub fn find_implementation(
        &mut self,
        ctx: &mut Context,
    ) -> Result<SolverOutcome<Implementation>> {
        self.seed(ctx)?;
        if let Some(ce) = self.counter_examples.last() {
            // the counter-example binds inputs renamed with its id, thus the copy of the
            // relation needs to use the same iteration index
            let iteration = ce.id();
            let inputs = self.problem.input_vars();
            let helpers = self.problem.helper_vars();
            let binding = ce.extract_constraints(ctx, inputs, NamingPattern::Input);
            let relation = ctx.and(self.problem.behavioral(), self.problem.correctness());
            let relation = substitute_vars(ctx, relation, inputs, NamingPattern::Input, iteration);
            let relation =
                substitute_vars(ctx, relation, helpers, NamingPattern::Helper, iteration);
            let formula = ctx.and(binding, relation);
            tracing::trace!("impl: assert {}", formula.serialize_to_str(ctx));
            self.impl_solver.assert(ctx, formula)?;
        }

        let outcome = match self.impl_solver.check(ctx)? {
            Response::Sat => {
                let model = self.impl_solver.model(ctx, self.problem.impl_vars())?;
                SolverOutcome::Sat(Implementation::new(model))
            }
            Response::Unsat => SolverOutcome::Unsat,
            Response::Unknown => SolverOutcome::Unknown,
        };
        Ok(outcome)
    }

    /// Searches for inputs on which `implementation` violates correctness. A counter-example
    /// that is found gets recorded and returned.
    pub fn find_counter_example(
        &mut self,
        ctx: &mut Context,
        implementation: &Implementation,
    ) -> Result<SolverOutcome<CounterExample>> {
        self.seed(ctx)?;
        let constraints = implementation.extract_constraints(ctx, self.problem.impl_vars());
        self.ce_solver.push()?;
        let outcome = self.check_counter_example(ctx, constraints);
        // the scope needs to be released, even if the check failed
        let popped = self.ce_solver.pop();
        let outcome = outcome?;
        popped?;
        if let SolverOutcome::Sat(ce) = &outcome {
            self.counter_examples.push(ce.clone());
        }
        Ok(outcome)
    }

    fn check_counter_example(
        &mut self,
        ctx: &Context,
        constraints: ExprRef,
    ) -> Result<SolverOutcome<CounterExample>> {
        tracing::trace!("ce: assert {}", constraints.serialize_to_str(ctx));
        self.ce_solver.assert(ctx, constraints)?;
        let outcome = match self.ce_solver.check(ctx)? {
            Response::Sat => {
                let model = self.ce_solver.model(ctx, self.problem.input_vars())?;
                SolverOutcome::Sat(CounterExample::new(model, &self.ids))
            }
            Response::Unsat => SolverOutcome::Unsat,
            Response::Unknown => SolverOutcome::Unknown,
        };
        Ok(outcome)
    }

    /// Alternates between both searches until an implementation survives or one of the
    /// solvers gives up.
    pub fn run(mut self, ctx: &mut Context) -> Result<CegisResult> {
        let start = Instant::now();
        tracing::info!(
            "synthesizing {} ({} implementation, {} input, {} helper variables)",
            display_name(self.problem.name()),
            self.problem.impl_vars().len(),
            self.problem.input_vars().len(),
            self.problem.helper_vars().len()
        );
        self.seed(ctx)?;

        let mut state = State::SearchingImplementation;
        let outcome = loop {
            state = match state {
                State::SearchingImplementation => match self.find_implementation(ctx)? {
                    SolverOutcome::Sat(implementation) => {
                        tracing::debug!(
                            "round {}: candidate {}",
                            self.counter_examples.len(),
                            format_model(ctx, implementation.model().iter())
                        );
                        State::SearchingCounterExample(implementation)
                    }
                    SolverOutcome::Unsat => State::Done(SolverOutcome::Unsat),
                    SolverOutcome::Unknown => State::Done(SolverOutcome::Unknown),
                },
                State::SearchingCounterExample(implementation) => {
                    match self.find_counter_example(ctx, &implementation)? {
                        SolverOutcome::Sat(ce) => {
                            tracing::debug!(
                                "round {}: counter-example #{} {}",
                                self.counter_examples.len() - 1,
                                ce.id(),
                                format_model(ctx, ce.model().iter())
                            );
                            State::SearchingImplementation
                        }
                        SolverOutcome::Unsat => State::Done(SolverOutcome::Sat(implementation)),
                        SolverOutcome::Unknown => State::Done(SolverOutcome::Unknown),
                    }
                }
                State::Done(outcome) => break outcome,
            };
        };

        let end = Instant::now();
        let result = CegisResult::new(
            outcome,
            self.counter_examples,
            start,
            end,
            self.problem.name().to_string(),
        );
        tracing::info!(
            "{}: {} after {} counter-examples in {} ms",
            display_name(result.name()),
            result.verdict(),
            result.num_counter_examples(),
            result.runtime_ms()
        );
        Ok(result)
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<unnamed>"
    } else {
        name
    }
}

fn format_model<'a>(
    ctx: &Context,
    values: impl Iterator<Item = &'a (ExprRef, BitVecValue)>,
) -> String {
    let entries: Vec<String> = values
        .map(|(symbol, value)| {
            format!("{}={}", symbol.serialize_to_str(ctx), value.to_bit_str())
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{EnumerativeSolver, Model};
    use crate::CegisError;

    /// Fails every check once `checks_left` reaches zero.
    struct FlakySolver {
        inner: EnumerativeSolver,
        checks_left: usize,
        depth: usize,
    }

    impl Solver for FlakySolver {
        fn assert(&mut self, ctx: &Context, formula: ExprRef) -> Result<()> {
            self.inner.assert(ctx, formula)
        }
        fn push(&mut self) -> Result<()> {
            self.depth += 1;
            self.inner.push()
        }
        fn pop(&mut self) -> Result<()> {
            self.depth -= 1;
            self.inner.pop()
        }
        fn check(&mut self, ctx: &Context) -> Result<Response> {
            if self.checks_left == 0 {
                return Err(CegisError::Smt("solver crashed".to_string()));
            }
            self.checks_left -= 1;
            self.inner.check(ctx)
        }
        fn model(&mut self, ctx: &Context, symbols: &[ExprRef]) -> Result<Model> {
            self.inner.model(ctx, symbols)
        }
    }

    fn not_problem(ctx: &mut Context) -> CegisProblem {
        let f = ctx.bool_symbol("f");
        let x = ctx.bool_symbol("x");
        let y = ctx.bool_symbol("y");
        let not_x = ctx.not(x);
        let ite = ctx.bv_ite(f, not_x, x);
        let behavioral = ctx.bv_equal(y, ite);
        let correctness = ctx.bv_equal(y, not_x);
        let tru = ctx.tru();
        CegisProblem::new(ctx, &[f], &[x], &[y], tru, behavioral, correctness).unwrap()
    }

    #[test]
    fn scope_is_released_when_check_fails() {
        let mut ctx = Context::default();
        let problem = not_problem(&mut ctx);
        let ce_solver = FlakySolver {
            inner: EnumerativeSolver::default(),
            checks_left: 0,
            depth: 0,
        };
        let mut engine = CegisEngine::with_ids(
            problem,
            EnumerativeSolver::default(),
            ce_solver,
            CounterExampleIds::new(),
        );
        let implementation = engine
            .find_implementation(&mut ctx)
            .unwrap()
            .into_value()
            .unwrap();
        let err = engine
            .find_counter_example(&mut ctx, &implementation)
            .unwrap_err();
        assert!(matches!(err, CegisError::Smt(_)));
        assert_eq!(engine.ce_solver().depth, 0);
        assert_eq!(engine.ce_solver().inner.num_assertions(), 1);
        assert!(engine.counter_examples().is_empty());
    }

    #[test]
    fn counter_example_scope_is_popped_between_rounds() {
        let mut ctx = Context::default();
        let problem = not_problem(&mut ctx);
        let mut engine = CegisEngine::with_ids(
            problem,
            EnumerativeSolver::default(),
            EnumerativeSolver::default(),
            CounterExampleIds::new(),
        );
        let first = engine
            .find_implementation(&mut ctx)
            .unwrap()
            .into_value()
            .unwrap();
        let ce = engine.find_counter_example(&mut ctx, &first).unwrap();
        assert_eq!(ce.response(), Response::Sat);
        assert_eq!(engine.ce_solver().num_scopes(), 0);
        assert_eq!(engine.ce_solver().num_assertions(), 1);

        let second = engine
            .find_implementation(&mut ctx)
            .unwrap()
            .into_value()
            .unwrap();
        // validity plus one copy of the relation
        assert_eq!(engine.impl_solver().num_assertions(), 2);
        let f = engine.problem().impl_vars()[0];
        let tru = ctx.tru();
        assert_eq!(second.get_valuation(&mut ctx, f), tru);

        let done = engine.find_counter_example(&mut ctx, &second).unwrap();
        assert_eq!(done.response(), Response::Unsat);
        assert_eq!(engine.ce_solver().num_scopes(), 0);
        assert_eq!(engine.ce_solver().num_assertions(), 1);
        assert_eq!(engine.counter_examples().len(), 1);
    }

    #[test]
    fn private_ids_start_at_zero() {
        let mut ctx = Context::default();
        let problem = not_problem(&mut ctx);
        let engine = CegisEngine::with_ids(
            problem,
            EnumerativeSolver::default(),
            EnumerativeSolver::default(),
            CounterExampleIds::new(),
        );
        let result = engine.run(&mut ctx).unwrap();
        assert_eq!(result.verdict(), Response::Sat);
        let ids: Vec<u64> = result.counter_examples().iter().map(|c| c.id()).collect();
        assert_eq!(ids, [0]);
    }
}
