// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::engine::SolverOutcome;
use super::valuation::{CounterExample, Implementation};
use crate::ir::{Context, ExprRef};
use crate::solver::Response;
use crate::{CegisError, Result};
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One labeled line per field.
    #[default]
    Human,
    /// `name, verdict, #counter-examples, runtime`
    Csv,
}

/// Summary of a finished synthesis run.
#[derive(Debug, Clone)]
pub struct CegisResult {
    outcome: SolverOutcome<Implementation>,
    counter_examples: Vec<CounterExample>,
    start: Instant,
    end: Instant,
    name: String,
}

impl CegisResult {
    pub(crate) fn new(
        outcome: SolverOutcome<Implementation>,
        counter_examples: Vec<CounterExample>,
        start: Instant,
        end: Instant,
        name: String,
    ) -> Self {
        Self {
            outcome,
            counter_examples,
            start,
            end,
            name,
        }
    }

    pub fn verdict(&self) -> Response {
        self.outcome.response()
    }

    /// The synthesized implementation, only available if the verdict is `sat`.
    pub fn implementation(&self) -> Option<&Implementation> {
        self.outcome.value()
    }

    /// Value of an implementation variable in the synthesized implementation.
    pub fn get_valuation(&self, ctx: &mut Context, var: ExprRef) -> Result<ExprRef> {
        match self.implementation() {
            Some(implementation) => Ok(implementation.get_valuation(ctx, var)),
            None => Err(CegisError::NoImplementation {
                verdict: self.verdict(),
            }),
        }
    }

    pub fn counter_examples(&self) -> &[CounterExample] {
        &self.counter_examples
    }

    pub fn num_counter_examples(&self) -> usize {
        self.counter_examples.len()
    }

    pub fn runtime(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn runtime_ms(&self) -> u128 {
        self.runtime().as_millis()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write_report(&self, out: &mut impl Write, format: ReportFormat) -> std::io::Result<()> {
        match format {
            ReportFormat::Csv => writeln!(
                out,
                "{}, {}, {}, {}",
                self.name,
                self.verdict(),
                self.num_counter_examples(),
                self.runtime_ms()
            ),
            ReportFormat::Human => {
                writeln!(out, "Benchmark:         {}", self.name)?;
                writeln!(out, "Result:            {}", self.verdict())?;
                writeln!(out, "#Counter-examples: {}", self.num_counter_examples())?;
                writeln!(out, "Runtime:           {} milliseconds", self.runtime_ms())
            }
        }
    }
}

impl std::fmt::Display for CegisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = Vec::new();
        self.write_report(&mut buf, ReportFormat::Human)
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cegis::CounterExampleIds;
    use crate::solver::Model;
    use baa::BitVecValue;

    fn report(result: &CegisResult, format: ReportFormat) -> String {
        let mut buf = Vec::new();
        result.write_report(&mut buf, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn finished(outcome: SolverOutcome<Implementation>, num_ces: usize) -> CegisResult {
        let ids = CounterExampleIds::new();
        let ces = (0..num_ces)
            .map(|_| CounterExample::new(Model::default(), &ids))
            .collect();
        let start = Instant::now();
        let end = start + Duration::from_millis(42);
        CegisResult::new(outcome, ces, start, end, "majority".to_string())
    }

    #[test]
    fn human_report() {
        let result = finished(SolverOutcome::Sat(Implementation::new(Model::default())), 3);
        insta::assert_snapshot!(report(&result, ReportFormat::Human), @r###"
        Benchmark:         majority
        Result:            sat
        #Counter-examples: 3
        Runtime:           42 milliseconds
        "###);
        assert_eq!(result.to_string(), report(&result, ReportFormat::Human));
    }

    #[test]
    fn csv_report() {
        let result = finished(SolverOutcome::Unknown, 2);
        assert_eq!(report(&result, ReportFormat::Csv), "majority, unknown, 2, 42\n");
    }

    #[test]
    fn valuation_requires_implementation() {
        let mut ctx = Context::default();
        let k = ctx.bv_symbol("k", 4);
        let result = finished(SolverOutcome::Unsat, 0);
        assert!(result.implementation().is_none());
        let err = result.get_valuation(&mut ctx, k).unwrap_err();
        assert!(matches!(
            err,
            CegisError::NoImplementation {
                verdict: Response::Unsat
            }
        ));
        assert_eq!(
            err.to_string(),
            "no implementation available, synthesis ended with `unsat`"
        );

        let model = Model::new(vec![(k, BitVecValue::from_u64(5, 4))]);
        let result = finished(SolverOutcome::Sat(Implementation::new(model)), 1);
        let five = ctx.bv_lit(5, 4);
        assert_eq!(result.get_valuation(&mut ctx, k).unwrap(), five);
        assert_eq!(result.runtime(), Duration::from_millis(42));
    }
}
