// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::solver::Response;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CegisError>;

#[derive(Debug, Error)]
pub enum CegisError {
    /// Communication with a solver process failed.
    #[error("solver I/O: {0}")]
    Io(#[from] std::io::Error),
    /// The solver answered with something we could not interpret.
    #[error("unexpected solver response: {0}")]
    Smt(String),
    /// A valuation was requested from a result that holds no implementation.
    #[error("no implementation available, synthesis ended with `{verdict}`")]
    NoImplementation { verdict: Response },
}

/// Rejection reasons for an ill-formed synthesis problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` is not a symbol")]
    NotASymbol(String),
    #[error("variable `{0}` is listed more than once")]
    DuplicateVariable(String),
    #[error("variable name `{0}` is reserved for fresh counter-example symbols")]
    ReservedName(String),
    #[error("{formula} formula must be boolean, found {found}")]
    NotBoolean { formula: &'static str, found: String },
    #[error("{formula} formula is ill-typed: {msg}")]
    IllTyped { formula: &'static str, msg: String },
    #[error("{formula} formula mentions `{symbol}` which is not a declared variable")]
    UnknownSymbol {
        formula: &'static str,
        symbol: String,
    },
}
