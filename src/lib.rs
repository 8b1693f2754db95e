// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

pub mod cegis;
mod error;
pub mod ir;
pub mod smt;
pub mod solver;

pub use error::{CegisError, ConfigError, Result};
