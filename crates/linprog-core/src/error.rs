use linprog_parser::GrammarError;
use thiserror::Error;

use crate::log::SimplexLog;

/// The error taxonomy for every fallible call in this crate. Simplex
/// failures carry the log accumulated up to the point of failure so a
/// caller can render the iteration trail that led to the error; parse and
/// canonicalisation failures are fatal and carry no log.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("parse error: {0}")]
    Parse(#[from] GrammarError),

    #[error("canonical form error: {0}")]
    Canonical(String),

    #[error("problem is unbounded")]
    Unbounded(Box<SimplexLog>),

    #[error("problem is infeasible")]
    Infeasible(Box<SimplexLog>),

    #[error("iteration limit reached after {iterations} iterations")]
    IterationLimit { iterations: usize, log: Box<SimplexLog> },

    #[error("domain error: {0}")]
    Domain(String),
}

impl SolverError {
    /// The attached log, if this variant carries one.
    pub fn log(&self) -> Option<&SimplexLog> {
        match self {
            SolverError::Unbounded(log) | SolverError::Infeasible(log) => Some(log),
            SolverError::IterationLimit { log, .. } => Some(log),
            SolverError::Parse(_) | SolverError::Canonical(_) | SolverError::Domain(_) => None,
        }
    }
}
