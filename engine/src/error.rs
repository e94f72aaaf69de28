//! Error types
//!
//! Two categories exist:
//! - [`ProgrammingError`]: a broken invariant in the calling code (mismatched
//!   budget nesting, persistence with an active budget, invalid distribution
//!   parameters under strict mode). Hosts should treat these as fatal.
//! - Everything else in [`RngError`]: I/O, entropy and checkpoint problems.
//!
//! Generation itself is total and never produces an error.

use crate::rng::StreamId;
use std::panic::Location;
use thiserror::Error;

/// Violations of the engine's usage contract
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgrammingError {
    #[error("budget from {released} released on {stream} stream, but top of stack is {}", describe_top(.top))]
    BudgetOrder {
        stream: StreamId,
        released: &'static Location<'static>,
        top: Option<&'static Location<'static>>,
    },

    #[error("{operation} attempted while {stream} stream has {depth} active budget(s)")]
    ActiveBudget {
        operation: &'static str,
        stream: StreamId,
        depth: usize,
    },

    #[error("{operation}{args:?} attempted")]
    InvalidRange {
        operation: &'static str,
        args: Vec<i64>,
    },

    #[error("budget from {origin} overflowed: budget = {budget}, actual = {direct}+{indirect} (direct+indirect)")]
    BudgetOverflow {
        origin: &'static Location<'static>,
        budget: i64,
        direct: i64,
        indirect: i64,
    },
}

fn describe_top(top: &Option<&'static Location<'static>>) -> String {
    match top {
        Some(location) => location.to_string(),
        None => "empty".to_string(),
    }
}

/// Top-level error type for the engine
#[derive(Debug, Error)]
pub enum RngError {
    #[error("Programming error: {0}")]
    Programming(#[from] ProgrammingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entropy source failed: {0}")]
    Entropy(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State validation error: {0}")]
    StateValidation(String),
}

impl RngError {
    /// True when the error signals a corrupted invariant rather than an
    /// environmental failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RngError::Programming(_))
    }

    /// The programming error, if this is one.
    pub fn as_programming(&self) -> Option<&ProgrammingError> {
        match self {
            RngError::Programming(e) => Some(e),
            _ => None,
        }
    }
}
