//! Evaluation error types.

use super::Arity;
use thiserror::Error;

/// Errors produced while validating or evaluating an operation request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{operation} requires {}", arity_requirement(.expected))]
    Arity {
        operation: &'static str,
        expected: Arity,
        actual: usize,
    },

    #[error("Invalid input {index}: {reason}")]
    InvalidOperand { index: usize, reason: String },

    #[error("{operation} produced a non-finite result")]
    NonFinite { operation: &'static str },
}

/// Whether an error is the caller's fault or an evaluation fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Bad request shape, wrong input count, unknown operator
    Validation,
    /// Anything that went wrong while applying the rule
    Fault,
}

impl EvalError {
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            EvalError::UnknownOperation(_) | EvalError::Arity { .. } => EvalErrorKind::Validation,
            EvalError::InvalidOperand { .. } | EvalError::NonFinite { .. } => EvalErrorKind::Fault,
        }
    }
}

/// `1 input`, `2 inputs.`, `at least 2 inputs.`
fn arity_requirement(arity: &Arity) -> String {
    match arity {
        Arity::Exactly(1) => "1 input".to_string(),
        Arity::Exactly(n) => format!("{} inputs.", n),
        Arity::AtLeast(1) => "at least 1 input.".to_string(),
        Arity::AtLeast(n) => format!("at least {} inputs.", n),
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
