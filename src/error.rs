//! Error handling
//!
//! Failures are grouped by phase: lexing/parsing (`ParseError`), evaluation
//! (`EvalError`), and registry operations (`RegistryError`). Every failure in
//! this crate is a returned value; nothing panics.

use thiserror::Error;

/// Errors produced while tokenizing or parsing an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{found}' at byte {position}")]
    UnexpectedChar { position: usize, found: char },

    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("expression too complex: longer than {limit} bytes")]
    TooLong { limit: usize },

    #[error("expression too complex: nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Errors produced while evaluating a parsed expression against a context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("variable '{name}' is not bound in the evaluation context")]
    UnboundVariable { name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot raise negative base {base} to fractional exponent {exponent}")]
    Domain { base: f64, exponent: f64 },
}

/// Errors surfaced by registry operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("function '{name}' not found")]
    NotFound { name: String },

    #[error("function '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("invalid function: {reason}")]
    InvalidFunction { reason: String },

    #[error("missing value for declared input '{name}'")]
    MissingInput { name: String },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

// Malformed expressions are rejected at create/update time; callers see them
// as one invalid-function reason rather than the lexer/parser internals.
impl From<ParseError> for RegistryError {
    fn from(err: ParseError) -> Self {
        RegistryError::InvalidFunction {
            reason: err.to_string(),
        }
    }
}
