mod evaluator;
mod lexer;
mod parser;

pub use evaluator::evaluate;
pub use lexer::{Lexer, Token};
pub use parser::{ExprParser, MAX_EXPRESSION_LENGTH, MAX_NESTING_DEPTH};

use crate::error::EvalError;

/// A parsed arithmetic expression.
///
/// Division and power are represented structurally; nothing is folded or
/// checked until evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Variable(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Neg(Box<Expr>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    /// Applies the operator to two operands.
    ///
    /// Division by zero and fractional powers of negative bases fail instead
    /// of yielding infinities or NaN.
    pub fn apply(&self, left: f64, right: f64) -> Result<f64, EvalError> {
        match self {
            BinaryOp::Add => Ok(left + right),
            BinaryOp::Subtract => Ok(left - right),
            BinaryOp::Multiply => Ok(left * right),
            BinaryOp::Divide => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(left / right)
                }
            }
            BinaryOp::Power => {
                if left < 0.0 && right.fract() != 0.0 {
                    Err(EvalError::Domain {
                        base: left,
                        exponent: right,
                    })
                } else {
                    Ok(left.powf(right))
                }
            }
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
