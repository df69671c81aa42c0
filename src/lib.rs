//! # funcreg
//!
//! A registry of named parameterized functions with safe arithmetic
//! expression evaluation. Expressions are parsed against a closed grammar
//! (`+ - * / ^`, unary minus, parentheses, named variables) and evaluated
//! against a context merged from each function's parameters and the caller's
//! inputs. Only arithmetic over named variables is expressible.
//!
//! ```rust
//! use std::collections::HashMap;
//! use funcreg::{Function, Registry};
//!
//! let registry = Registry::new();
//! registry.create(Function {
//!     name: "line".to_string(),
//!     inputs: vec!["x".to_string()],
//!     outputs: vec!["y".to_string()],
//!     parameters: HashMap::from([("a".to_string(), 2.0), ("b".to_string(), 1.0)]),
//!     expression: "a * x + b".to_string(),
//! }).unwrap();
//!
//! let result = registry
//!     .execute("line", &HashMap::from([("x".to_string(), 3.0)]))
//!     .unwrap();
//! assert_eq!((result.output.as_str(), result.value), ("y", 7.0));
//! ```

pub mod ast;
pub mod binding;
pub mod error;
pub mod model;
pub mod registry;

pub use error::{EvalError, ParseError, RegistryError};
pub use model::{ExecutionResult, Function, UpdateRequest};
pub use registry::Registry;

use std::collections::HashMap;

use ast::{evaluate, ExprParser};

/// Parses and evaluates a one-shot expression against a context, without
/// registering anything.
pub fn evaluate_expression(
    expression: &str,
    context: &HashMap<String, f64>,
) -> Result<f64, RegistryError> {
    let ast = ExprParser::parse(expression)?;
    let value = evaluate(&ast, context)?;
    Ok(value)
}
