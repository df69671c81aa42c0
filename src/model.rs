//! The registry's data model: [`Function`] entities plus the request/response
//! shapes callers serialize across whatever transport they run.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, ExprParser};
use crate::error::RegistryError;

/// A named, reusable computation: declared inputs, named numeric parameters,
/// and an arithmetic expression over the union of both name sets.
///
/// The expression is stored as validated source text; parsed trees live in
/// the registry's bounded cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
    pub expression: String,
}

impl Function {
    /// Checks every entity invariant and parse-validates the expression.
    ///
    /// Returns the parsed tree so the caller can seed the AST cache without a
    /// second parse. An entity that fails here never enters the registry.
    pub(crate) fn validate(&self) -> Result<Expr, RegistryError> {
        if self.name.is_empty() || self.name.trim() != self.name {
            return Err(invalid(
                "name must be non-empty with no surrounding whitespace",
            ));
        }

        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.as_str()) {
                return Err(invalid(&format!("duplicate input '{input}'")));
            }
        }

        if self.outputs.is_empty() {
            return Err(invalid("at least one output name is required"));
        }

        if let Some(clash) = self.inputs.iter().find(|i| self.parameters.contains_key(*i)) {
            return Err(invalid(&format!(
                "'{clash}' is declared both as an input and as a parameter"
            )));
        }

        let ast = ExprParser::parse(&self.expression)?;
        Ok(ast)
    }
}

fn invalid(reason: &str) -> RegistryError {
    RegistryError::InvalidFunction {
        reason: reason.to_string(),
    }
}

/// A partial update. `None` means "leave unchanged"; `Some` carries the new
/// state, so an explicitly empty parameter map is a valid no-op merge rather
/// than an absent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub parameters: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub expression: Option<String>,
}

/// The outcome of executing a function: the value, reported under the
/// entity's first output name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: String,
    pub value: f64,
}
