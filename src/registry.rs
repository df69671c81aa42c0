//! The function registry: a concurrency-safe, in-memory store of named
//! [`Function`] entities.
//!
//! Mutations serialize on the write half of an `RwLock`; reads share the read
//! half and always observe a committed snapshot. Parsed expressions live in a
//! bounded LRU cache keyed by source text, so execution does not re-parse on
//! the hot path. Registry state is process-local and discarded at exit.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::debug;
use lru::LruCache;

use crate::ast::{evaluate, Expr, ExprParser};
use crate::binding::resolve_bindings;
use crate::error::RegistryError;
use crate::model::{ExecutionResult, Function, UpdateRequest};

/// Default capacity of the parsed-expression cache.
pub const DEFAULT_CACHE_SIZE: usize = 256;

pub struct Registry {
    functions: RwLock<HashMap<String, Function>>,
    parsed: Mutex<LruCache<String, Arc<Expr>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_cache_size(DEFAULT_CACHE_SIZE)
    }

    /// Creates a registry with a given maximum AST cache size.
    pub fn with_cache_size(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            functions: RwLock::new(HashMap::new()),
            parsed: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Validates and inserts a new function.
    ///
    /// Validation runs before the write lock is taken; concurrent creates for
    /// the same name serialize on the insert, so exactly one wins.
    pub fn create(&self, function: Function) -> Result<(), RegistryError> {
        let ast = function.validate()?;

        let mut functions = self.write_store();
        if functions.contains_key(&function.name) {
            return Err(RegistryError::AlreadyExists {
                name: function.name.clone(),
            });
        }
        debug!("registering function '{}'", function.name);
        self.cache_put(function.expression.clone(), Arc::new(ast));
        functions.insert(function.name.clone(), function);
        Ok(())
    }

    /// Returns a snapshot of the named function.
    pub fn get(&self, name: &str) -> Result<Function, RegistryError> {
        self.read_store()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// All registered names. Order is unspecified.
    pub fn list(&self) -> Vec<String> {
        self.read_store().keys().cloned().collect()
    }

    /// Applies a partial update: the parameter delta merges key-by-key (add
    /// or overwrite, never remove), a new expression replaces the old one
    /// wholesale.
    ///
    /// The update is atomic: every fallible step runs before the first write,
    /// so a rejected delta or a malformed expression leaves the entity
    /// untouched.
    pub fn update(&self, name: &str, update: UpdateRequest) -> Result<(), RegistryError> {
        let new_ast = match update.expression.as_deref() {
            Some(expression) => Some(Arc::new(ExprParser::parse(expression)?)),
            None => None,
        };

        let mut functions = self.write_store();
        let function = functions
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })?;

        // The delta may not break input/parameter disjointness.
        if let Some(delta) = &update.parameters {
            if let Some(clash) = delta.keys().find(|key| function.inputs.contains(*key)) {
                return Err(RegistryError::InvalidFunction {
                    reason: format!("'{clash}' is declared both as an input and as a parameter"),
                });
            }
        }

        debug!("updating function '{name}'");
        if let Some(delta) = update.parameters {
            function.parameters.extend(delta);
        }
        if let Some(expression) = update.expression {
            if let Some(ast) = new_ast {
                self.cache_put(expression.clone(), ast);
            }
            function.expression = expression;
        }
        Ok(())
    }

    /// Removes the named function.
    pub fn delete(&self, name: &str) -> Result<(), RegistryError> {
        let mut functions = self.write_store();
        match functions.remove(name) {
            Some(_) => {
                debug!("deleted function '{name}'");
                Ok(())
            }
            None => Err(RegistryError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Looks up a function, resolves bindings, and evaluates its expression.
    ///
    /// The entity is cloned out of the store first, so a concurrent update
    /// never tears a running evaluation.
    pub fn execute(
        &self,
        name: &str,
        inputs: &HashMap<String, f64>,
    ) -> Result<ExecutionResult, RegistryError> {
        let function = self.get(name)?;
        let context = resolve_bindings(&function.parameters, &function.inputs, inputs)?;
        let ast = self.parsed_ast(&function.expression)?;
        let value = evaluate(&ast, &context)?;
        debug!("executed '{name}': {value}");
        Ok(ExecutionResult {
            output: function.outputs[0].clone(),
            value,
        })
    }

    /// Fetches the parsed tree for stored expression text, re-parsing on a
    /// cache miss. Stored text was validated at create/update time.
    fn parsed_ast(&self, expression: &str) -> Result<Arc<Expr>, RegistryError> {
        {
            let mut cache = self.parsed.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(ast) = cache.get(expression) {
                return Ok(Arc::clone(ast));
            }
        }
        let ast = Arc::new(ExprParser::parse(expression)?);
        self.cache_put(expression.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    fn cache_put(&self, expression: String, ast: Arc<Expr>) {
        self.parsed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(expression, ast);
    }

    fn read_store(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Function>> {
        self.functions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Function>> {
        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
