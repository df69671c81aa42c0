//! Binding resolution: merging a function's parameters with caller inputs
//! into one evaluation context.

use std::collections::HashMap;

use crate::error::RegistryError;

/// Builds the evaluation context for a call.
///
/// The context is `parameters` overlaid with `supplied`; a supplied value wins
/// on overlap (only reachable for pre-invariant legacy entities, since
/// validation keeps the two name sets disjoint). Every name in
/// `declared_inputs` must be supplied. Supplied names beyond the declared set
/// are accepted silently and simply become available to the expression; this
/// permissiveness is intended.
pub fn resolve_bindings(
    parameters: &HashMap<String, f64>,
    declared_inputs: &[String],
    supplied: &HashMap<String, f64>,
) -> Result<HashMap<String, f64>, RegistryError> {
    for name in declared_inputs {
        if !supplied.contains_key(name) {
            return Err(RegistryError::MissingInput { name: name.clone() });
        }
    }

    let mut context = parameters.clone();
    context.extend(supplied.iter().map(|(name, value)| (name.clone(), *value)));
    Ok(context)
}
