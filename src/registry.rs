use std::collections::HashMap;

use crate::diagnostics::RuntimeError;

/// Records the fixed number of values every callable returns. Entries are
/// created once, at built-in installation or function definition, and are
/// immutable afterwards.
#[derive(Debug, Default)]
pub(crate) struct FunctionRegistry {
    arities: HashMap<String, usize>,
}

impl FunctionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Idempotent for identical re-registration; a different arity for the
    /// same name is an error.
    pub(crate) fn register(&mut self, name: &str, arity: usize) -> Result<(), RuntimeError> {
        match self.arities.get(name) {
            Some(&existing) if existing == arity => Ok(()),
            Some(&existing) => Err(RuntimeError::new(format!(
                "'{}' is already registered with return arity {}; cannot re-register with arity {}",
                name, existing, arity
            ))),
            None => {
                self.arities.insert(name.to_string(), arity);
                Ok(())
            }
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<usize> {
        self.arities.get(name).copied()
    }
}
