//! The predicate dictionary: the query language's vocabulary.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CompileError;
use crate::expr::Expr;
use crate::planner::Planner;
use crate::scope::ScopePath;

/// A named, pluggable unit of comparison logic.
///
/// A capability receives the query-supplied argument, the scope of the value
/// under test, and the planner — through which it can invoke other
/// capabilities ([`Planner::call`]), compile nested fragments
/// ([`Planner::subplan`]), and register opaque values into the compilation's
/// reference table.
pub type CapabilityFn =
    Arc<dyn Fn(&Value, &ScopePath, &mut Planner) -> Result<Expr, CompileError> + Send + Sync>;

/// Mapping from predicate name to capability. Names are unique by
/// construction; registering a name twice replaces the earlier entry.
#[derive(Clone, Default)]
pub struct Dictionary {
    entries: BTreeMap<String, CapabilityFn>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, capability: F)
    where
        F: Fn(&Value, &ScopePath, &mut Planner) -> Result<Expr, CompileError>
            + Send
            + Sync
            + 'static,
    {
        self.entries.insert(name.into(), Arc::new(capability));
    }

    /// Builder-style [`Dictionary::register`].
    pub fn with<F>(mut self, name: impl Into<String>, capability: F) -> Self
    where
        F: Fn(&Value, &ScopePath, &mut Planner) -> Result<Expr, CompileError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, capability);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&CapabilityFn> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sorted predicate names, for diagnostics.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Test;

    fn equals(arg: &Value, scope: &ScopePath, _cx: &mut Planner) -> Result<Expr, CompileError> {
        Ok(Expr::test(scope.clone(), Test::Equals(arg.clone())))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut dictionary = Dictionary::new();
        assert!(dictionary.is_empty());

        dictionary.register("$eq", equals);
        assert!(dictionary.contains("$eq"));
        assert!(dictionary.resolve("$eq").is_some());
        assert!(dictionary.resolve("$lt").is_none());
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let dictionary = Dictionary::new()
            .with("lessThan", equals)
            .with("equals", equals)
            .with("greaterThan", equals);
        assert_eq!(dictionary.names(), ["equals", "greaterThan", "lessThan"]);
    }

    #[test]
    fn test_registering_twice_replaces() {
        let mut dictionary = Dictionary::new();
        dictionary.register("equals", equals);
        dictionary.register("equals", equals);
        assert_eq!(dictionary.len(), 1);
    }
}
