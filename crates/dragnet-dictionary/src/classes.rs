//! Named class probes backing the `instanceOf` predicate.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use dragnet_core::ValueProbe;

/// Registry of named value probes.
///
/// A probe stands in for a constructor check: `instanceOf "Circle"` holds
/// when the probe registered under `"Circle"` accepts the located value.
/// Resolution happens at compile time, so a query naming an unknown class
/// fails to compile instead of failing to match.
#[derive(Clone, Default)]
pub struct Classes {
    probes: BTreeMap<String, Arc<ValueProbe>>,
}

impl Classes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe under `name`, replacing any earlier entry.
    pub fn register<F>(&mut self, name: impl Into<String>, probe: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.probes.insert(name.into(), Arc::new(probe));
    }

    /// Builder-style [`Classes::register`].
    pub fn with<F>(mut self, name: impl Into<String>, probe: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.register(name, probe);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&Arc<ValueProbe>> {
        self.probes.get(name)
    }

    /// Sorted class names, for diagnostics.
    pub fn names(&self) -> Vec<String> {
        self.probes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl fmt::Debug for Classes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classes")
            .field("names", &self.names())
            .finish()
    }
}
