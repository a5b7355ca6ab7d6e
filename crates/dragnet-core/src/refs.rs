//! Per-compilation reference table for opaque predicate arguments.
//!
//! Some arguments cannot be spelled as JSON literals: compiled regular
//! expressions and arbitrary probe functions (class checks, custom leaf
//! predicates). Capabilities register them here during compilation and embed
//! the returned index in the expression they produce. Every `compile` call
//! owns a fresh table, which is moved into the finished matcher; indices from
//! one compilation are meaningless to every other.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

/// An opaque boolean probe over a located value.
pub type ValueProbe = dyn Fn(&Value) -> bool + Send + Sync;

/// Index of an entry in a compilation's [`RefTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefId(pub(crate) usize);

impl RefId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refs[{}]", self.0)
    }
}

/// A table-stored opaque value.
pub enum RefEntry {
    Regex(Regex),
    Probe(Arc<ValueProbe>),
}

impl fmt::Debug for RefEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefEntry::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            RefEntry::Probe(_) => f.write_str("Probe(..)"),
        }
    }
}

/// Append-only store of opaque values, addressed by [`RefId`].
#[derive(Debug, Default)]
pub struct RefTable {
    entries: Vec<RefEntry>,
}

impl RefTable {
    pub fn push(&mut self, entry: RefEntry) -> RefId {
        let id = RefId(self.entries.len());
        self.entries.push(entry);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The regex at `id`, if that entry holds one.
    pub fn regex(&self, id: RefId) -> Option<&Regex> {
        match self.entries.get(id.0) {
            Some(RefEntry::Regex(regex)) => Some(regex),
            _ => None,
        }
    }

    /// The probe at `id`, if that entry holds one.
    pub fn probe(&self, id: RefId) -> Option<&Arc<ValueProbe>> {
        match self.entries.get(id.0) {
            Some(RefEntry::Probe(probe)) => Some(probe),
            _ => None,
        }
    }
}
