//! Scope paths: the property-access chain from the record root.

use std::fmt;

/// The property-access chain from the record root to the value under test.
///
/// Threaded by value through the planner's recursion. [`ScopePath::child`]
/// produces an extended copy and leaves the receiver untouched, so sibling
/// clauses can never observe each other's scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    /// The record root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path by one property name.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The containing path and the final property name, `None` at the root.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.segments
            .split_last()
            .map(|(last, init)| (init, last.as_str()))
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("entry")?;
        for segment in &self.segments {
            write!(f, "[{segment:?}]")?;
        }
        Ok(())
    }
}
