//! Compile JSON-shaped queries into reusable record matchers.
//!
//! A query document describes property tests combined with AND (objects),
//! OR (arrays), and NOT (the `"!not"` key); compiling it once yields a
//! [`Matcher`] that filters any number of records without re-interpreting
//! the query.
//!
//! ```
//! use serde_json::json;
//!
//! let matcher = dragnet::compile(&json!({
//!     "name": { "last": { "beginsWith": "Ha", "endsWith": "sen" } }
//! }))?;
//!
//! assert!(matcher.matches(&json!({ "name": { "last": "Hansen" } })));
//! assert!(!matcher.matches(&json!({ "name": { "last": "Larsen" } })));
//! assert!(!matcher.matches(&json!({ "name": "not an object" })));
//! # Ok::<(), dragnet::CompileError>(())
//! ```
//!
//! The vocabulary is pluggable: pass a custom [`Dictionary`] through
//! [`Options`] to [`Matcher::compile_with`] and the same query structure
//! compiles against your own predicates.

pub use dragnet_core::{
    CapabilityFn, CompileError, Dictionary, Expr, Guard, Matcher, Options, Planner, RefEntry,
    RefId, RefTable, ScopePath, Test, TypeTag, ValueProbe, DEFAULT_NEGATION,
};
pub use dragnet_dictionary::{default_dictionary, default_dictionary_with, Classes};

use serde_json::Value;

/// Compile `query` with the default dictionary and default options.
pub fn compile(query: &Value) -> Result<Matcher, CompileError> {
    Matcher::compile_with(query, &options())
}

/// Default options pre-loaded with the default dictionary. Customize and
/// hand to [`Matcher::compile_with`]:
///
/// ```
/// use serde_json::json;
///
/// let plain = dragnet::options().optimize(false);
/// let matcher = dragnet::Matcher::compile_with(
///     &json!({ "foo": { "equals": "bar" } }),
///     &plain,
/// )?;
/// assert!(matcher.matches(&json!({ "foo": "bar" })));
/// # Ok::<(), dragnet::CompileError>(())
/// ```
pub fn options() -> Options {
    Options::new(default_dictionary())
}
