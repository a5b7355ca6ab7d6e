//! Compile options and the finished matcher.

use serde_json::Value;
use tracing::debug;

use crate::dictionary::Dictionary;
use crate::error::CompileError;
use crate::expr::Expr;
use crate::planner::Planner;
use crate::refs::RefTable;

/// Reserved key recognized as the negation marker unless overridden.
pub const DEFAULT_NEGATION: &str = "!not";

/// Per-compilation configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Predicate vocabulary. `Default` leaves it empty; the `dragnet` facade
    /// supplies the built-in set.
    pub dictionary: Dictionary,
    /// Key recognized as the negation marker.
    pub negation: String,
    /// Guard-factoring pass. Disable to inspect or verify against the plain
    /// tree; the boolean results are identical either way.
    pub optimize: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dictionary: Dictionary::new(),
            negation: DEFAULT_NEGATION.to_string(),
            optimize: true,
        }
    }
}

impl Options {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            dictionary,
            ..Self::default()
        }
    }

    pub fn negation(mut self, token: impl Into<String>) -> Self {
        self.negation = token.into();
        self
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

/// A compiled query: the expression tree plus the reference table it
/// addresses.
///
/// Immutable once built, cheap to invoke, and safe to share across threads;
/// one matcher can filter any number of collections concurrently.
#[derive(Debug)]
pub struct Matcher {
    expr: Expr,
    refs: RefTable,
}

impl Matcher {
    /// Compile `query` with explicit options.
    pub fn compile_with(query: &Value, options: &Options) -> Result<Self, CompileError> {
        let mut planner = Planner::new(
            options.dictionary.clone(),
            options.negation.clone(),
            options.optimize,
        );
        let expr = planner.compile_query(query)?;
        let refs = planner.finish();
        debug!(optimize = options.optimize, refs = refs.len(), plan = %expr, "compiled query");
        Ok(Matcher { expr, refs })
    }

    /// Test one record against the compiled query. Total over any input
    /// shape and guaranteed not to panic.
    pub fn matches(&self, entry: &Value) -> bool {
        self.expr.eval(entry, &self.refs)
    }

    /// The compiled expression tree; its `Display` impl renders a stable
    /// textual plan for inspection and golden tests.
    pub fn plan(&self) -> &Expr {
        &self.expr
    }

    /// Borrowing filter over a collection of records.
    pub fn filter<'a, I>(&'a self, entries: I) -> impl Iterator<Item = &'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
        I::IntoIter: 'a,
    {
        entries.into_iter().filter(move |entry| self.matches(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Test;
    use crate::scope::ScopePath;
    use serde_json::json;

    fn dictionary() -> Dictionary {
        Dictionary::new().with(
            "$eq",
            |arg: &Value, scope: &ScopePath, _cx: &mut Planner| -> Result<Expr, CompileError> {
                Ok(Expr::test(scope.clone(), Test::Equals(arg.clone())))
            },
        )
    }

    #[test]
    fn test_compile_and_match() {
        let options = Options::new(dictionary());
        let matcher =
            Matcher::compile_with(&json!({"foo": {"$eq": "bar"}}), &options).unwrap();

        assert!(matcher.matches(&json!({"foo": "bar"})));
        assert!(!matcher.matches(&json!({"foo": "baz"})));
        assert!(!matcher.matches(&json!({})));
        assert!(!matcher.matches(&json!(null)));
    }

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(options.dictionary.is_empty());
        assert_eq!(options.negation, "!not");
        assert!(options.optimize);
    }

    #[test]
    fn test_option_builders() {
        let options = Options::new(dictionary()).negation("$not").optimize(false);
        assert_eq!(options.negation, "$not");
        assert!(!options.optimize);
        assert!(options.dictionary.contains("$eq"));
    }

    #[test]
    fn test_filter_borrows_entries() {
        let options = Options::new(dictionary());
        let matcher = Matcher::compile_with(&json!({"foo": {"$eq": 1}}), &options).unwrap();
        let entries = vec![json!({"foo": 1}), json!({"foo": 2}), json!({"foo": 1})];

        let kept: Vec<_> = matcher.filter(&entries).collect();
        assert_eq!(kept, [&entries[0], &entries[2]]);
    }

    #[test]
    fn test_plan_is_inspectable() {
        let options = Options::new(dictionary());
        let matcher = Matcher::compile_with(&json!({"foo": {"$eq": 1}}), &options).unwrap();
        assert_eq!(
            matcher.plan().to_string(),
            r#"(entry && entry["foo"] == 1)"#
        );
    }

    #[test]
    fn test_matcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Matcher>();
    }
}
