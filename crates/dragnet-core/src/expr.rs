//! The compiled boolean-expression tree and its evaluation.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::refs::{RefId, RefTable};
use crate::scope::ScopePath;
use crate::value::{self, TypeTag};

/// A cheap precondition factored across sibling clauses. Guards gate
/// dereference safety, so they always evaluate before the checks they
/// protect.
///
/// The root guard admits any truthy record; a guard on a deeper scope
/// requires the intermediate value to exist and be dereferenceable, which is
/// what turns a malformed intermediate into `false` instead of a deeper
/// access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub scope: ScopePath,
}

impl Guard {
    pub fn holds(&self, entry: &Value) -> bool {
        if self.scope.is_root() {
            return value::is_truthy(entry);
        }
        value::locate(entry, &self.scope).is_some_and(value::is_dereferenceable)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_root() {
            f.write_str("entry")
        } else {
            write!(f, "object({})", self.scope)
        }
    }
}

/// A leaf comparison against the value located at the enclosing scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    /// Strict equality with a literal (numeric across number encodings).
    Equals(Value),
    GreaterThan(Value),
    GreaterThanOrEqualTo(Value),
    LessThan(Value),
    LessThanOrEqualTo(Value),
    /// Substring containment; the located value must be a string.
    Contains(String),
    BeginsWith(String),
    EndsWith(String),
    /// Regular-expression match against a table-stored regex.
    Matches(RefId),
    /// Runtime type-tag check.
    TypeOf(TypeTag),
    /// The key exists on the containing object, whatever its value.
    Touched,
    /// Opaque probe from the reference table (class checks et al).
    Probe(RefId),
}

impl Test {
    fn eval(&self, scope: &ScopePath, entry: &Value, refs: &RefTable) -> bool {
        let located = value::locate(entry, scope);
        match self {
            Test::Equals(expected) => {
                located.is_some_and(|actual| value::values_equal(actual, expected))
            }
            Test::GreaterThan(arg) => ordered(located, arg, |o| o == Ordering::Greater),
            Test::GreaterThanOrEqualTo(arg) => ordered(located, arg, |o| o != Ordering::Less),
            Test::LessThan(arg) => ordered(located, arg, |o| o == Ordering::Less),
            Test::LessThanOrEqualTo(arg) => ordered(located, arg, |o| o != Ordering::Greater),
            Test::Contains(needle) => with_str(located, |s| s.contains(needle.as_str())),
            Test::BeginsWith(prefix) => with_str(located, |s| s.starts_with(prefix.as_str())),
            Test::EndsWith(suffix) => with_str(located, |s| s.ends_with(suffix.as_str())),
            Test::Matches(id) => match (located, refs.regex(*id)) {
                (Some(Value::String(s)), Some(regex)) => regex.is_match(s),
                _ => false,
            },
            Test::TypeOf(tag) => tag.admits(TypeTag::of(located)),
            Test::Touched => value::locate_container(entry, scope)
                .is_some_and(|(map, key)| map.contains_key(key)),
            Test::Probe(id) => match (located, refs.probe(*id)) {
                (Some(actual), Some(probe)) => probe(actual),
                _ => false,
            },
        }
    }

    fn refs_in_bounds(&self, len: usize) -> bool {
        match self {
            Test::Matches(id) | Test::Probe(id) => id.index() < len,
            _ => true,
        }
    }
}

fn ordered(located: Option<&Value>, arg: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    located
        .and_then(|actual| value::compare_values(actual, arg))
        .map_or(false, accept)
}

fn with_str(located: Option<&Value>, test: impl Fn(&str) -> bool) -> bool {
    match located {
        Some(Value::String(s)) => test(s),
        _ => false,
    }
}

/// Compiled boolean expression. Evaluation is total and never panics; the
/// tree plus its reference table is the whole of a matcher's state.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(bool),
    /// Conjunction of sibling terms.
    All(Vec<Expr>),
    /// Disjunction of sibling terms.
    Any(Vec<Expr>),
    Not(Box<Expr>),
    /// `guard && check`, with the guard factorable across siblings.
    Guarded { guard: Guard, check: Box<Expr> },
    /// Dictionary-produced leaf test.
    Test { scope: ScopePath, test: Test },
}

impl Expr {
    pub fn test(scope: ScopePath, test: Test) -> Expr {
        Expr::Test { scope, test }
    }

    pub fn guarded(guard: Guard, check: Expr) -> Expr {
        Expr::Guarded {
            guard,
            check: Box::new(check),
        }
    }

    pub fn eval(&self, entry: &Value, refs: &RefTable) -> bool {
        match self {
            Expr::Const(value) => *value,
            Expr::All(terms) => terms.iter().all(|term| term.eval(entry, refs)),
            Expr::Any(terms) => terms.iter().any(|term| term.eval(entry, refs)),
            Expr::Not(inner) => !inner.eval(entry, refs),
            Expr::Guarded { guard, check } => guard.holds(entry) && check.eval(entry, refs),
            Expr::Test { scope, test } => test.eval(scope, entry, refs),
        }
    }

    /// Every `RefId` in the tree must address the compilation's own table.
    pub(crate) fn refs_in_bounds(&self, len: usize) -> bool {
        match self {
            Expr::Const(_) => true,
            Expr::All(terms) | Expr::Any(terms) => {
                terms.iter().all(|term| term.refs_in_bounds(len))
            }
            Expr::Not(inner) => inner.refs_in_bounds(len),
            Expr::Guarded { check, .. } => check.refs_in_bounds(len),
            Expr::Test { test, .. } => test.refs_in_bounds(len),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{value}"),
            Expr::All(terms) => write_joined(f, terms, " && "),
            Expr::Any(terms) => write_joined(f, terms, " || "),
            Expr::Not(inner) => write!(f, "!({inner})"),
            Expr::Guarded { guard, check } => write!(f, "({guard} && {check})"),
            Expr::Test { scope, test } => match test {
                Test::Equals(arg) => write!(f, "{scope} == {arg}"),
                Test::GreaterThan(arg) => write!(f, "{scope} > {arg}"),
                Test::GreaterThanOrEqualTo(arg) => write!(f, "{scope} >= {arg}"),
                Test::LessThan(arg) => write!(f, "{scope} < {arg}"),
                Test::LessThanOrEqualTo(arg) => write!(f, "{scope} <= {arg}"),
                Test::Contains(needle) => write!(f, "contains({scope}, {needle:?})"),
                Test::BeginsWith(prefix) => write!(f, "begins_with({scope}, {prefix:?})"),
                Test::EndsWith(suffix) => write!(f, "ends_with({scope}, {suffix:?})"),
                Test::Matches(id) => write!(f, "matches({scope}, {id})"),
                Test::TypeOf(tag) => write!(f, "type_of({scope}) == {:?}", tag.as_str()),
                Test::Touched => write!(f, "touched({scope})"),
                Test::Probe(id) => write!(f, "{id}({scope})"),
            },
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Expr], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (index, term) in terms.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::RefEntry;
    use serde_json::json;
    use std::sync::Arc;

    fn at(segments: &[&str]) -> ScopePath {
        segments
            .iter()
            .fold(ScopePath::root(), |path, segment| path.child(segment))
    }

    #[test]
    fn test_root_guard_admits_any_truthy_record() {
        let root = Guard {
            scope: ScopePath::root(),
        };
        assert!(root.holds(&json!({})));
        assert!(root.holds(&json!([1])));
        assert!(root.holds(&json!("str")));
        assert!(root.holds(&json!(5)));
        assert!(!root.holds(&json!(null)));
        assert!(!root.holds(&json!(0)));
        assert!(!root.holds(&json!(false)));
    }

    #[test]
    fn test_descent_guard_requires_a_dereferenceable_intermediate() {
        let nested = Guard { scope: at(&["a"]) };
        assert!(nested.holds(&json!({"a": {"b": 1}})));
        assert!(nested.holds(&json!({"a": []})));
        assert!(!nested.holds(&json!({"a": 1})));
        assert!(!nested.holds(&json!({"a": "str"})));
        assert!(!nested.holds(&json!({})));
    }

    #[test]
    fn test_leaf_tests() {
        let refs = RefTable::default();
        let entry = json!({"foo": "bar", "n": 5, "nil": null});

        let eq = Expr::test(at(&["foo"]), Test::Equals(json!("bar")));
        assert!(eq.eval(&entry, &refs));
        assert!(!eq.eval(&json!({"foo": "baz"}), &refs));
        assert!(!eq.eval(&json!({}), &refs));

        let gt = Expr::test(at(&["n"]), Test::GreaterThan(json!(4)));
        assert!(gt.eval(&entry, &refs));
        // No coercion: a number field against a string argument is false.
        let gt_str = Expr::test(at(&["n"]), Test::GreaterThan(json!("4")));
        assert!(!gt_str.eval(&entry, &refs));

        let touched = Expr::test(at(&["nil"]), Test::Touched);
        assert!(touched.eval(&entry, &refs));
        assert!(!touched.eval(&json!({}), &refs));
    }

    #[test]
    fn test_ref_backed_tests_fail_closed_on_missing_entries() {
        let refs = RefTable::default();
        let entry = json!({"s": "abc"});

        let matches = Expr::test(at(&["s"]), Test::Matches(RefId(0)));
        assert!(!matches.eval(&entry, &refs));
        let probe = Expr::test(at(&["s"]), Test::Probe(RefId(0)));
        assert!(!probe.eval(&entry, &refs));
    }

    #[test]
    fn test_ref_backed_tests_eval_through_the_table() {
        let mut refs = RefTable::default();
        let regex_id = refs.push(RefEntry::Regex(regex::Regex::new("^ab").unwrap()));
        let probe_id = refs.push(RefEntry::Probe(Arc::new(|v: &Value| {
            v.as_i64().is_some_and(|n| n % 2 == 0)
        })));

        let matches = Expr::test(at(&["s"]), Test::Matches(regex_id));
        assert!(matches.eval(&json!({"s": "abc"}), &refs));
        assert!(!matches.eval(&json!({"s": "xabc"}), &refs));
        assert!(!matches.eval(&json!({"s": 5}), &refs));

        let probe = Expr::test(at(&["n"]), Test::Probe(probe_id));
        assert!(probe.eval(&json!({"n": 4}), &refs));
        assert!(!probe.eval(&json!({"n": 5}), &refs));
    }

    #[test]
    fn test_double_negation_round_trips() {
        let refs = RefTable::default();
        let inner = Expr::test(at(&["foo"]), Test::Equals(json!(1)));
        let double = Expr::Not(Box::new(Expr::Not(Box::new(inner.clone()))));

        for entry in [json!({"foo": 1}), json!({"foo": 2}), json!({})] {
            assert_eq!(double.eval(&entry, &refs), inner.eval(&entry, &refs));
        }
    }

    #[test]
    fn test_refs_in_bounds() {
        let tree = Expr::All(vec![
            Expr::guarded(
                Guard {
                    scope: ScopePath::root(),
                },
                Expr::test(at(&["s"]), Test::Matches(RefId(1))),
            ),
            Expr::Not(Box::new(Expr::test(at(&["x"]), Test::Probe(RefId(0))))),
        ]);
        assert!(tree.refs_in_bounds(2));
        assert!(!tree.refs_in_bounds(1));
    }

    #[test]
    fn test_display() {
        let tree = Expr::guarded(
            Guard {
                scope: ScopePath::root(),
            },
            Expr::All(vec![
                Expr::test(at(&["foo"]), Test::Equals(json!("bar"))),
                Expr::Not(Box::new(Expr::test(
                    at(&["n"]),
                    Test::LessThan(json!(5)),
                ))),
            ]),
        );
        assert_eq!(
            tree.to_string(),
            r#"(entry && (entry["foo"] == "bar" && !(entry["n"] < 5)))"#
        );
    }
}
