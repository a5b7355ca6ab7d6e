//! The built-in predicate vocabulary for the dragnet query compiler.
//!
//! Each capability turns a query-supplied argument into an expression over
//! the value at the current scope. Capabilities compose through the planner
//! where one predicate builds on another: `contains` rides on `typeOf`,
//! `isSet` on the `undefined`/`null` tags — so a dictionary that swaps one
//! out changes every predicate layered on top of it.

mod classes;

pub use classes::Classes;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use dragnet_core::{CompileError, Dictionary, Expr, Planner, ScopePath, Test, TypeTag};

static DEFAULT: Lazy<Dictionary> = Lazy::new(|| build(Classes::new()));

/// The default dictionary with no classes registered. `instanceOf` rejects
/// every argument until probes are supplied via [`default_dictionary_with`].
pub fn default_dictionary() -> Dictionary {
    DEFAULT.clone()
}

/// The default dictionary with `instanceOf` bound to `classes`.
pub fn default_dictionary_with(classes: Classes) -> Dictionary {
    build(classes)
}

fn build(classes: Classes) -> Dictionary {
    let mut dictionary = Dictionary::new();

    dictionary.register("equals", equals);
    dictionary.register("greaterThan", greater_than);
    dictionary.register("greaterThanOrEqualTo", greater_than_or_equal_to);
    dictionary.register("lessThan", less_than);
    dictionary.register("lessThanOrEqualTo", less_than_or_equal_to);
    dictionary.register("contains", contains);
    dictionary.register("beginsWith", begins_with);
    dictionary.register("endsWith", ends_with);
    dictionary.register("matches", matches);
    dictionary.register("typeOf", type_of);
    dictionary.register("isSet", is_set);
    dictionary.register("hasBeenTouched", has_been_touched);
    dictionary.register("not", not);

    dictionary.register(
        "instanceOf",
        move |arg: &Value, scope: &ScopePath, cx: &mut Planner| -> Result<Expr, CompileError> {
            let name = match arg {
                Value::String(name) => name,
                other => {
                    return Err(invalid_argument(
                        "instanceOf",
                        format!("expected a class name, got {}", TypeTag::of(Some(other))),
                    ))
                }
            };
            let probe = classes.resolve(name).cloned().ok_or_else(|| {
                invalid_argument("instanceOf", format!("unknown class `{name}`"))
            })?;
            let id = cx.register_probe(probe);
            Ok(Expr::test(scope.clone(), Test::Probe(id)))
        },
    );

    dictionary
}

/// Strict equality with the argument literal.
fn equals(arg: &Value, scope: &ScopePath, _cx: &mut Planner) -> Result<Expr, CompileError> {
    Ok(Expr::test(scope.clone(), Test::Equals(arg.clone())))
}

fn greater_than(arg: &Value, scope: &ScopePath, _cx: &mut Planner) -> Result<Expr, CompileError> {
    let arg = ordering_argument("greaterThan", arg)?;
    Ok(Expr::test(scope.clone(), Test::GreaterThan(arg)))
}

fn greater_than_or_equal_to(
    arg: &Value,
    scope: &ScopePath,
    _cx: &mut Planner,
) -> Result<Expr, CompileError> {
    let arg = ordering_argument("greaterThanOrEqualTo", arg)?;
    Ok(Expr::test(scope.clone(), Test::GreaterThanOrEqualTo(arg)))
}

fn less_than(arg: &Value, scope: &ScopePath, _cx: &mut Planner) -> Result<Expr, CompileError> {
    let arg = ordering_argument("lessThan", arg)?;
    Ok(Expr::test(scope.clone(), Test::LessThan(arg)))
}

fn less_than_or_equal_to(
    arg: &Value,
    scope: &ScopePath,
    _cx: &mut Planner,
) -> Result<Expr, CompileError> {
    let arg = ordering_argument("lessThanOrEqualTo", arg)?;
    Ok(Expr::test(scope.clone(), Test::LessThanOrEqualTo(arg)))
}

/// The value is a string containing the argument substring.
fn contains(arg: &Value, scope: &ScopePath, cx: &mut Planner) -> Result<Expr, CompileError> {
    let needle = string_argument("contains", arg)?;
    Ok(Expr::All(vec![
        cx.call("typeOf", &json!("string"), scope)?,
        Expr::test(scope.clone(), Test::Contains(needle)),
    ]))
}

fn begins_with(arg: &Value, scope: &ScopePath, cx: &mut Planner) -> Result<Expr, CompileError> {
    let prefix = string_argument("beginsWith", arg)?;
    Ok(Expr::All(vec![
        cx.call("typeOf", &json!("string"), scope)?,
        Expr::test(scope.clone(), Test::BeginsWith(prefix)),
    ]))
}

fn ends_with(arg: &Value, scope: &ScopePath, cx: &mut Planner) -> Result<Expr, CompileError> {
    let suffix = string_argument("endsWith", arg)?;
    Ok(Expr::All(vec![
        cx.call("typeOf", &json!("string"), scope)?,
        Expr::test(scope.clone(), Test::EndsWith(suffix)),
    ]))
}

/// The value is a string matched by the argument pattern. The regex is
/// compiled once, into the compilation's reference table.
fn matches(arg: &Value, scope: &ScopePath, cx: &mut Planner) -> Result<Expr, CompileError> {
    let pattern = string_argument("matches", arg)?;
    let regex =
        Regex::new(&pattern).map_err(|err| invalid_argument("matches", err.to_string()))?;
    let id = cx.register_regex(regex);
    Ok(Expr::All(vec![
        cx.call("typeOf", &json!("string"), scope)?,
        Expr::test(scope.clone(), Test::Matches(id)),
    ]))
}

fn type_of(arg: &Value, scope: &ScopePath, _cx: &mut Planner) -> Result<Expr, CompileError> {
    let tag: TypeTag = serde_json::from_value(arg.clone())
        .map_err(|_| invalid_argument("typeOf", format!("unrecognized type tag {arg}")))?;
    Ok(Expr::test(scope.clone(), Test::TypeOf(tag)))
}

/// Present and not null. Absent plays the role of `undefined`, so this is
/// the negation of `typeOf undefined || typeOf null`.
fn is_set(arg: &Value, scope: &ScopePath, cx: &mut Planner) -> Result<Expr, CompileError> {
    let expected = boolean_argument("isSet", arg)?;
    let unset = Expr::Any(vec![
        cx.call("typeOf", &json!("undefined"), scope)?,
        cx.call("typeOf", &json!("null"), scope)?,
    ]);
    Ok(if expected {
        Expr::Not(Box::new(unset))
    } else {
        unset
    })
}

/// The key exists on the containing object, whatever its value — null
/// included, which `isSet` deliberately is not.
fn has_been_touched(
    arg: &Value,
    scope: &ScopePath,
    _cx: &mut Planner,
) -> Result<Expr, CompileError> {
    let expected = boolean_argument("hasBeenTouched", arg)?;
    if scope.is_root() {
        // No containing key at the record root; the test degenerates to its
        // argument.
        return Ok(Expr::Const(expected));
    }
    let touched = Expr::test(scope.clone(), Test::Touched);
    Ok(if expected {
        touched
    } else {
        Expr::Not(Box::new(touched))
    })
}

/// Capability-level negation: compiles its argument as a nested fragment at
/// the same scope and inverts it.
fn not(arg: &Value, scope: &ScopePath, cx: &mut Planner) -> Result<Expr, CompileError> {
    Ok(Expr::Not(Box::new(cx.subplan(arg, scope)?)))
}

fn ordering_argument(name: &str, arg: &Value) -> Result<Value, CompileError> {
    match arg {
        Value::Number(_) | Value::String(_) => Ok(arg.clone()),
        other => Err(invalid_argument(
            name,
            format!(
                "expected a number or string, got {}",
                TypeTag::of(Some(other))
            ),
        )),
    }
}

fn string_argument(name: &str, arg: &Value) -> Result<String, CompileError> {
    match arg {
        Value::String(s) => Ok(s.clone()),
        other => Err(invalid_argument(
            name,
            format!("expected a string, got {}", TypeTag::of(Some(other))),
        )),
    }
}

/// Booleans may arrive as JSON booleans or as the strings
/// `"true"`/`"false"`.
fn boolean_argument(name: &str, arg: &Value) -> Result<bool, CompileError> {
    match arg {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(invalid_argument(
            name,
            format!(
                "expected a boolean or \"true\"/\"false\", got {}",
                TypeTag::of(Some(other))
            ),
        )),
    }
}

fn invalid_argument(name: &str, detail: String) -> CompileError {
    CompileError::InvalidArgument {
        name: name.to_string(),
        detail,
    }
}
