//! Value access and comparison helpers shared by guard and test evaluation.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::scope::ScopePath;

/// JS-style runtime type tags, with `array` and `null` split out from the
/// generic `object` tag. Absence of a value plays the role of `undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Undefined,
}

impl TypeTag {
    /// Tag of a located value.
    pub fn of(value: Option<&Value>) -> TypeTag {
        match value {
            None => TypeTag::Undefined,
            Some(Value::Null) => TypeTag::Null,
            Some(Value::Bool(_)) => TypeTag::Boolean,
            Some(Value::Number(_)) => TypeTag::Number,
            Some(Value::String(_)) => TypeTag::String,
            Some(Value::Array(_)) => TypeTag::Array,
            Some(Value::Object(_)) => TypeTag::Object,
        }
    }

    /// Whether a value of tag `actual` satisfies a type test for `self`.
    ///
    /// `object` also admits arrays (their runtime tag in the source language
    /// is `object`); `array` and `null` only match exactly, and `null` never
    /// satisfies `object`.
    pub fn admits(&self, actual: TypeTag) -> bool {
        match self {
            TypeTag::Object => matches!(actual, TypeTag::Object | TypeTag::Array),
            tag => *tag == actual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Null => "null",
            TypeTag::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Walk `path` from the record root. Absent keys and non-object
/// intermediates yield `None`; nothing panics for any input shape.
pub fn locate<'a>(entry: &'a Value, path: &ScopePath) -> Option<&'a Value> {
    let mut current = entry;
    for segment in path.segments() {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// The containing object and final key for a non-root path, if the
/// containing value exists and is an object.
pub fn locate_container<'e, 'p>(
    entry: &'e Value,
    path: &'p ScopePath,
) -> Option<(&'e Map<String, Value>, &'p str)> {
    let (init, last) = path.split_last()?;
    let mut current = entry;
    for segment in init {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    match current {
        Value::Object(map) => Some((map, last)),
        _ => None,
    }
}

/// Whether a value can be descended into (JSON object or array).
pub fn is_dereferenceable(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Source-language truthiness: null, `false`, zero, and the empty string
/// are falsy; every object and array is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strict equality, except numbers compare numerically so the i64/u64/f64
/// encodings of the same quantity are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Natural ordering for same-typed scalars: numeric for numbers,
/// lexicographic for strings. Mixed or non-scalar operands do not order.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    // Exact integer fast paths before falling back to f64.
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => None,
    }
}
