//! Compile-time error taxonomy.
//!
//! Every failure is raised synchronously during compilation and aborts that
//! `compile` call; a finished matcher never raises.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A key is neither a known predicate nor resolvable as nested
    /// structure.
    #[error("unknown predicate `{name}`; known predicates: {}", valid_names.join(", "))]
    UnknownPredicate {
        name: String,
        valid_names: Vec<String>,
    },

    /// A capability returned a tree addressing entries outside this
    /// compilation's reference table.
    #[error("capability `{name}` returned a malformed expression")]
    InvalidCapabilityResult { name: String },

    /// A capability rejected its argument.
    #[error("invalid argument for `{name}`: {detail}")]
    InvalidArgument { name: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_predicate_lists_valid_names() {
        let err = CompileError::UnknownPredicate {
            name: "bogus".to_string(),
            valid_names: vec!["$eq".to_string(), "$lt".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown predicate `bogus`; known predicates: $eq, $lt"
        );
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = CompileError::InvalidArgument {
            name: "greaterThan".to_string(),
            detail: "expected a number or string, got boolean".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid argument for `greaterThan`: expected a number or string, got boolean"
        );
    }
}
