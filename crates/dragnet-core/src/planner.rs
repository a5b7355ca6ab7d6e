//! The compiler: a recursive walk from query document to expression tree.

use serde_json::Value;
use tracing::trace;

use crate::dictionary::Dictionary;
use crate::error::CompileError;
use crate::expr::{Expr, Guard};
use crate::normalize::{classify, NodeShape};
use crate::optimize::{combine, Combinator};
use crate::refs::{RefEntry, RefId, RefTable, ValueProbe};
use crate::scope::ScopePath;

/// Per-compilation state: the active dictionary, the negation token, the
/// optimize flag, and the owned reference table.
///
/// One planner exists per `compile` call and is dropped once the matcher is
/// produced; the reference table moves into the matcher, so indices
/// registered here can never leak into another compilation's tree.
pub struct Planner {
    dictionary: Dictionary,
    negation: String,
    optimize: bool,
    refs: RefTable,
}

impl Planner {
    pub(crate) fn new(dictionary: Dictionary, negation: String, optimize: bool) -> Self {
        Self {
            dictionary,
            negation,
            optimize,
            refs: RefTable::default(),
        }
    }

    pub(crate) fn compile_query(&mut self, query: &Value) -> Result<Expr, CompileError> {
        self.compile_node(query, &ScopePath::root())
    }

    pub(crate) fn finish(self) -> RefTable {
        self.refs
    }

    /// Compile a nested query fragment at `scope`.
    ///
    /// This is how a capability reuses the planner's walk, e.g. a
    /// capability-level `not` compiling its argument before inverting it.
    pub fn subplan(&mut self, node: &Value, scope: &ScopePath) -> Result<Expr, CompileError> {
        self.compile_node(node, scope)
    }

    /// Invoke another capability by name: the composition facility.
    ///
    /// The returned expression is validated against the current reference
    /// table; a tree holding indices this compilation never issued is
    /// rejected as [`CompileError::InvalidCapabilityResult`].
    pub fn call(
        &mut self,
        name: &str,
        arg: &Value,
        scope: &ScopePath,
    ) -> Result<Expr, CompileError> {
        let capability = self.dictionary.resolve(name).cloned().ok_or_else(|| {
            CompileError::UnknownPredicate {
                name: name.to_string(),
                valid_names: self.dictionary.names(),
            }
        })?;
        trace!(predicate = name, scope = %scope, "invoking capability");
        let expr = capability(arg, scope, self)?;
        if !expr.refs_in_bounds(self.refs.len()) {
            return Err(CompileError::InvalidCapabilityResult {
                name: name.to_string(),
            });
        }
        Ok(expr)
    }

    /// Store a compiled regex in this compilation's reference table.
    pub fn register_regex(&mut self, regex: regex::Regex) -> RefId {
        self.refs.push(RefEntry::Regex(regex))
    }

    /// Store an opaque probe in this compilation's reference table.
    pub fn register_probe(&mut self, probe: std::sync::Arc<ValueProbe>) -> RefId {
        self.refs.push(RefEntry::Probe(probe))
    }

    fn compile_node(&mut self, node: &Value, scope: &ScopePath) -> Result<Expr, CompileError> {
        match classify(node) {
            NodeShape::Disjunction(items) => {
                let terms = items
                    .iter()
                    .map(|item| self.compile_node(item, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(combine(Combinator::Or, terms, self.optimize))
            }
            NodeShape::Conjunction(map) => {
                let mut terms = Vec::with_capacity(map.len());
                for (key, spec) in map {
                    terms.push(self.compile_property(key, spec, scope)?);
                }
                Ok(combine(Combinator::And, terms, self.optimize))
            }
            NodeShape::Always => Ok(Expr::Const(true)),
        }
    }

    /// One conjunction term. Resolution order: negation token, dictionary,
    /// nested structure.
    fn compile_property(
        &mut self,
        key: &str,
        spec: &Value,
        scope: &ScopePath,
    ) -> Result<Expr, CompileError> {
        if key == self.negation {
            // Same scope; double negation stays two nested NOT nodes.
            let inner = self.compile_node(spec, scope)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.dictionary.contains(key) {
            return self.call(key, spec, scope);
        }
        match spec {
            Value::Object(map) if !map.is_empty() => {
                let child = scope.child(key);
                let inner = self.compile_node(spec, &child)?;
                Ok(Expr::guarded(
                    Guard {
                        scope: scope.clone(),
                    },
                    inner,
                ))
            }
            Value::Array(items) => {
                // One scope for every element. Each branch carries its own
                // copy of the descent guard; the optimizer factors them back
                // together.
                let child = scope.child(key);
                let terms = items
                    .iter()
                    .map(|item| {
                        let branch = self.compile_node(item, &child)?;
                        Ok(Expr::guarded(
                            Guard {
                                scope: scope.clone(),
                            },
                            branch,
                        ))
                    })
                    .collect::<Result<Vec<_>, CompileError>>()?;
                Ok(combine(Combinator::Or, terms, self.optimize))
            }
            _ => Err(CompileError::UnknownPredicate {
                name: key.to_string(),
                valid_names: self.dictionary.names(),
            }),
        }
    }
}
