//! Core machinery for compiling JSON-shaped query documents into reusable
//! boolean matchers over structured records.
//!
//! A query is classified structurally (array = OR of alternatives, object =
//! AND of property terms), walked once by the [`Planner`] against a
//! pluggable predicate [`Dictionary`], optionally guard-factored, and frozen
//! into a [`Matcher`] that can be invoked indefinitely and concurrently.
//! Compilation owns all of its state — in particular the [`RefTable`] of
//! opaque predicate arguments — so independent compilations can never
//! corrupt each other.
//!
//! This crate carries the machinery only; the built-in predicate set lives
//! in `dragnet-dictionary`, and the `dragnet` facade binds the two.

// ===== Compilation pipeline =====
pub mod dictionary;
pub mod normalize;
pub mod planner;

// ===== Runtime artifacts =====
pub mod expr;
pub mod matcher;
pub mod refs;

// ===== Shared vocabulary =====
pub mod error;
pub mod scope;
pub mod value;

// Internal rewrite pass; reachable through `Options::optimize`.
mod optimize;

pub use dictionary::{CapabilityFn, Dictionary};
pub use error::CompileError;
pub use expr::{Expr, Guard, Test};
pub use matcher::{Matcher, Options, DEFAULT_NEGATION};
pub use normalize::{classify, NodeShape};
pub use planner::Planner;
pub use refs::{RefEntry, RefId, RefTable, ValueProbe};
pub use scope::ScopePath;
pub use value::TypeTag;
