//! Guard factoring across sibling clauses.
//!
//! Sibling terms sharing an identical guard are merged so the guard is
//! evaluated once instead of once per term; their checks keep the level's
//! own combinator, so for every input the optimized and unoptimized trees
//! evaluate to the same boolean. They may differ in evaluation count, never
//! in result.

use crate::expr::{Expr, Guard};

/// Combinator of one compiled conjunction/disjunction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    And,
    Or,
}

impl Combinator {
    fn empty(&self) -> Expr {
        match self {
            // An empty conjunction imposes no constraint; an empty
            // disjunction has no alternative that can hold.
            Combinator::And => Expr::Const(true),
            Combinator::Or => Expr::Const(false),
        }
    }

    fn build(&self, terms: Vec<Expr>) -> Expr {
        match self {
            Combinator::And => Expr::All(terms),
            Combinator::Or => Expr::Any(terms),
        }
    }
}

/// Combine sibling terms of one level, factoring repeated guards when
/// `optimize` is set.
pub(crate) fn combine(op: Combinator, terms: Vec<Expr>, optimize: bool) -> Expr {
    let mut terms = if optimize && terms.len() > 1 {
        factor(op, terms)
    } else {
        terms
    };
    match terms.len() {
        0 => op.empty(),
        1 => terms.remove(0),
        _ => op.build(terms),
    }
}

/// Partition terms by guard identity. A term with no guard partner passes
/// through unchanged; terms sharing a guard collapse into one `Guarded`
/// whose checks are joined by the level's combinator. Each group sits at its
/// guard's first appearance, and the guard still evaluates before every
/// check it protects.
fn factor(op: Combinator, terms: Vec<Expr>) -> Vec<Expr> {
    let mut order: Vec<Result<Expr, usize>> = Vec::with_capacity(terms.len());
    let mut groups: Vec<(Guard, Vec<Expr>)> = Vec::new();

    for term in terms {
        match term {
            Expr::Guarded { guard, check } => {
                if let Some(position) = groups.iter().position(|(seen, _)| *seen == guard) {
                    groups[position].1.push(*check);
                } else {
                    order.push(Err(groups.len()));
                    groups.push((guard, vec![*check]));
                }
            }
            other => order.push(Ok(other)),
        }
    }

    let mut merged: Vec<Option<Expr>> = groups
        .into_iter()
        .map(|(guard, checks)| {
            // Recursing through `combine` cascades factoring into the merged
            // checks (chained guards from nested descents).
            Some(Expr::guarded(guard, combine(op, checks, true)))
        })
        .collect();

    order
        .into_iter()
        .filter_map(|slot| match slot {
            Ok(expr) => Some(expr),
            Err(index) => merged.get_mut(index).and_then(Option::take),
        })
        .collect()
}
