//! Ordering of scopes and queries.
//!
//! The registry keeps its entries sorted by [`ContextScope`] and answers
//! lookups by binary-searching with a [`Query`] as the probe. Both kinds of
//! key are ordered by [`compare`]:
//!
//! - scope vs scope: context (only when both are tagged), then lower bound,
//!   then a tagged scope before an untagged one, then the remaining bounds;
//! - scope vs query: context (only when both are tagged), then an unbounded
//!   scope is greater than any query, otherwise the scope's upper bound is
//!   compared with the query's lower bound, and equal bounds only compare
//!   equal when both are inclusive;
//! - query vs scope is the reverse of scope vs query;
//! - query vs query orders the query windows like scopes.
//!
//! Within one context (or one context plus the default context) this is a
//! total order. Across two different named contexts it is not transitive,
//! which is why the registry keeps one sorted partition per context.

use std::cmp::Ordering;
use std::ptr;

use bytes::Bytes;

use crate::query::Query;
use crate::scope::{ContextScope, Scope};

/// A key that can be placed in the registry's ordering.
#[derive(Debug, Clone, Copy)]
pub enum Ordered<'a> {
    /// A registered (or to-be-registered) scope.
    Scope(&'a ContextScope),
    /// A lookup probe.
    Query(&'a Query),
}

impl<'a> From<&'a ContextScope> for Ordered<'a> {
    fn from(scope: &'a ContextScope) -> Self {
        Ordered::Scope(scope)
    }
}

impl<'a> From<&'a Query> for Ordered<'a> {
    fn from(query: &'a Query) -> Self {
        Ordered::Query(query)
    }
}

/// Compare two keys.
pub fn compare(a: Ordered<'_>, b: Ordered<'_>) -> Ordering {
    match (a, b) {
        (Ordered::Scope(x), Ordered::Scope(y)) => {
            if ptr::eq(x, y) {
                return Ordering::Equal;
            }
            compare_scopes(x, y)
        }
        (Ordered::Query(x), Ordered::Query(y)) => {
            if ptr::eq(x, y) {
                return Ordering::Equal;
            }
            compare_scopes(x.scope(), y.scope())
        }
        (Ordered::Scope(s), Ordered::Query(q)) => compare_scope_to_query(s, q),
        (Ordered::Query(q), Ordered::Scope(s)) => compare_scope_to_query(s, q).reverse(),
    }
}

/// Contexts only decide when both sides are tagged.
fn compare_contexts(a: Option<&Bytes>, b: Option<&Bytes>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.as_ref().cmp(b.as_ref()),
        _ => Ordering::Equal,
    }
}

fn compare_scopes(a: &ContextScope, b: &ContextScope) -> Ordering {
    compare_contexts(a.context(), b.context())
        .then_with(|| a.scope().lower_bound().cmp(b.scope().lower_bound()))
        .then_with(|| match (a.context(), b.context()) {
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        })
        .then_with(|| compare_remaining_bounds(a.scope(), b.scope()))
}

// Tiebreak for scopes sharing context and lower bound: inclusive lower first,
// then the narrower upper end first.
fn compare_remaining_bounds(a: &Scope, b: &Scope) -> Ordering {
    b.is_lower_included()
        .cmp(&a.is_lower_included())
        .then_with(|| match (a.upper_bound(), b.upper_bound()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(y),
        })
        .then_with(|| a.is_upper_included().cmp(&b.is_upper_included()))
}

fn compare_scope_to_query(scope: &ContextScope, query: &Query) -> Ordering {
    let by_context = compare_contexts(scope.context(), query.context());
    if by_context != Ordering::Equal {
        return by_context;
    }
    let Some(upper) = scope.scope().upper_bound() else {
        return Ordering::Greater;
    };
    match upper.cmp(query.lower_bound()) {
        Ordering::Equal
            if scope.scope().is_upper_included()
                && query.scope().scope().is_lower_included() =>
        {
            Ordering::Equal
        }
        Ordering::Equal => Ordering::Less,
        other => other,
    }
}
