//! Registry queries.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::handler::ManagedObject;
use crate::oid::Oid;
use crate::scope::{ContextScope, Scope};

/// Extra acceptance test applied to every candidate object of a query.
pub type QueryFilter = Arc<dyn Fn(&dyn ManagedObject) -> bool + Send + Sync>;

/// A request to find the managed object serving a window of OIDs.
///
/// Queries never change registry state. The optional `source` identifies the
/// logical operation that issued the query (the request engine uses the
/// transaction id), so refresh strategies can tell a repeated ask from a new
/// one.
#[derive(Clone)]
pub struct Query {
    scope: ContextScope,
    write_access: bool,
    source: Option<u64>,
    filter: Option<QueryFilter>,
}

impl Query {
    /// Query for objects overlapping `scope`.
    pub fn new(scope: ContextScope) -> Self {
        Self {
            scope,
            write_access: false,
            source: None,
            filter: None,
        }
    }

    /// Query for the object serving exactly `oid`.
    pub fn exact(context: Option<Bytes>, oid: Oid) -> Self {
        Self::new(ContextScope::new(context, Scope::exact(oid)))
    }

    /// Query for the first object serving anything after `oid`.
    pub fn after(context: Option<Bytes>, oid: Oid) -> Self {
        Self::new(ContextScope::new(context, Scope::after(oid)))
    }

    /// Mark the query as issued on behalf of a write.
    pub fn for_write(mut self, write_access: bool) -> Self {
        self.write_access = write_access;
        self
    }

    /// Tag the query with the identity of the operation issuing it.
    pub fn with_source(mut self, source: u64) -> Self {
        self.source = Some(source);
        self
    }

    /// Restrict matches with an additional predicate.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn ManagedObject) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// The OID window and context.
    pub fn scope(&self) -> &ContextScope {
        &self.scope
    }

    /// Context of the query, `None` for the default context.
    pub fn context(&self) -> Option<&Bytes> {
        self.scope.context()
    }

    /// Lower bound of the OID window.
    pub fn lower_bound(&self) -> &Oid {
        self.scope.scope().lower_bound()
    }

    /// Returns `true` if the query was issued on behalf of a write.
    pub fn is_write_access(&self) -> bool {
        self.write_access
    }

    /// Identity of the issuing operation, if any.
    pub fn source(&self) -> Option<u64> {
        self.source
    }

    /// Returns `true` if both queries carry the same source.
    pub fn is_same_source(&self, other: &Query) -> bool {
        matches!((self.source, other.source), (Some(a), Some(b)) if a == b)
    }

    /// Final acceptance test for a candidate whose scope overlaps the query.
    ///
    /// Without a filter every candidate matches.
    pub fn matches(&self, object: &dyn ManagedObject) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(object))
    }

    /// Move the lower bound past the end of `scope`.
    ///
    /// Used when the object serving `scope` had nothing further to offer, so
    /// the next lookup continues with the following registration. Fails for
    /// an unbounded `scope`, since nothing lies beyond it.
    pub fn advance_past(&mut self, scope: &Scope) -> Result<()> {
        self.scope.scope_mut().move_lower_past(scope)
    }

    /// Restart the window strictly after `oid`, keeping the upper bound.
    pub fn restart_after(&mut self, oid: Oid) {
        let scope = self.scope.scope();
        let upper = scope.upper_bound().cloned();
        let upper_included = scope.is_upper_included();
        *self.scope.scope_mut() = Scope::new(oid, false, upper, upper_included);
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("scope", &self.scope)
            .field("write_access", &self.write_access)
            .field("source", &self.source)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{GetNextResult, GetResult, RequestContext};
    use crate::oid;

    struct Dummy;

    impl ManagedObject for Dummy {
        fn scope(&self) -> Scope {
            Scope::subtree(oid!(1, 3, 6, 1, 4, 1, 99999))
        }

        fn get(&self, _ctx: &RequestContext, _oid: &Oid) -> GetResult {
            GetResult::NoSuchInstance
        }

        fn next(&self, _ctx: &RequestContext, _query: &Query) -> GetNextResult {
            GetNextResult::EndOfMibView
        }
    }

    #[test]
    fn test_matches_defaults_to_true() {
        let q = Query::exact(None, oid!(1, 3, 6, 1, 4, 1, 99999, 1, 0));
        assert!(q.matches(&Dummy));

        let q = q.with_filter(|obj| obj.scope().lower_bound().len() > 20);
        assert!(!q.matches(&Dummy));
    }

    #[test]
    fn test_is_same_source() {
        let a = Query::exact(None, oid!(1)).with_source(7);
        let b = Query::after(None, oid!(2)).with_source(7);
        let c = Query::exact(None, oid!(1)).with_source(8);
        let none = Query::exact(None, oid!(1));
        assert!(a.is_same_source(&b));
        assert!(!a.is_same_source(&c));
        assert!(!none.is_same_source(&none.clone()));
    }

    #[test]
    fn test_advance_past() {
        let mut q = Query::after(None, oid!(1, 3));
        q.advance_past(&Scope::subtree(oid!(1, 3, 6))).unwrap();
        assert_eq!(q.lower_bound(), &oid!(1, 3, 7));
        assert!(q.scope().scope().is_lower_included());
        assert!(q.advance_past(&Scope::starting_at(oid!(2))).is_err());
    }

    #[test]
    fn test_restart_after() {
        let mut q = Query::after(None, oid!(1, 3));
        q.restart_after(oid!(1, 3, 6, 1, 5));
        assert!(!q.scope().scope().contains(&oid!(1, 3, 6, 1, 5)));
        assert!(q.scope().scope().contains(&oid!(1, 3, 6, 1, 5, 0)));
        assert!(q.scope().scope().is_unbounded());
    }
}
