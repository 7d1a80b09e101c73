//! OID ranges and context-tagged ranges.
//!
//! A [`Scope`] is an interval of OIDs with independently inclusive or
//! exclusive ends; the upper end may be open. Managed objects declare the
//! scope they serve, and queries describe the window of OIDs they accept.
//! [`ContextScope`] adds the context (tenant) tag a registration lives in.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::oid::Oid;

/// An interval of OIDs.
///
/// `upper == None` means the scope has no upper bound and matches every OID
/// at or after its lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    lower: Oid,
    lower_included: bool,
    upper: Option<Oid>,
    upper_included: bool,
}

impl Scope {
    /// Create a scope from explicit bounds.
    pub fn new(lower: Oid, lower_included: bool, upper: Option<Oid>, upper_included: bool) -> Self {
        let upper_included = upper_included && upper.is_some();
        Self {
            lower,
            lower_included,
            upper,
            upper_included,
        }
    }

    /// A scope matching exactly one OID.
    pub fn exact(oid: Oid) -> Self {
        Self {
            lower: oid.clone(),
            lower_included: true,
            upper: Some(oid),
            upper_included: true,
        }
    }

    /// A scope matching `prefix` and everything below it.
    pub fn subtree(prefix: Oid) -> Self {
        let upper = prefix.next_peer();
        Self {
            lower: prefix,
            lower_included: true,
            upper,
            upper_included: false,
        }
    }

    /// An open-ended scope matching every OID strictly after `oid`.
    ///
    /// This is the window of a GETNEXT for `oid`.
    pub fn after(oid: Oid) -> Self {
        Self {
            lower: oid,
            lower_included: false,
            upper: None,
            upper_included: false,
        }
    }

    /// An open-ended scope matching `oid` and every OID after it.
    pub fn starting_at(oid: Oid) -> Self {
        Self {
            lower: oid,
            lower_included: true,
            upper: None,
            upper_included: false,
        }
    }

    /// Lower bound.
    pub fn lower_bound(&self) -> &Oid {
        &self.lower
    }

    /// Whether the lower bound itself is part of the scope.
    pub fn is_lower_included(&self) -> bool {
        self.lower_included
    }

    /// Upper bound, or `None` if unbounded.
    pub fn upper_bound(&self) -> Option<&Oid> {
        self.upper.as_ref()
    }

    /// Whether the upper bound itself is part of the scope.
    pub fn is_upper_included(&self) -> bool {
        self.upper_included
    }

    /// Returns `true` if the scope has no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.upper.is_none()
    }

    /// Returns `true` if no OID can fall inside the bounds.
    pub fn is_empty(&self) -> bool {
        match &self.upper {
            None => false,
            Some(upper) => match self.lower.cmp(upper) {
                Ordering::Less => false,
                Ordering::Equal => !(self.lower_included && self.upper_included),
                Ordering::Greater => true,
            },
        }
    }

    /// Returns `true` if `oid` lies inside this scope.
    pub fn contains(&self, oid: &Oid) -> bool {
        let above_lower = match oid.cmp(&self.lower) {
            Ordering::Greater => true,
            Ordering::Equal => self.lower_included,
            Ordering::Less => false,
        };
        above_lower
            && match &self.upper {
                None => true,
                Some(upper) => match oid.cmp(upper) {
                    Ordering::Less => true,
                    Ordering::Equal => self.upper_included,
                    Ordering::Greater => false,
                },
            }
    }

    /// The bounds as a pair usable with ordered-collection range queries.
    pub fn bounds(&self) -> (Bound<&Oid>, Bound<&Oid>) {
        let lower = if self.lower_included {
            Bound::Included(&self.lower)
        } else {
            Bound::Excluded(&self.lower)
        };
        let upper = match &self.upper {
            None => Bound::Unbounded,
            Some(u) if self.upper_included => Bound::Included(u),
            Some(u) => Bound::Excluded(u),
        };
        (lower, upper)
    }

    /// First entry of `map` whose key lies inside this scope.
    pub fn first_entry<'a, V>(&self, map: &'a BTreeMap<Oid, V>) -> Option<(&'a Oid, &'a V)> {
        if self.is_empty() {
            return None;
        }
        map.range::<Oid, _>(self.bounds()).next()
    }

    /// The intersection of two scopes, or `None` if they do not overlap.
    pub fn intersection(&self, other: &Scope) -> Option<Scope> {
        let (lower, lower_included) = match self.lower.cmp(&other.lower) {
            Ordering::Greater => (&self.lower, self.lower_included),
            Ordering::Less => (&other.lower, other.lower_included),
            Ordering::Equal => (&self.lower, self.lower_included && other.lower_included),
        };
        let (upper, upper_included) = match (&self.upper, &other.upper) {
            (None, None) => (None, false),
            (Some(u), None) => (Some(u), self.upper_included),
            (None, Some(u)) => (Some(u), other.upper_included),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Less => (Some(a), self.upper_included),
                Ordering::Greater => (Some(b), other.upper_included),
                Ordering::Equal => (Some(a), self.upper_included && other.upper_included),
            },
        };
        let candidate = Scope::new(lower.clone(), lower_included, upper.cloned(), upper_included);
        (!candidate.is_empty()).then_some(candidate)
    }

    /// Returns `true` if the two intervals share at least one point.
    pub fn overlaps(&self, other: &Scope) -> bool {
        self.intersection(other).is_some()
    }

    /// Returns `true` if `other` lies completely inside this scope.
    pub fn covers(&self, other: &Scope) -> bool {
        self.intersection(other).as_ref() == Some(other)
    }

    /// Narrow this scope's upper bound so it no longer overlaps `other`.
    ///
    /// `other` must cover the top end of this scope: it has to start strictly
    /// inside it and reach at least as far as its upper bound. Anything else
    /// would empty or split the scope and is rejected with
    /// [`Error::InvalidScope`]. Subtracting a disjoint scope is a no-op.
    pub fn subtract(&mut self, other: &Scope) -> Result<()> {
        if !self.overlaps(other) {
            return Ok(());
        }

        let starts_inside = match other.lower.cmp(&self.lower) {
            Ordering::Greater => true,
            Ordering::Equal => self.lower_included && !other.lower_included,
            Ordering::Less => false,
        };
        if !starts_inside {
            return Err(Error::invalid_scope(
                "subtracted scope covers the lower bound",
            ));
        }

        let reaches_top = match (&self.upper, &other.upper) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(mine), Some(theirs)) => match mine.cmp(theirs) {
                Ordering::Less => true,
                Ordering::Equal => other.upper_included || !self.upper_included,
                Ordering::Greater => false,
            },
        };
        if !reaches_top {
            return Err(Error::invalid_scope("subtraction would split the scope"));
        }

        let narrowed = Scope::new(
            self.lower.clone(),
            self.lower_included,
            Some(other.lower.clone()),
            !other.lower_included,
        );
        if narrowed.is_empty() {
            return Err(Error::invalid_scope("subtraction leaves an empty scope"));
        }
        *self = narrowed;
        Ok(())
    }

    /// Move the lower bound to the first point after `other`'s upper bound.
    pub(crate) fn move_lower_past(&mut self, other: &Scope) -> Result<()> {
        let Some(upper) = other.upper.clone() else {
            return Err(Error::invalid_scope(
                "cannot move past an unbounded scope",
            ));
        };
        self.lower = upper;
        self.lower_included = !other.upper_included;
        Ok(())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_included { '[' } else { '(' };
        write!(f, "{}{}, ", open, self.lower)?;
        match &self.upper {
            Some(upper) => {
                let close = if self.upper_included { ']' } else { ')' };
                write!(f, "{}{}", upper, close)
            }
            None => write!(f, "*)"),
        }
    }
}

/// A scope registered in (or queried from) a particular context.
///
/// `context == None` is the default context. An empty context name is the
/// same thing and is normalized away on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextScope {
    context: Option<Bytes>,
    scope: Scope,
}

impl ContextScope {
    /// Tag `scope` with `context`.
    pub fn new(context: Option<Bytes>, scope: Scope) -> Self {
        Self {
            context: normalize_context(context),
            scope,
        }
    }

    /// A scope in the default context.
    pub fn default_context(scope: Scope) -> Self {
        Self {
            context: None,
            scope,
        }
    }

    /// Context name, `None` for the default context.
    pub fn context(&self) -> Option<&Bytes> {
        self.context.as_ref()
    }

    /// Returns `true` for the default context.
    pub fn is_default_context(&self) -> bool {
        self.context.is_none()
    }

    /// The OID range.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub(crate) fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Returns `true` if both scopes are in the same context and overlap.
    pub fn overlaps(&self, other: &ContextScope) -> bool {
        self.context == other.context && self.scope.overlaps(&other.scope)
    }
}

impl fmt::Display for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{} in context \"{}\"", self.scope, String::from_utf8_lossy(ctx)),
            None => write!(f, "{}", self.scope),
        }
    }
}

/// Map the empty context name onto the default context.
pub(crate) fn normalize_context(context: Option<Bytes>) -> Option<Bytes> {
    context.filter(|c| !c.is_empty())
}
