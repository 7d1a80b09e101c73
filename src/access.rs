//! Access control seam.
//!
//! The request engine asks an [`AccessControl`] implementation once per
//! addressed OID before touching the managed object. The decision itself is
//! external; this module only defines the predicate and two simple
//! implementations ([`AllowAll`] and the view-based [`ViewAccess`]).
//!
//! When access is denied:
//! - **SET**: `noAccess` at the variable's position (`noSuchName` for SNMPv1)
//! - **GET**: the variable is answered with `noSuchObject`
//! - **GETNEXT/GETBULK**: the OID is skipped and the walk continues after it

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use crate::oid::Oid;

/// Security model identifiers (RFC 3411).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecurityModel {
    /// Wildcard, matches any model.
    Any = 0,
    /// SNMPv1 community-based.
    V1 = 1,
    /// SNMPv2c community-based.
    #[default]
    V2c = 2,
    /// SNMPv3 User-based Security Model.
    Usm = 3,
}

/// Security level (RFC 3411).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SecurityLevel {
    /// No authentication, no privacy.
    #[default]
    NoAuthNoPriv,
    /// Authentication without privacy.
    AuthNoPriv,
    /// Authentication and privacy.
    AuthPriv,
}

/// Which view an access decision is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// GET, GETNEXT and GETBULK.
    Read,
    /// SET.
    Write,
    /// Notification generation.
    Notify,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Read => write!(f, "read"),
            ViewKind::Write => write!(f, "write"),
            ViewKind::Notify => write!(f, "notify"),
        }
    }
}

/// Decides whether a principal may touch an OID.
///
/// Implementations must be pure: the engine may call `allowed` several times
/// for the same OID while walking.
///
/// Any `Fn` with the same signature implements this trait:
///
/// ```rust
/// use snmp_agent_core::access::{AccessControl, ViewKind};
/// use snmp_agent_core::oid;
///
/// let read_only = |_ctx: Option<&bytes::Bytes>,
///                  _principal: &[u8],
///                  _model: snmp_agent_core::access::SecurityModel,
///                  _level: snmp_agent_core::access::SecurityLevel,
///                  kind: ViewKind,
///                  _oid: &snmp_agent_core::Oid| kind == ViewKind::Read;
/// # let _: &dyn AccessControl = &read_only;
/// ```
pub trait AccessControl: Send + Sync + 'static {
    /// Returns `true` if access is granted.
    fn allowed(
        &self,
        context: Option<&Bytes>,
        principal: &[u8],
        model: SecurityModel,
        level: SecurityLevel,
        kind: ViewKind,
        oid: &Oid,
    ) -> bool;
}

impl<F> AccessControl for F
where
    F: Fn(Option<&Bytes>, &[u8], SecurityModel, SecurityLevel, ViewKind, &Oid) -> bool
        + Send
        + Sync
        + 'static,
{
    fn allowed(
        &self,
        context: Option<&Bytes>,
        principal: &[u8],
        model: SecurityModel,
        level: SecurityLevel,
        kind: ViewKind,
        oid: &Oid,
    ) -> bool {
        self(context, principal, model, level, kind, oid)
    }
}

/// Grants everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessControl for AllowAll {
    fn allowed(
        &self,
        _context: Option<&Bytes>,
        _principal: &[u8],
        _model: SecurityModel,
        _level: SecurityLevel,
        _kind: ViewKind,
        _oid: &Oid,
    ) -> bool {
        true
    }
}

/// A collection of included and excluded OID subtrees.
///
/// An OID is in the view when at least one included subtree contains it and
/// no excluded subtree does.
///
/// ```rust
/// use snmp_agent_core::access::View;
/// use snmp_agent_core::oid;
///
/// let view = View::new()
///     .include(oid!(1, 3, 6, 1, 2, 1, 1))
///     .exclude(oid!(1, 3, 6, 1, 2, 1, 1, 4));
///
/// assert!(view.contains(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)));
/// assert!(!view.contains(&oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct View {
    included: Vec<Oid>,
    excluded: Vec<Oid>,
}

impl View {
    /// Create an empty view (contains nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an included subtree.
    pub fn include(mut self, subtree: Oid) -> Self {
        self.included.push(subtree);
        self
    }

    /// Add an excluded subtree. Exclusions win over inclusions.
    pub fn exclude(mut self, subtree: Oid) -> Self {
        self.excluded.push(subtree);
        self
    }

    /// Returns `true` if `oid` is in the view.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.included.iter().any(|s| oid.starts_with(s))
            && !self.excluded.iter().any(|s| oid.starts_with(s))
    }
}

#[derive(Debug, Clone, Default)]
struct PrincipalViews {
    read: Option<View>,
    write: Option<View>,
    notify: Option<View>,
}

/// Per-principal views.
///
/// Principals without a view for the requested kind are denied.
///
/// ```rust
/// use snmp_agent_core::access::{ViewAccess, View};
/// use snmp_agent_core::oid;
///
/// let access = ViewAccess::new()
///     .read_view("public", View::new().include(oid!(1, 3, 6, 1, 2, 1)))
///     .write_view("private", View::new().include(oid!(1, 3, 6, 1, 4, 1)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ViewAccess {
    principals: HashMap<Bytes, PrincipalViews>,
    minimum_level: SecurityLevel,
}

impl ViewAccess {
    /// Create an access table that denies everyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the read view for `principal`.
    pub fn read_view(mut self, principal: impl Into<Bytes>, view: View) -> Self {
        self.principals.entry(principal.into()).or_default().read = Some(view);
        self
    }

    /// Set the write view for `principal`.
    pub fn write_view(mut self, principal: impl Into<Bytes>, view: View) -> Self {
        self.principals.entry(principal.into()).or_default().write = Some(view);
        self
    }

    /// Set the notify view for `principal`.
    pub fn notify_view(mut self, principal: impl Into<Bytes>, view: View) -> Self {
        self.principals.entry(principal.into()).or_default().notify = Some(view);
        self
    }

    /// Deny requests below `level`.
    pub fn minimum_level(mut self, level: SecurityLevel) -> Self {
        self.minimum_level = level;
        self
    }
}

impl AccessControl for ViewAccess {
    fn allowed(
        &self,
        _context: Option<&Bytes>,
        principal: &[u8],
        _model: SecurityModel,
        level: SecurityLevel,
        kind: ViewKind,
        oid: &Oid,
    ) -> bool {
        if level < self.minimum_level {
            return false;
        }
        let Some(views) = self.principals.get(principal) else {
            return false;
        };
        let view = match kind {
            ViewKind::Read => &views.read,
            ViewKind::Write => &views.write,
            ViewKind::Notify => &views.notify,
        };
        view.as_ref().is_some_and(|v| v.contains(oid))
    }
}
