//! Object identifier type.
//!
//! OIDs are the keys of the whole agent: registrations, queries, and variable
//! bindings are all addressed by them. Arcs are stored inline for the common
//! case of short identifiers.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{Error, OidErrorKind, Result};

/// Maximum number of arcs accepted in an OID (RFC 2578 Section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object identifier.
///
/// Ordering is lexicographic arc-by-arc with arcs compared as unsigned
/// integers; a strict prefix sorts before every extension of it, so
/// `1.3.6.1` < `1.3.6.1.0` < `1.3.6.2`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    ///
    /// The empty OID sorts before every other OID and is a useful lower bound
    /// for scopes that should cover the whole tree.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Create an OID from arcs, rejecting identifiers longer than [`MAX_OID_LEN`].
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Result<Self> {
        let arcs: SmallVec<[u32; 16]> = arcs.into_iter().collect();
        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        Ok(Self { arcs })
    }

    /// Parse an OID from dotted notation (`"1.3.6.1"` or `".1.3.6.1"`).
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs: SmallVec<[u32; 16]> = SmallVec::new();
        for part in trimmed.split('.') {
            let arc = part
                .parse::<u32>()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                    s,
                ));
            }
        }
        Ok(Self { arcs })
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Returns `true` for the empty OID.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Returns `true` if `prefix` is a (non-strict) prefix of this OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// A new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Self { arcs }
    }

    /// A new OID with all of `suffix` appended.
    pub fn join(&self, suffix: &[u32]) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.extend_from_slice(suffix);
        Self { arcs }
    }

    /// The OID with its last arc removed, or `None` for the empty OID.
    pub fn parent(&self) -> Option<Self> {
        if self.arcs.is_empty() {
            return None;
        }
        Some(Self::from_slice(&self.arcs[..self.arcs.len() - 1]))
    }

    /// The first OID that is not inside the subtree rooted at this OID.
    ///
    /// `1.3.6` becomes `1.3.7`. Returns `None` when no such OID exists
    /// (empty OID, or every arc is `u32::MAX`).
    pub fn next_peer(&self) -> Option<Self> {
        let mut arcs = self.arcs.clone();
        while let Some(last) = arcs.pop() {
            if last < u32::MAX {
                arcs.push(last + 1);
                return Some(Self { arcs });
            }
        }
        None
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::from_slice(&arcs)
    }
}

impl AsRef<[u32]> for Oid {
    fn as_ref(&self) -> &[u32] {
        &self.arcs
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```rust
/// use snmp_agent_core::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    () => {
        $crate::oid::Oid::empty()
    };
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_display() {
        let o = Oid::parse("1.3.6.1.2.1").unwrap();
        assert_eq!(o, oid!(1, 3, 6, 1, 2, 1));
        assert_eq!(o.to_string(), "1.3.6.1.2.1");

        let leading_dot = Oid::parse(".1.3.6").unwrap();
        assert_eq!(leading_dot, oid!(1, 3, 6));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Oid::parse(""),
            Err(Error::InvalidOid {
                kind: OidErrorKind::Empty,
                ..
            })
        ));
        assert!(matches!(
            Oid::parse("1..3"),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidArc,
                ..
            })
        ));
        assert!(Oid::parse("1.3.x").is_err());
        assert!(Oid::parse("1.3.4294967296").is_err());
    }

    #[test]
    fn test_too_many_arcs() {
        let long = vec!["1"; MAX_OID_LEN + 1].join(".");
        assert!(matches!(
            Oid::parse(&long),
            Err(Error::InvalidOid {
                kind: OidErrorKind::TooManyArcs { .. },
                ..
            })
        ));
        assert!(Oid::new(std::iter::repeat_n(1, MAX_OID_LEN)).is_ok());
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert!(oid!(1, 3, 6, 1) < oid!(1, 3, 6, 1, 0));
        assert!(oid!(1, 3, 6, 1, 0) < oid!(1, 3, 6, 2));
        assert!(oid!(1, 3, 6, 1, 2) < oid!(1, 3, 6, 1, 10));
        assert!(Oid::empty() < oid!(0));
    }

    #[test]
    fn test_child_parent_next_peer() {
        let base = oid!(1, 3, 6);
        assert_eq!(base.child(1), oid!(1, 3, 6, 1));
        assert_eq!(base.join(&[1, 2]), oid!(1, 3, 6, 1, 2));
        assert_eq!(base.parent(), Some(oid!(1, 3)));
        assert_eq!(Oid::empty().parent(), None);
        assert_eq!(base.next_peer(), Some(oid!(1, 3, 7)));
        assert_eq!(oid!(1, u32::MAX).next_peer(), Some(oid!(2)));
        assert_eq!(oid!(u32::MAX).next_peer(), None);
    }

    #[test]
    fn test_starts_with() {
        assert!(oid!(1, 3, 6, 1).starts_with(&oid!(1, 3)));
        assert!(oid!(1, 3).starts_with(&oid!(1, 3)));
        assert!(!oid!(1, 3).starts_with(&oid!(1, 3, 6)));
    }

    proptest! {
        #[test]
        fn prop_display_parse_identity(arcs in proptest::collection::vec(any::<u32>(), 1..40)) {
            let o = Oid::from_slice(&arcs);
            prop_assert_eq!(Oid::parse(&o.to_string()).unwrap(), o);
        }

        #[test]
        fn prop_order_matches_slice_order(
            a in proptest::collection::vec(0u32..4, 0..6),
            b in proptest::collection::vec(0u32..4, 0..6),
        ) {
            prop_assert_eq!(Oid::from_slice(&a).cmp(&Oid::from_slice(&b)), a.cmp(&b));
        }

        #[test]
        fn prop_next_peer_is_past_subtree(
            arcs in proptest::collection::vec(0u32..1000, 1..8),
            tail in proptest::collection::vec(any::<u32>(), 0..4),
        ) {
            let base = Oid::from_slice(&arcs);
            let inside = base.join(&tail);
            let peer = base.next_peer().unwrap();
            prop_assert!(inside < peer);
            prop_assert!(!peer.starts_with(&base));
        }
    }
}
