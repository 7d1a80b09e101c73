//! SNMP version enumeration.

/// SNMP protocol version a request arrived with.
///
/// The request engine only cares about the split between SNMPv1 and the
/// later versions: v1 has no GETBULK, no exception values in responses and
/// a coarser error-status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Version {
    /// SNMPv1 (RFC 1157)
    V1,
    /// SNMPv2c (RFC 1901)
    #[default]
    V2c,
    /// SNMPv3 (RFC 3411-3418)
    V3,
}

impl Version {
    /// Get the BER-encoded version number.
    pub const fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
            Version::V3 => 3,
        }
    }

    /// Create from BER-encoded version number.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            3 => Some(Version::V3),
            _ => None,
        }
    }

    /// Returns `true` for SNMPv1, whose responses use the legacy error
    /// vocabulary and carry no exception values.
    pub const fn is_legacy(self) -> bool {
        matches!(self, Version::V1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "SNMPv1"),
            Version::V2c => write!(f, "SNMPv2c"),
            Version::V3 => write!(f, "SNMPv3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_codes() {
        for v in [Version::V1, Version::V2c, Version::V3] {
            assert_eq!(Version::from_i32(v.as_i32()), Some(v));
        }
        assert_eq!(Version::from_i32(2), None);
    }

    #[test]
    fn test_is_legacy() {
        assert!(Version::V1.is_legacy());
        assert!(!Version::V2c.is_legacy());
        assert!(!Version::V3.is_legacy());
    }
}
