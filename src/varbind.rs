//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value.

use crate::ber;
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Returns `true` if the value is one of the exception markers.
    pub fn is_exception(&self) -> bool {
        self.value.is_exception()
    }

    /// Returns the exact encoded size of this VarBind in bytes.
    ///
    /// Used for response size estimation in GETBULK processing.
    pub fn encoded_len(&self) -> usize {
        let oid_len = ber::tlv_len(ber::oid_content_len(&self.oid));
        ber::tlv_len(oid_len + self.value.encoded_len())
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_varbind_encoded_len() {
        // 30 0D [06 08 2B 06 01 02 01 01 01 00] [05 00]
        let vb = VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        assert_eq!(vb.encoded_len(), 14);

        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux"));
        assert_eq!(vb.encoded_len(), 19);
    }

    #[test]
    fn test_varbind_exception() {
        let vb = VarBind::new(oid!(1, 3, 6, 1), Value::EndOfMibView);
        assert!(vb.is_exception());
        assert!(!VarBind::null(oid!(1, 3, 6, 1)).is_exception());
    }

    #[test]
    fn test_varbind_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1), Value::Integer(42));
        assert_eq!(vb.to_string(), "1.3.6.1 = 42");
    }
}
