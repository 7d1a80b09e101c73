//! SNMP value type.

use std::fmt;

use bytes::Bytes;

use crate::ber::{self, tag};
use crate::oid::Oid;

/// A value carried in a variable binding.
///
/// The last three variants are the RFC 3416 exception markers that take the
/// place of a value when an instance cannot be returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER / Integer32.
    Integer(i32),
    /// OCTET STRING.
    OctetString(Bytes),
    /// NULL (placeholder in requests).
    Null,
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// IpAddress.
    IpAddress([u8; 4]),
    /// Counter32.
    Counter32(u32),
    /// Gauge32 / Unsigned32.
    Gauge32(u32),
    /// TimeTicks (hundredths of a second).
    TimeTicks(u32),
    /// Opaque.
    Opaque(Bytes),
    /// Counter64.
    Counter64(u64),
    /// The object type is not implemented.
    NoSuchObject,
    /// The object type exists but the instance does not.
    NoSuchInstance,
    /// No identifier exists beyond the requested one.
    EndOfMibView,
}

impl Value {
    /// Returns `true` for the three exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// BER tag this value is encoded with.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::Counter32(_) => tag::application::COUNTER32,
            Value::Gauge32(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
            Value::Opaque(_) => tag::application::OPAQUE,
            Value::Counter64(_) => tag::application::COUNTER64,
            Value::NoSuchObject => tag::context::NO_SUCH_OBJECT,
            Value::NoSuchInstance => tag::context::NO_SUCH_INSTANCE,
            Value::EndOfMibView => tag::context::END_OF_MIB_VIEW,
        }
    }

    /// Exact number of octets this value occupies in BER (tag, length, content).
    pub fn encoded_len(&self) -> usize {
        let content = match self {
            Value::Integer(v) => ber::integer_content_len(*v),
            Value::OctetString(b) | Value::Opaque(b) => b.len(),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => 0,
            Value::ObjectIdentifier(oid) => ber::oid_content_len(oid),
            Value::IpAddress(_) => 4,
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
                ber::unsigned32_content_len(*v)
            }
            Value::Counter64(v) => ber::unsigned64_content_len(*v),
        };
        ber::tlv_len(content)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{:02x?}", &b[..]),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Value::Counter32(v) => write!(f, "{}", v),
            Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Opaque(b) => write!(f, "Opaque({:02x?})", &b[..]),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::OctetString(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}
