//! Encoded-length arithmetic.

use crate::oid::Oid;
use crate::varbind::VarBind;

/// Number of octets used by the length field for `content_len` bytes of content.
#[inline]
pub fn length_len(content_len: usize) -> usize {
    if content_len < 0x80 {
        return 1;
    }
    let significant = (usize::BITS - content_len.leading_zeros()).div_ceil(8) as usize;
    1 + significant
}

/// Total size of a tag-length-value triple with `content_len` bytes of content.
#[inline]
pub fn tlv_len(content_len: usize) -> usize {
    1 + length_len(content_len) + content_len
}

/// Content length of a minimally encoded signed 32-bit INTEGER.
#[inline]
pub fn integer_content_len(value: i32) -> usize {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    if value >= 0 {
        while start < 3 && bytes[start] == 0 && bytes[start + 1] & 0x80 == 0 {
            start += 1;
        }
    } else {
        while start < 3 && bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0 {
            start += 1;
        }
    }
    4 - start
}

/// Content length of an unsigned 32-bit value (Counter32, Gauge32, TimeTicks).
#[inline]
pub fn unsigned32_content_len(value: u32) -> usize {
    unsigned64_content_len(u64::from(value))
}

/// Content length of an unsigned 64-bit value (Counter64).
///
/// A leading zero octet is added when the most significant bit is set so the
/// value is not read back as negative.
#[inline]
pub fn unsigned64_content_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = u64::BITS - value.leading_zeros();
    (bits as usize / 8) + 1
}

/// Number of base-128 octets for one OID subidentifier.
#[inline]
fn subidentifier_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = u64::BITS - value.leading_zeros();
    bits.div_ceil(7) as usize
}

/// Content length of an OBJECT IDENTIFIER.
///
/// The first two arcs share one subidentifier (`40 * a0 + a1`). An empty OID
/// is encoded as `0.0`, a single-arc OID as `a0.0`.
pub fn oid_content_len(oid: &Oid) -> usize {
    let arcs = oid.arcs();
    match arcs {
        [] => 1,
        [first] => subidentifier_len(u64::from(*first) * 40),
        [first, second, rest @ ..] => {
            let head = subidentifier_len(u64::from(*first) * 40 + u64::from(*second));
            head + rest
                .iter()
                .map(|arc| subidentifier_len(u64::from(*arc)))
                .sum::<usize>()
        }
    }
}

/// Encoded size of a variable-binding list (the enclosing SEQUENCE included).
pub fn varbind_list_len<'a>(varbinds: impl IntoIterator<Item = &'a VarBind>) -> usize {
    let content: usize = varbinds.into_iter().map(VarBind::encoded_len).sum();
    tlv_len(content)
}

/// Encoded size of a response PDU carrying `varbinds`.
///
/// Covers the PDU tag and length, request-id, error-status, error-index and
/// the varbind list. Message-level wrapping (version, community or scoped-PDU
/// header) is the transport's concern and is accounted for by the caller's
/// size budget.
pub fn pdu_encoded_len<'a>(
    request_id: i32,
    error_status: i32,
    error_index: i32,
    varbinds: impl IntoIterator<Item = &'a VarBind>,
) -> usize {
    let content = tlv_len(integer_content_len(request_id))
        + tlv_len(integer_content_len(error_status))
        + tlv_len(integer_content_len(error_index))
        + varbind_list_len(varbinds);
    tlv_len(content)
}
