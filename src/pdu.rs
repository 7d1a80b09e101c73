//! Inbound protocol operation description.
//!
//! The agent core does not decode messages. A transport collaborator hands
//! it a [`Pdu`] describing what was asked for; the core answers with a
//! [`Response`](crate::handler::Response).

use crate::access::ViewKind;
use crate::oid::Oid;
use crate::varbind::VarBind;

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PduType {
    /// GET request.
    Get,
    /// GETNEXT request.
    GetNext,
    /// GETBULK request (SNMPv2c/v3).
    GetBulk,
    /// SET request.
    Set,
}

impl PduType {
    /// BER context tag of this PDU type.
    pub const fn tag(self) -> u8 {
        match self {
            PduType::Get => 0xA0,
            PduType::GetNext => 0xA1,
            PduType::Set => 0xA3,
            PduType::GetBulk => 0xA5,
        }
    }

    /// Create from a BER context tag.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0xA0 => Some(PduType::Get),
            0xA1 => Some(PduType::GetNext),
            0xA3 => Some(PduType::Set),
            0xA5 => Some(PduType::GetBulk),
            _ => None,
        }
    }

    /// Returns `true` for operations that address the next instance after
    /// each requested OID instead of the OID itself.
    pub const fn is_next(self) -> bool {
        matches!(self, PduType::GetNext | PduType::GetBulk)
    }

    /// Returns `true` for SET.
    pub const fn is_write(self) -> bool {
        matches!(self, PduType::Set)
    }

    /// Which access view governs this operation.
    pub const fn view_kind(self) -> ViewKind {
        match self {
            PduType::Get | PduType::GetNext | PduType::GetBulk => ViewKind::Read,
            PduType::Set => ViewKind::Write,
        }
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PduType::Get => write!(f, "GetRequest"),
            PduType::GetNext => write!(f, "GetNextRequest"),
            PduType::GetBulk => write!(f, "GetBulkRequest"),
            PduType::Set => write!(f, "SetRequest"),
        }
    }
}

/// A request PDU as seen by the agent core.
///
/// For GETBULK, `non_repeaters` and `max_repetitions` carry the values that
/// occupy the error-status and error-index fields on the wire. They are kept
/// signed so out-of-range inputs can be clamped by the request engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// Operation kind.
    pub pdu_type: PduType,
    /// Request identifier, echoed in the response.
    pub request_id: i32,
    /// Number of leading variables processed once (GETBULK only).
    pub non_repeaters: i32,
    /// Number of repetition rows requested (GETBULK only).
    pub max_repetitions: i32,
    /// Addressed variables.
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    fn with_oids(pdu_type: PduType, request_id: i32, oids: &[Oid]) -> Self {
        Self {
            pdu_type,
            request_id,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// GET request for `oids`.
    pub fn get(request_id: i32, oids: &[Oid]) -> Self {
        Self::with_oids(PduType::Get, request_id, oids)
    }

    /// GETNEXT request for `oids`.
    pub fn get_next(request_id: i32, oids: &[Oid]) -> Self {
        Self::with_oids(PduType::GetNext, request_id, oids)
    }

    /// GETBULK request for `oids`.
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oids: &[Oid],
    ) -> Self {
        Self {
            non_repeaters,
            max_repetitions,
            ..Self::with_oids(PduType::GetBulk, request_id, oids)
        }
    }

    /// SET request writing `varbinds`.
    pub fn set(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type: PduType::Set,
            request_id,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds,
        }
    }
}
