//! Request context for managed objects.

use bytes::Bytes;

use crate::access::{SecurityLevel, SecurityModel};
use crate::pdu::PduType;
use crate::version::Version;

/// Request context passed to managed objects.
///
/// Describes who is asking and on behalf of which operation. The request
/// engine fills in `request_id`, `pdu_type` and `transaction_id` when the
/// [`Request`](crate::request::Request) is created.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// SNMP version.
    pub version: Version,
    /// Security model used.
    pub security_model: SecurityModel,
    /// Security name (community string or username).
    pub security_name: Bytes,
    /// Security level (v3 only, NoAuthNoPriv for v1/v2c).
    pub security_level: SecurityLevel,
    /// Context name, `None` for the default context.
    pub context: Option<Bytes>,
    /// Request ID from the PDU.
    pub request_id: i32,
    /// PDU type the engine processes this request as.
    pub pdu_type: PduType,
    /// Process-wide transaction identifier of the request.
    pub transaction_id: u64,
}

impl RequestContext {
    /// A context for `version` with the matching security model and no
    /// principal.
    pub fn new(version: Version) -> Self {
        let security_model = match version {
            Version::V1 => SecurityModel::V1,
            Version::V2c => SecurityModel::V2c,
            _ => SecurityModel::Usm,
        };
        Self {
            version,
            security_model,
            security_name: Bytes::new(),
            security_level: SecurityLevel::NoAuthNoPriv,
            context: None,
            request_id: 0,
            pdu_type: PduType::Get,
            transaction_id: 0,
        }
    }

    /// Set the security name (community or user).
    pub fn with_security_name(mut self, name: impl Into<Bytes>) -> Self {
        self.security_name = name.into();
        self
    }

    /// Set the security level.
    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = level;
        self
    }

    /// Set the context name. An empty name selects the default context.
    pub fn with_context(mut self, context: impl Into<Bytes>) -> Self {
        self.context = crate::scope::normalize_context(Some(context.into()));
        self
    }
}
