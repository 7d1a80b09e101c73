//! Result types for managed-object operations.

use crate::error::ErrorStatus;
use crate::value::Value;
use crate::varbind::VarBind;

/// Result of one write phase on one variable.
///
/// The variants map to RFC 3416 error status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetResult {
    /// Operation succeeded.
    Ok,
    /// Access denied for this principal.
    NoAccess,
    /// Object is inherently read-only.
    NotWritable,
    /// Value has wrong ASN.1 type for this OID.
    WrongType,
    /// Value has wrong length for this OID.
    WrongLength,
    /// Value encoding is incorrect.
    WrongEncoding,
    /// Value is not valid for this OID.
    WrongValue,
    /// Instance does not exist and cannot be created.
    NoCreation,
    /// Value is inconsistent with other values in the same SET.
    InconsistentValue,
    /// Resource unavailable (memory, locks, etc.).
    ResourceUnavailable,
    /// Commit failed.
    CommitFailed,
    /// Undo failed.
    UndoFailed,
    /// Row name is inconsistent with existing data.
    InconsistentName,
}

impl SetResult {
    /// Check if this result indicates success.
    pub fn is_ok(&self) -> bool {
        matches!(self, SetResult::Ok)
    }

    /// Convert to an ErrorStatus code.
    pub fn to_error_status(&self) -> ErrorStatus {
        match self {
            SetResult::Ok => ErrorStatus::NoError,
            SetResult::NoAccess => ErrorStatus::NoAccess,
            SetResult::NotWritable => ErrorStatus::NotWritable,
            SetResult::WrongType => ErrorStatus::WrongType,
            SetResult::WrongLength => ErrorStatus::WrongLength,
            SetResult::WrongEncoding => ErrorStatus::WrongEncoding,
            SetResult::WrongValue => ErrorStatus::WrongValue,
            SetResult::NoCreation => ErrorStatus::NoCreation,
            SetResult::InconsistentValue => ErrorStatus::InconsistentValue,
            SetResult::ResourceUnavailable => ErrorStatus::ResourceUnavailable,
            SetResult::CommitFailed => ErrorStatus::CommitFailed,
            SetResult::UndoFailed => ErrorStatus::UndoFailed,
            SetResult::InconsistentName => ErrorStatus::InconsistentName,
        }
    }
}

/// The finished, protocol-agnostic result of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Request ID copied from the request.
    pub request_id: i32,
    /// Variable bindings in the response.
    pub varbinds: Vec<VarBind>,
    /// Error status (NoError if none).
    pub error_status: ErrorStatus,
    /// 1-based index of the offending varbind, 0 if no error.
    pub error_index: u32,
}

impl Response {
    /// Returns `true` if the response reports an error.
    pub fn is_error(&self) -> bool {
        self.error_status.is_error()
    }
}

/// Result of reading one instance.
///
/// `NoSuchObject` means the object type is not implemented at all;
/// `NoSuchInstance` means the type exists but this instance does not.
#[derive(Debug, Clone, PartialEq)]
pub enum GetResult {
    /// The instance exists and has this value.
    Value(Value),
    /// The object type is not implemented.
    NoSuchObject,
    /// The object type exists but this instance doesn't.
    NoSuchInstance,
}

impl GetResult {
    /// The value to place in the response: the value itself or the matching
    /// exception marker.
    pub fn into_value(self) -> Value {
        match self {
            GetResult::Value(v) => v,
            GetResult::NoSuchObject => Value::NoSuchObject,
            GetResult::NoSuchInstance => Value::NoSuchInstance,
        }
    }
}

impl From<Value> for GetResult {
    fn from(value: Value) -> Self {
        GetResult::Value(value)
    }
}

impl From<Option<Value>> for GetResult {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(v) => GetResult::Value(v),
            None => GetResult::NoSuchInstance,
        }
    }
}

/// Result of asking an object for its first instance inside a query window.
#[derive(Debug, Clone, PartialEq)]
pub enum GetNextResult {
    /// The first instance inside the window.
    Value(VarBind),
    /// The object has nothing inside the window.
    EndOfMibView,
}

impl GetNextResult {
    /// Returns `true` if this is a value result.
    pub fn is_value(&self) -> bool {
        matches!(self, GetNextResult::Value(_))
    }

    /// Converts to an `Option<VarBind>`.
    pub fn into_option(self) -> Option<VarBind> {
        match self {
            GetNextResult::Value(vb) => Some(vb),
            GetNextResult::EndOfMibView => None,
        }
    }
}

impl From<Option<VarBind>> for GetNextResult {
    fn from(value: Option<VarBind>) -> Self {
        match value {
            Some(vb) => GetNextResult::Value(vb),
            None => GetNextResult::EndOfMibView,
        }
    }
}
