//! Error types for the agent core.
//!
//! Two families live here:
//!
//! - [`Error`] is returned synchronously by registry and scope operations
//!   (registration conflicts, malformed scope mutation, bad OID input).
//! - [`ErrorStatus`] is the per-variable protocol status vocabulary
//!   (RFC 3416) recorded on sub-requests and reported in responses.
//!
//! All enums are `#[non_exhaustive]` to allow adding new variants without
//! breaking changes.

use crate::scope::ContextScope;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns `true` for anything other than `noError`.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NoError)
    }

    /// Collapse to the SNMPv1 status vocabulary (RFC 2576 Section 4.3).
    ///
    /// Codes that already belong to the v1 vocabulary map to themselves, so
    /// applying this twice gives the same result as applying it once.
    pub fn to_v1(self) -> Self {
        match self {
            Self::NotWritable | Self::NoAccess | Self::NoCreation | Self::InconsistentName => {
                Self::NoSuchName
            }
            Self::WrongValue
            | Self::WrongLength
            | Self::InconsistentValue
            | Self::WrongType
            | Self::WrongEncoding => Self::BadValue,
            Self::AuthorizationError
            | Self::ResourceUnavailable
            | Self::CommitFailed
            | Self::UndoFailed => Self::GenErr,
            other => other,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A registration overlaps an existing one in the same (or default) context.
    #[error("duplicate registration: {scope} overlaps registered {existing}")]
    DuplicateRegistration {
        scope: ContextScope,
        existing: ContextScope,
    },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// A scope mutation that cannot be applied to this scope.
    #[error("invalid scope operation: {reason}")]
    InvalidScope { reason: &'static str },

    /// Waiting for an object lock was interrupted.
    #[error("lock wait interrupted")]
    LockInterrupted,

    /// Request addressed a context the agent does not serve.
    #[error("unknown context")]
    UnknownContext { context: bytes::Bytes },

    /// Request carries more variable bindings than the agent accepts.
    #[error("request has {count} variable bindings, maximum is {max}")]
    TooManyVarbinds { count: usize, max: usize },

    /// A request with the same key is already being processed.
    #[error("duplicate request {request_id} is already in progress")]
    DuplicateRequest { request_id: i32 },

    /// The blocking worker running a request failed.
    #[error("request worker failed: {message}")]
    Worker { message: String },
}

impl Error {
    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create an invalid scope error.
    pub fn invalid_scope(reason: &'static str) -> Self {
        Self::InvalidScope { reason }
    }
}
