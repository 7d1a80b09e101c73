//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use snmp_agent_core::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Oid`], [`Value`], [`VarBind`], [`Scope`], [`Query`]
//! - The engine: [`Registry`], [`Agent`], [`Request`], [`Pdu`]
//! - Managed-object traits and results: [`ManagedObject`], [`Writable`],
//!   [`RequestContext`], [`GetResult`], [`GetNextResult`], [`SetResult`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::agent::Agent;
pub use crate::error::{Error, ErrorStatus, Result};
pub use crate::handler::{
    GetNextResult, GetResult, ManagedObject, RequestContext, Response, SetResult, Writable,
};
pub use crate::oid::Oid;
pub use crate::pdu::Pdu;
pub use crate::query::Query;
pub use crate::registry::Registry;
pub use crate::request::Request;
pub use crate::scope::{ContextScope, Scope};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
