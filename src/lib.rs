//! # snmp-agent-core
//!
//! Request-processing core for SNMP command responders.
//!
//! The crate resolves GET, GETNEXT, GETBULK and SET operations against a
//! registry of managed objects. It does not decode messages or own a
//! socket: a transport hands it a [`Pdu`] and a
//! [`RequestContext`](handler::RequestContext) and gets a
//! [`Response`](handler::Response) back.
//!
//! ## Building Blocks
//!
//! - [`Registry`] maps context-tagged OID ranges ([`ContextScope`]) to
//!   [`ManagedObject`](handler::ManagedObject)s and owns the per-object lock
//!   table
//! - [`Request`] tracks one operation as a list of
//!   [`SubRequest`](request::SubRequest)s, expanding GETBULK rows lazily
//! - [`Agent`] drives requests through the registry: access checks, read-next
//!   continuation, locking and the multi-phase SET protocol
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use snmp_agent_core::handler::{GetNextResult, GetResult, ManagedObject, RequestContext};
//! use snmp_agent_core::{oid, Agent, Oid, Pdu, Query, Registry, Scope, Value, VarBind, Version};
//!
//! struct Uptime;
//!
//! impl ManagedObject for Uptime {
//!     fn scope(&self) -> Scope {
//!         Scope::exact(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0))
//!     }
//!
//!     fn get(&self, _ctx: &RequestContext, _oid: &Oid) -> GetResult {
//!         GetResult::Value(Value::TimeTicks(4200))
//!     }
//!
//!     fn next(&self, _ctx: &RequestContext, query: &Query) -> GetNextResult {
//!         let oid = self.scope().lower_bound().clone();
//!         if query.scope().scope().contains(&oid) {
//!             GetNextResult::Value(VarBind::new(oid, Value::TimeTicks(4200)))
//!         } else {
//!             GetNextResult::EndOfMibView
//!         }
//!     }
//! }
//!
//! let registry = Arc::new(Registry::new());
//! registry.register(Arc::new(Uptime), None).unwrap();
//!
//! let agent = Agent::builder().registry(registry).build();
//! let ctx = RequestContext::new(Version::V2c).with_security_name("public");
//! let response = agent.process(ctx, Pdu::get_next(1, &[oid!(1, 3, 6, 1, 2, 1, 1)])).unwrap();
//! assert_eq!(response.varbinds[0].value, Value::TimeTicks(4200));
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] with structured `snmp.*` fields.
//! Registrations log at `info`, request processing at `debug`, per-variable
//! detail at `trace`, and failed unregistrations, undo failures and
//! interrupted lock waits at `warn`.

pub mod access;
pub mod agent;
pub mod ber;
pub mod error;
pub mod handler;
pub mod oid;
pub mod ordering;
pub mod pdu;
pub mod prelude;
pub mod query;
pub mod registry;
pub mod request;
pub mod scope;
pub mod value;
pub mod varbind;
pub mod version;

pub use agent::{Agent, AgentBuilder, AgentConfig};
pub use error::{Error, ErrorStatus, OidErrorKind, Result};
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use query::Query;
pub use registry::{Registry, RegistryBuilder, RegistryEntry};
pub use request::Request;
pub use scope::{ContextScope, Scope};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
