//! Managed-object interface.
//!
//! This module defines what the registry stores and what the request engine
//! calls into:
//!
//! - [`ManagedObject`] - an object serving a [`Scope`](crate::Scope) of OIDs
//! - [`Writable`], [`Refreshable`], [`TableObject`] - optional capabilities
//! - [`RequestContext`] - information about the request being processed
//! - [`GetResult`], [`GetNextResult`], [`SetResult`] - per-variable outcomes
//! - [`Response`] - the finished result of a request
//!
//! # Write Phases
//!
//! SET requests follow the multi-phase protocol of RFC 3416 across all
//! addressed objects:
//!
//! 1. **Prepare**: [`Writable::validate`] is called for ALL varbinds, in
//!    order, so the lowest failing position can be reported. While no varbind
//!    has failed yet, each validated varbind is staged right away with
//!    [`Writable::apply`], which records its undo state.
//! 2. **Commit**: once every varbind is validated and staged,
//!    [`Writable::commit`] finalizes each change.
//!
//! If any phase fails, [`Writable::undo`] is called once for each varbind that
//! was applied, in reverse order. Objects without the write capability answer
//! `notWritable`.

mod context;
mod results;
mod traits;

pub use context::RequestContext;
pub use results::{GetNextResult, GetResult, Response, SetResult};
pub use traits::{ManagedObject, Refreshable, TableObject, Writable};
