//! Managed-object capability traits.

use std::sync::Arc;

use crate::oid::Oid;
use crate::query::Query;
use crate::registry::RowListener;
use crate::scope::Scope;
use crate::value::Value;
use crate::varbind::VarBind;

use super::{GetNextResult, GetResult, RequestContext, SetResult};

/// An addressable object registered with the [`Registry`](crate::registry::Registry).
///
/// An object serves every OID inside its [`scope`](ManagedObject::scope).
/// Optional capabilities are discovered through the `as_*` methods instead of
/// downcasting; the defaults report the capability as absent.
///
/// # Bounds
///
/// Objects are stored as `Arc<dyn ManagedObject>` and shared between worker
/// threads, hence `Send + Sync + 'static`.
///
/// # Example: Read-Only Scalar Group
///
/// ```rust
/// use std::collections::BTreeMap;
/// use snmp_agent_core::handler::{GetNextResult, GetResult, ManagedObject, RequestContext};
/// use snmp_agent_core::{oid, Oid, Query, Scope, Value, VarBind};
///
/// struct SystemGroup {
///     values: BTreeMap<Oid, Value>,
/// }
///
/// impl ManagedObject for SystemGroup {
///     fn scope(&self) -> Scope {
///         Scope::subtree(oid!(1, 3, 6, 1, 2, 1, 1))
///     }
///
///     fn get(&self, _ctx: &RequestContext, oid: &Oid) -> GetResult {
///         self.values.get(oid).cloned().into()
///     }
///
///     fn next(&self, _ctx: &RequestContext, query: &Query) -> GetNextResult {
///         query
///             .scope()
///             .scope()
///             .first_entry(&self.values)
///             .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
///             .into()
///     }
/// }
/// ```
pub trait ManagedObject: Send + Sync + 'static {
    /// The OID range this object serves.
    fn scope(&self) -> Scope;

    /// Read one instance inside the scope.
    fn get(&self, ctx: &RequestContext, oid: &Oid) -> GetResult;

    /// The first instance inside `query`'s window.
    ///
    /// The window starts at or after the scope's lower bound; returning
    /// [`GetNextResult::EndOfMibView`] makes the engine continue with the next
    /// registered object.
    fn next(&self, ctx: &RequestContext, query: &Query) -> GetNextResult;

    /// Write capability.
    fn as_writable(&self) -> Option<&dyn Writable> {
        None
    }

    /// Lazy refresh capability.
    fn as_refreshable(&self) -> Option<&dyn Refreshable> {
        None
    }

    /// Conceptual-table capability (row listeners).
    fn as_table(&self) -> Option<&dyn TableObject> {
        None
    }
}

/// Write phases of a managed object.
///
/// A SET touching several objects drives every variable through
/// [`validate`](Writable::validate). Variables validated before any failure
/// are staged with [`apply`](Writable::apply); when all variables pass, each
/// is finalized with [`commit`](Writable::commit). If any phase fails, every
/// variable whose `apply` already succeeded gets exactly one
/// [`undo`](Writable::undo) call, in reverse order.
/// [`cleanup`](Writable::cleanup) runs for every validated variable at the
/// end, whatever the outcome.
pub trait Writable: Send + Sync {
    /// Check that `vb` could be written. Must not change visible state.
    fn validate(&self, ctx: &RequestContext, vb: &VarBind) -> SetResult;

    /// Make the change. Store whatever `undo` needs to revert it in `undo`.
    fn apply(&self, ctx: &RequestContext, vb: &VarBind, undo: &mut Option<Value>) -> SetResult;

    /// Make an applied change permanent.
    fn commit(&self, _ctx: &RequestContext, _vb: &VarBind) -> SetResult {
        SetResult::Ok
    }

    /// Revert an applied change using the state stored by `apply`.
    fn undo(&self, ctx: &RequestContext, vb: &VarBind, undo: Option<&Value>) -> SetResult;

    /// Release anything held since `validate`.
    fn cleanup(&self, _ctx: &RequestContext, _vb: &VarBind) {}
}

/// Objects whose state is refreshed lazily before a lookup matches them.
pub trait Refreshable: Send + Sync {
    /// Bring the object up to date for `query`.
    fn update(&self, query: &Query);
}

/// Objects that publish row changes.
pub trait TableObject: Send + Sync {
    /// Start notifying `listener` of row changes.
    fn add_row_listener(&self, listener: Arc<dyn RowListener>);

    /// Stop notifying `listener`. Returns `true` if it was registered.
    fn remove_row_listener(&self, listener: &Arc<dyn RowListener>) -> bool;
}
