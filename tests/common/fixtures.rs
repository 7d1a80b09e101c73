//! Common test fixtures: OIDs and managed objects.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use snmp_agent_core::handler::{
    GetNextResult, GetResult, ManagedObject, RequestContext, SetResult, Writable,
};
use snmp_agent_core::{Oid, Query, Scope, Value, VarBind, oid};

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Nonexistent OID for testing NoSuchObject
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

/// V2c read-only community
pub const COMMUNITY_RO: &[u8] = b"public";
/// V2c read-write community
pub const COMMUNITY_RW: &[u8] = b"private";

// =============================================================================
// Managed objects
// =============================================================================

/// Read-only object serving a fixed set of instances under a subtree.
pub struct StaticTable {
    scope: Scope,
    values: BTreeMap<Oid, Value>,
}

impl StaticTable {
    pub fn new(prefix: Oid, values: impl IntoIterator<Item = (Oid, Value)>) -> Arc<Self> {
        Arc::new(Self {
            scope: Scope::subtree(prefix),
            values: values.into_iter().collect(),
        })
    }

    /// A table column `prefix.<row>` with integer cells, one per row.
    pub fn column(prefix: Oid, rows: &[u32]) -> Arc<Self> {
        let values = rows
            .iter()
            .map(|row| (prefix.child(*row), Value::Integer(*row as i32)));
        Self::new(prefix.clone(), values)
    }

    /// The system group with a few scalars.
    pub fn system() -> Arc<Self> {
        Self::new(
            system_subtree(),
            [
                (sys_descr(), Value::from("test agent")),
                (sys_uptime(), Value::TimeTicks(12345)),
                (sys_contact(), Value::from("noc@example.com")),
                (sys_name(), Value::from("agent-1")),
                (sys_location(), Value::from("rack 4")),
            ],
        )
    }
}

impl ManagedObject for StaticTable {
    fn scope(&self) -> Scope {
        self.scope.clone()
    }

    fn get(&self, _ctx: &RequestContext, oid: &Oid) -> GetResult {
        self.values.get(oid).cloned().into()
    }

    fn next(&self, _ctx: &RequestContext, query: &Query) -> GetNextResult {
        query
            .scope()
            .scope()
            .first_entry(&self.values)
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
            .into()
    }
}

/// Shared record of write phase calls, in call order.
pub type CallLog = Arc<Mutex<Vec<(String, Oid)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Writable scalar that records every phase call into a [`CallLog`].
pub struct RecordingScalar {
    oid: Oid,
    value: Mutex<Value>,
    log: CallLog,
    reject: bool,
}

impl RecordingScalar {
    pub fn new(oid: Oid, initial: Value, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            oid,
            value: Mutex::new(initial),
            log: log.clone(),
            reject: false,
        })
    }

    /// A scalar whose validation always fails with `wrongValue`.
    pub fn rejecting(oid: Oid, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            oid,
            value: Mutex::new(Value::Null),
            log: log.clone(),
            reject: true,
        })
    }

    pub fn value(&self) -> Value {
        self.value.lock().clone()
    }

    fn record(&self, phase: &str) {
        self.log.lock().push((phase.to_string(), self.oid.clone()));
    }
}

impl ManagedObject for RecordingScalar {
    fn scope(&self) -> Scope {
        Scope::exact(self.oid.clone())
    }

    fn get(&self, _ctx: &RequestContext, _oid: &Oid) -> GetResult {
        GetResult::Value(self.value())
    }

    fn next(&self, _ctx: &RequestContext, query: &Query) -> GetNextResult {
        if query.scope().scope().contains(&self.oid) {
            GetNextResult::Value(VarBind::new(self.oid.clone(), self.value()))
        } else {
            GetNextResult::EndOfMibView
        }
    }

    fn as_writable(&self) -> Option<&dyn Writable> {
        Some(self)
    }
}

impl Writable for RecordingScalar {
    fn validate(&self, _ctx: &RequestContext, _vb: &VarBind) -> SetResult {
        self.record("validate");
        if self.reject {
            SetResult::WrongValue
        } else {
            SetResult::Ok
        }
    }

    fn apply(&self, _ctx: &RequestContext, vb: &VarBind, undo: &mut Option<Value>) -> SetResult {
        self.record("apply");
        let mut value = self.value.lock();
        *undo = Some(std::mem::replace(&mut *value, vb.value.clone()));
        SetResult::Ok
    }

    fn commit(&self, _ctx: &RequestContext, _vb: &VarBind) -> SetResult {
        self.record("commit");
        SetResult::Ok
    }

    fn undo(&self, _ctx: &RequestContext, _vb: &VarBind, undo: Option<&Value>) -> SetResult {
        self.record("undo");
        if let Some(previous) = undo {
            *self.value.lock() = previous.clone();
        }
        SetResult::Ok
    }

    fn cleanup(&self, _ctx: &RequestContext, _vb: &VarBind) {
        self.record("cleanup");
    }
}
