//! Multi-phase SET processing (RFC 3416).

use std::sync::Arc;

use crate::access::ViewKind;
use crate::error::ErrorStatus;
use crate::handler::{ManagedObject, RequestContext};
use crate::query::Query;
use crate::request::{Request, SubRequest};
use crate::scope::ContextScope;

use super::Agent;

fn target_object(sub: &SubRequest) -> Option<Arc<dyn ManagedObject>> {
    sub.target().map(|entry| entry.object().clone())
}

impl Agent {
    /// Handle a SET request.
    ///
    /// 1. **Prepare**: every variable is resolved, locked and validated, in
    ///    order. Validated variables are applied while no variable has
    ///    failed yet.
    /// 2. **Commit**: if all variables were prepared, each is committed. A
    ///    failing commit is reported as `commitFailed`.
    /// 3. **Undo**: after any failure, every applied variable is undone
    ///    exactly once, in reverse order.
    ///
    /// Cleanup runs for every validated variable and all locks taken by the
    /// request are released before returning.
    pub(super) fn handle_set(&self, request: &mut Request) {
        let ctx = request.context().clone();

        let mut failed = false;
        let mut cursor = request.cursor();
        while let Some(sub) = cursor.next(request) {
            if !self.prepare(&ctx, sub, !failed) {
                failed = true;
            }
        }

        if !failed {
            failed = !self.commit(&ctx, request.sub_requests_mut());
        }
        if failed {
            tracing::debug!(
                snmp.request_id = ctx.request_id,
                snmp.error_status = %request.error_status(),
                snmp.error_index = request.error_index(),
                "SET failed, rolling back"
            );
            self.undo(&ctx, request.sub_requests_mut());
        }
        self.release(&ctx, request.sub_requests_mut());
    }

    /// Resolve, lock, validate and (if `stage`) apply one variable.
    ///
    /// Returns `false` if the variable failed.
    fn prepare(&self, ctx: &RequestContext, sub: &mut SubRequest, stage: bool) -> bool {
        let vb = sub.varbind().clone();
        if !self.allowed(ctx, ViewKind::Write, &vb.oid) {
            sub.set_error(ErrorStatus::NoAccess);
            return false;
        }

        let query = Query::new(ContextScope::new(ctx.context.clone(), sub.scope().clone()))
            .for_write(true)
            .with_source(ctx.transaction_id);
        let Some(entry) = self.inner.registry.lookup(&query) else {
            sub.set_error(ErrorStatus::NotWritable);
            return false;
        };
        sub.set_query(query);
        let object = entry.object().clone();
        sub.set_target(entry);

        let Some(writable) = object.as_writable() else {
            sub.set_error(ErrorStatus::NotWritable);
            return false;
        };
        if !self.lock_object(ctx, object.as_ref()) {
            sub.set_error(ErrorStatus::ResourceUnavailable);
            return false;
        }
        sub.locked = true;

        let result = writable.validate(ctx, &vb);
        if !result.is_ok() {
            sub.set_error(result.to_error_status());
            return false;
        }
        sub.validated = true;

        if stage {
            let result = writable.apply(ctx, &vb, sub.undo_slot());
            if !result.is_ok() {
                sub.set_error(result.to_error_status());
                return false;
            }
            sub.applied = true;
        }
        true
    }

    /// Commit every applied variable in order. Stops at the first failure.
    fn commit(&self, ctx: &RequestContext, subs: &mut [SubRequest]) -> bool {
        for sub in subs.iter_mut() {
            let Some(object) = target_object(sub) else {
                continue;
            };
            let Some(writable) = object.as_writable() else {
                continue;
            };
            if !writable.commit(ctx, sub.varbind()).is_ok() {
                sub.set_error(ErrorStatus::CommitFailed);
                return false;
            }
            sub.complete();
        }
        true
    }

    /// Undo applied variables in reverse order, each exactly once.
    fn undo(&self, ctx: &RequestContext, subs: &mut [SubRequest]) {
        for sub in subs.iter_mut().rev().filter(|s| s.applied) {
            sub.applied = false;
            let Some(object) = target_object(sub) else {
                continue;
            };
            let Some(writable) = object.as_writable() else {
                continue;
            };
            let result = writable.undo(ctx, sub.varbind(), sub.undo_value());
            if !result.is_ok() {
                tracing::warn!(
                    snmp.request_id = ctx.request_id,
                    snmp.oid = %sub.varbind().oid,
                    snmp.set_result = ?result,
                    "undo failed"
                );
                sub.set_error(ErrorStatus::UndoFailed);
            }
        }
    }

    /// Clean up validated variables and release every lock of the request.
    fn release(&self, ctx: &RequestContext, subs: &mut [SubRequest]) {
        for sub in subs.iter_mut() {
            let Some(object) = target_object(sub) else {
                continue;
            };
            if sub.validated
                && let Some(writable) = object.as_writable()
            {
                writable.cleanup(ctx, sub.varbind());
            }
            if sub.locked {
                self.unlock_object(ctx, object.as_ref());
                sub.locked = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::handler::{
        GetNextResult, GetResult, ManagedObject, RequestContext, SetResult, Writable,
    };
    use crate::oid::Oid;
    use crate::pdu::Pdu;
    use crate::query::Query;
    use crate::registry::Registry;
    use crate::scope::Scope;
    use crate::value::Value;
    use crate::varbind::VarBind;
    use crate::version::Version;
    use crate::{oid, Agent, ErrorStatus};

    struct Cell {
        oid: Oid,
        value: Mutex<Value>,
        fail_commit: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Cell {
        fn new(oid: Oid, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                oid,
                value: Mutex::new(Value::Integer(0)),
                fail_commit: false,
                log: log.clone(),
            })
        }

        fn record(&self, phase: &str) {
            self.log.lock().push(format!("{} {}", phase, self.oid));
        }
    }

    impl ManagedObject for Cell {
        fn scope(&self) -> Scope {
            Scope::exact(self.oid.clone())
        }

        fn get(&self, _ctx: &RequestContext, _oid: &Oid) -> GetResult {
            GetResult::Value(self.value.lock().clone())
        }

        fn next(&self, _ctx: &RequestContext, query: &Query) -> GetNextResult {
            let mut values = BTreeMap::new();
            values.insert(self.oid.clone(), self.value.lock().clone());
            query
                .scope()
                .scope()
                .first_entry(&values)
                .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
                .into()
        }

        fn as_writable(&self) -> Option<&dyn Writable> {
            Some(self)
        }
    }

    impl Writable for Cell {
        fn validate(&self, _ctx: &RequestContext, vb: &VarBind) -> SetResult {
            self.record("validate");
            match vb.value {
                Value::Integer(v) if v >= 0 => SetResult::Ok,
                Value::Integer(_) => SetResult::WrongValue,
                _ => SetResult::WrongType,
            }
        }

        fn apply(&self, _ctx: &RequestContext, vb: &VarBind, undo: &mut Option<Value>) -> SetResult {
            self.record("apply");
            let mut value = self.value.lock();
            *undo = Some(value.clone());
            *value = vb.value.clone();
            SetResult::Ok
        }

        fn commit(&self, _ctx: &RequestContext, _vb: &VarBind) -> SetResult {
            self.record("commit");
            if self.fail_commit {
                SetResult::CommitFailed
            } else {
                SetResult::Ok
            }
        }

        fn undo(&self, _ctx: &RequestContext, _vb: &VarBind, undo: Option<&Value>) -> SetResult {
            self.record("undo");
            if let Some(previous) = undo {
                *self.value.lock() = previous.clone();
            }
            SetResult::Ok
        }
    }

    fn setup(cells: &[Arc<Cell>]) -> Agent {
        let registry = Arc::new(Registry::new());
        for c in cells {
            registry.register(c.clone(), None).unwrap();
        }
        Agent::builder().registry(registry).build()
    }

    #[test]
    fn test_set_success_commits_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Cell::new(oid!(1, 1), &log);
        let b = Cell::new(oid!(1, 2), &log);
        let agent = setup(&[a.clone(), b.clone()]);

        let pdu = Pdu::set(
            1,
            vec![
                VarBind::new(oid!(1, 1), Value::Integer(10)),
                VarBind::new(oid!(1, 2), Value::Integer(20)),
            ],
        );
        let response = agent
            .process(RequestContext::new(Version::V2c), pdu)
            .unwrap();
        assert!(!response.is_error());
        assert_eq!(*a.value.lock(), Value::Integer(10));
        assert_eq!(*b.value.lock(), Value::Integer(20));
        assert_eq!(
            *log.lock(),
            vec![
                "validate 1.1",
                "apply 1.1",
                "validate 1.2",
                "apply 1.2",
                "commit 1.1",
                "commit 1.2",
            ]
        );
        assert!(agent.registry().lock_info(a.as_ref()).is_none());
    }

    #[test]
    fn test_commit_failure_undoes_everything() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Cell::new(oid!(1, 1), &log);
        let b = Arc::new(Cell {
            fail_commit: true,
            ..Arc::into_inner(Cell::new(oid!(1, 2), &log)).unwrap()
        });
        let agent = setup(&[a.clone(), b.clone()]);

        let pdu = Pdu::set(
            1,
            vec![
                VarBind::new(oid!(1, 1), Value::Integer(10)),
                VarBind::new(oid!(1, 2), Value::Integer(20)),
            ],
        );
        let response = agent
            .process(RequestContext::new(Version::V2c), pdu)
            .unwrap();
        assert_eq!(response.error_status, ErrorStatus::CommitFailed);
        assert_eq!(response.error_index, 2);
        assert_eq!(*a.value.lock(), Value::Integer(0));
        assert_eq!(*b.value.lock(), Value::Integer(0));
        let log = log.lock();
        assert_eq!(&log[log.len() - 2..], ["undo 1.2", "undo 1.1"]);
    }

    #[test]
    fn test_unregistered_is_not_writable() {
        let agent = setup(&[]);
        let pdu = Pdu::set(1, vec![VarBind::new(oid!(1, 1), Value::Integer(1))]);
        let response = agent
            .process(RequestContext::new(Version::V2c), pdu.clone())
            .unwrap();
        assert_eq!(response.error_status, ErrorStatus::NotWritable);

        let response = agent
            .process(RequestContext::new(Version::V1), pdu)
            .unwrap();
        assert_eq!(response.error_status, ErrorStatus::NoSuchName);
    }

    #[test]
    fn test_first_failure_prevents_staging() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Cell::new(oid!(1, 1), &log);
        let b = Cell::new(oid!(1, 2), &log);
        let agent = setup(&[a.clone(), b.clone()]);

        let pdu = Pdu::set(
            1,
            vec![
                VarBind::new(oid!(1, 1), Value::Integer(-1)),
                VarBind::new(oid!(1, 2), Value::from("x")),
            ],
        );
        let response = agent
            .process(RequestContext::new(Version::V2c), pdu)
            .unwrap();
        assert_eq!(response.error_status, ErrorStatus::WrongValue);
        assert_eq!(response.error_index, 1);
        assert_eq!(*log.lock(), vec!["validate 1.1", "validate 1.2"]);
    }
}
