//! GET, GETNEXT and GETBULK processing.

use crate::access::ViewKind;
use crate::error::ErrorStatus;
use crate::handler::{GetNextResult, RequestContext};
use crate::query::Query;
use crate::request::{Request, SubRequest};
use crate::scope::ContextScope;
use crate::value::Value;

use super::Agent;

impl Agent {
    /// Resolve every sub-request of a read-family request.
    ///
    /// Denied or unregistered OIDs become `noSuchObject` for GET. For
    /// GETNEXT and GETBULK the walk skips denied instances and continues
    /// with the next registration when an object has nothing further (or
    /// answers with an OID that is not after the requested one);
    /// running out of registrations yields `endOfMibView`. A lock that
    /// cannot be acquired fails the variable with `resourceUnavailable`.
    pub(super) fn handle_read(&self, request: &mut Request) {
        let ctx = request.context().clone();
        let next = request.pdu_type().is_next();
        let mut cursor = request.cursor();
        while let Some(sub) = cursor.next(request) {
            // repetitions of an exhausted column start complete
            if sub.is_complete() {
                continue;
            }
            if next {
                self.read_next(&ctx, sub);
            } else {
                self.read_exact(&ctx, sub);
            }
            tracing::trace!(
                snmp.request_id = ctx.request_id,
                snmp.index = sub.index(),
                snmp.varbind = %sub.varbind(),
                "resolved sub-request"
            );
        }
    }

    fn read_exact(&self, ctx: &RequestContext, sub: &mut SubRequest) {
        let oid = sub.varbind().oid.clone();
        if !self.allowed(ctx, ViewKind::Read, &oid) {
            sub.complete_with_value(Value::NoSuchObject);
            return;
        }

        let query = Query::new(ContextScope::new(ctx.context.clone(), sub.scope().clone()))
            .with_source(ctx.transaction_id);
        let Some(entry) = self.inner.registry.lookup(&query) else {
            sub.complete_with_value(Value::NoSuchObject);
            return;
        };
        sub.set_query(query);

        let object = entry.object().clone();
        sub.set_target(entry);
        if !self.lock_object(ctx, object.as_ref()) {
            sub.set_error(ErrorStatus::ResourceUnavailable);
            return;
        }
        let value = object.get(ctx, &oid).into_value();
        self.unlock_object(ctx, object.as_ref());

        // SNMPv1 cannot carry Counter64
        if ctx.version.is_legacy() && matches!(value, Value::Counter64(_)) {
            sub.set_error(ErrorStatus::NoSuchName);
            return;
        }
        sub.complete_with_value(value);
    }

    fn read_next(&self, ctx: &RequestContext, sub: &mut SubRequest) {
        let mut query = Query::new(ContextScope::new(ctx.context.clone(), sub.scope().clone()))
            .with_source(ctx.transaction_id);

        loop {
            let Some(entry) = self.inner.registry.lookup(&query) else {
                sub.complete_with_value(Value::EndOfMibView);
                return;
            };
            let object = entry.object().clone();
            if !self.lock_object(ctx, object.as_ref()) {
                sub.set_target(entry);
                sub.set_error(ErrorStatus::ResourceUnavailable);
                return;
            }
            let result = object.next(ctx, &query);
            self.unlock_object(ctx, object.as_ref());

            match result {
                GetNextResult::Value(vb) if !query.scope().scope().contains(&vb.oid) => {
                    tracing::debug!(
                        snmp.request_id = ctx.request_id,
                        snmp.oid = %vb.oid,
                        snmp.scope = %entry.scope(),
                        "object answered outside the queried range, skipping it"
                    );
                    if query.advance_past(entry.scope().scope()).is_err() {
                        sub.complete_with_value(Value::EndOfMibView);
                        return;
                    }
                }
                GetNextResult::Value(vb) => {
                    let skip = !self.allowed(ctx, ViewKind::Read, &vb.oid)
                        || (ctx.version.is_legacy() && matches!(vb.value, Value::Counter64(_)));
                    if skip {
                        query.restart_after(vb.oid);
                        continue;
                    }
                    sub.set_target(entry);
                    sub.set_query(query);
                    sub.complete_with(vb);
                    return;
                }
                GetNextResult::EndOfMibView => {
                    if query.advance_past(entry.scope().scope()).is_err() {
                        sub.complete_with_value(Value::EndOfMibView);
                        return;
                    }
                }
            }
        }
    }
}
