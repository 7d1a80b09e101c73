//! Request state.
//!
//! A [`Request`] is created per inbound operation and owns one
//! [`SubRequest`] per addressed variable. It lives on the worker driving it
//! and needs no synchronization. The registry and its lock table are the
//! only shared state touched while processing it.
//!
//! # GETBULK
//!
//! With `N` non-repeaters, `R` repeaters and `M` max-repetitions, the first
//! `N + R` sub-requests exist from the start and further rows are derived
//! lazily while iterating with a [`Cursor`]. Every repetition searches after
//! the OID its row predecessor resolved to.

mod iter;
mod sub_request;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::access::ViewKind;
use crate::ber;
use crate::error::ErrorStatus;
use crate::handler::{RequestContext, Response};
use crate::pdu::{Pdu, PduType};
use crate::scope::Scope;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

pub use iter::Cursor;
pub use sub_request::SubRequest;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_transaction_id() -> u64 {
    NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed)
}

/// One inbound operation and the state of all its variables.
pub struct Request {
    context: RequestContext,
    pdu_type: PduType,
    non_repeaters: usize,
    max_repetitions: usize,
    repeaters: usize,
    max_size: usize,
    requested: Vec<VarBind>,
    sub_requests: Vec<SubRequest>,
    exhausted: bool,
    user_objects: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl Request {
    /// Create a request for `pdu` whose response must encode in at most
    /// `max_size` octets.
    ///
    /// Assigns a fresh transaction id and records it, the request id and the
    /// effective PDU type in the context. SNMPv1 GETBULK is processed as
    /// GETNEXT. Negative GETBULK parameters count as zero and non-repeaters
    /// beyond the variable count are clamped to it.
    pub fn new(mut context: RequestContext, pdu: Pdu, max_size: usize) -> Self {
        let pdu_type = match pdu.pdu_type {
            PduType::GetBulk if context.version == Version::V1 => PduType::GetNext,
            other => other,
        };
        let count = pdu.varbinds.len();
        let (non_repeaters, max_repetitions) = if pdu_type == PduType::GetBulk {
            (
                usize::try_from(pdu.non_repeaters).unwrap_or(0).min(count),
                usize::try_from(pdu.max_repetitions).unwrap_or(0),
            )
        } else {
            (0, 0)
        };
        let repeaters = if pdu_type == PduType::GetBulk {
            count - non_repeaters
        } else {
            0
        };

        context.request_id = pdu.request_id;
        context.pdu_type = pdu_type;
        context.transaction_id = next_transaction_id();

        let materialized = if pdu_type == PduType::GetBulk && max_repetitions == 0 {
            non_repeaters
        } else {
            count
        };
        let sub_requests = pdu
            .varbinds
            .iter()
            .take(materialized)
            .enumerate()
            .map(|(index, vb)| {
                let scope = if pdu_type.is_next() {
                    Scope::after(vb.oid.clone())
                } else {
                    Scope::exact(vb.oid.clone())
                };
                let varbind = if pdu_type.is_write() {
                    vb.clone()
                } else {
                    VarBind::null(vb.oid.clone())
                };
                SubRequest::new(index, varbind, scope)
            })
            .collect();

        tracing::debug!(
            snmp.request_id = pdu.request_id,
            snmp.transaction_id = context.transaction_id,
            snmp.pdu_type = %pdu_type,
            snmp.varbind_count = count,
            "created request"
        );

        Self {
            context,
            pdu_type,
            non_repeaters,
            max_repetitions,
            repeaters,
            max_size,
            requested: pdu.varbinds,
            sub_requests,
            exhausted: false,
            user_objects: HashMap::new(),
        }
    }

    /// Request context, including the transaction id.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Process-wide identifier of this request. Later requests get larger
    /// ids.
    pub fn transaction_id(&self) -> u64 {
        self.context.transaction_id
    }

    /// Request id from the PDU.
    pub fn request_id(&self) -> i32 {
        self.context.request_id
    }

    /// Effective operation (SNMPv1 GETBULK reports `GetNext`).
    pub fn pdu_type(&self) -> PduType {
        self.pdu_type
    }

    /// Protocol version.
    pub fn version(&self) -> Version {
        self.context.version
    }

    /// Access view governing this request.
    pub fn view_kind(&self) -> ViewKind {
        self.pdu_type.view_kind()
    }

    /// Effective non-repeaters (GETBULK).
    pub fn non_repeaters(&self) -> usize {
        self.non_repeaters
    }

    /// Effective max-repetitions (GETBULK).
    pub fn max_repetitions(&self) -> usize {
        self.max_repetitions
    }

    /// Number of repeated variables per row (GETBULK), 0 otherwise.
    pub fn repeater_count(&self) -> usize {
        self.repeaters
    }

    /// Response size budget in octets.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Variable bindings as received.
    pub fn requested(&self) -> &[VarBind] {
        &self.requested
    }

    /// Cursor over the sub-requests in processing order.
    pub fn cursor(&self) -> Cursor {
        Cursor::new()
    }

    /// Sub-requests created so far.
    pub fn sub_requests(&self) -> &[SubRequest] {
        &self.sub_requests
    }

    pub(crate) fn sub_requests_mut(&mut self) -> &mut [SubRequest] {
        &mut self.sub_requests
    }

    /// Sub-request at `index`, if created.
    pub fn sub_request(&self, index: usize) -> Option<&SubRequest> {
        self.sub_requests.get(index)
    }

    /// Mutable sub-request at `index`, if created.
    pub fn sub_request_mut(&mut self, index: usize) -> Option<&mut SubRequest> {
        self.sub_requests.get_mut(index)
    }

    /// Number of sub-requests created so far.
    pub fn len(&self) -> usize {
        self.sub_requests.len()
    }

    /// Returns `true` if the request has no sub-requests.
    pub fn is_empty(&self) -> bool {
        self.sub_requests.is_empty()
    }

    /// Returns `true` when every created sub-request is complete.
    pub fn is_complete(&self) -> bool {
        self.sub_requests.iter().all(SubRequest::is_complete)
    }

    /// Later repetitions of the variable at `index` that exist already.
    pub fn repetitions(&self, index: usize) -> impl Iterator<Item = &SubRequest> + '_ {
        let start = if self.repeaters > 0 && index >= self.non_repeaters {
            index + self.repeaters
        } else {
            self.sub_requests.len()
        };
        self.sub_requests
            .iter()
            .skip(start)
            .step_by(self.repeaters.max(1))
    }

    /// Push an exception at `index` to the repetitions already created after
    /// it and mark them complete. Returns how many were updated.
    ///
    /// Does nothing unless the sub-request at `index` holds an exception.
    pub fn update_next_repetition(&mut self, index: usize) -> usize {
        let Some(value) = self
            .sub_requests
            .get(index)
            .map(|s| s.varbind().value.clone())
            .filter(Value::is_exception)
        else {
            return 0;
        };
        if self.repeaters == 0 || index < self.non_repeaters {
            return 0;
        }
        let mut updated = 0;
        let mut next = index + self.repeaters;
        while let Some(sub) = self.sub_requests.get_mut(next) {
            sub.complete_with_value(value.clone());
            updated += 1;
            next += self.repeaters;
        }
        updated
    }

    /// Number of repetition rows whose sub-requests are all complete.
    pub fn complete_repetitions(&self) -> usize {
        if self.repeaters == 0 {
            return 0;
        }
        self.sub_requests
            .get(self.non_repeaters..)
            .unwrap_or(&[])
            .chunks(self.repeaters)
            .take_while(|row| row.len() == self.repeaters && row.iter().all(SubRequest::is_complete))
            .count()
    }

    /// Attach a value for the duration of the request.
    pub fn set_user_object<T>(&mut self, key: &'static str, value: T)
    where
        T: Any + Send + Sync,
    {
        self.user_objects.insert(key, Box::new(value));
    }

    /// Value attached with [`set_user_object`](Request::set_user_object),
    /// if it has type `T`.
    pub fn user_object<T: Any>(&self, key: &str) -> Option<&T> {
        self.user_objects.get(key)?.downcast_ref()
    }

    /// The lowest-index sub-request that failed.
    pub fn first_error(&self) -> Option<&SubRequest> {
        self.sub_requests.iter().find(|s| s.has_error())
    }

    /// Aggregate status: the status of the lowest-index failure.
    pub fn error_status(&self) -> ErrorStatus {
        self.first_error()
            .map_or(ErrorStatus::NoError, SubRequest::status)
    }

    /// 1-based position of the lowest-index failure among the received
    /// variable bindings, 0 if none failed.
    pub fn error_index(&self) -> u32 {
        self.first_error()
            .map_or(0, |s| self.request_position(s.index()) as u32 + 1)
    }

    // Repetitions report the position of their column in the request.
    fn request_position(&self, index: usize) -> usize {
        if self.repeaters > 0 && index >= self.non_repeaters {
            self.non_repeaters + (index - self.non_repeaters) % self.repeaters
        } else {
            index
        }
    }

    /// Encoded size of a response carrying the current bindings.
    pub fn encoded_len(&self) -> usize {
        ber::pdu_encoded_len(
            self.request_id(),
            0,
            0,
            self.sub_requests.iter().map(SubRequest::varbind),
        )
    }

    pub(crate) fn has_next(&mut self, position: usize) -> bool {
        if position < self.sub_requests.len() {
            return true;
        }
        if self.exhausted || self.repeaters == 0 {
            return false;
        }
        // a finished row is checked before the repetition cap so an
        // all-endOfMibView last row is dropped whatever max-repetitions is
        if position > self.non_repeaters && (position - self.non_repeaters) % self.repeaters == 0 {
            let row_start = position - self.repeaters;
            let last_row = &self.sub_requests[row_start..position];
            if last_row
                .iter()
                .all(|s| s.varbind().value == Value::EndOfMibView)
            {
                // the first row is answered even when it is all endOfMibView
                if row_start > self.non_repeaters {
                    self.sub_requests.truncate(row_start);
                }
                self.exhausted = true;
                tracing::trace!(
                    snmp.request_id = self.request_id(),
                    snmp.rows = self.complete_repetitions(),
                    "bulk walk reached end of MIB view"
                );
                return false;
            }
            let row_len: usize = last_row.iter().map(|s| s.varbind().encoded_len()).sum();
            if self.encoded_len() + row_len > self.max_size {
                self.exhausted = true;
                tracing::trace!(
                    snmp.request_id = self.request_id(),
                    snmp.max_size = self.max_size,
                    "bulk walk stopped at response size limit"
                );
                return false;
            }
        }
        position < self.non_repeaters + self.max_repetitions * self.repeaters
    }

    pub(crate) fn materialize(&mut self, index: usize) {
        if index < self.sub_requests.len() || self.repeaters == 0 || index < self.repeaters {
            return;
        }
        let predecessor = index - self.repeaters;
        let sub = SubRequest::repetition_of(index, predecessor, &self.sub_requests[predecessor]);
        self.sub_requests.push(sub);
    }

    /// Assemble the response.
    ///
    /// On failure the response repeats the received bindings with the
    /// status and position of the lowest-index failure. For SNMPv1 an
    /// exception value left in any binding takes precedence and is reported
    /// as `noSuchName` at the first such position; other failures get the
    /// legacy status vocabulary. A response over the size
    /// budget is `tooBig` with no bindings; GETBULK drops trailing
    /// repetitions first.
    pub fn response(&self) -> Response {
        let legacy = self.context.version.is_legacy();

        if legacy
            && let Some(position) = self
                .sub_requests
                .iter()
                .position(|s| s.varbind().is_exception())
        {
            let index = self.request_position(position) as u32 + 1;
            return self.error_response(ErrorStatus::NoSuchName, index);
        }

        if let Some(failed) = self.first_error() {
            let status = if legacy {
                failed.status().to_v1()
            } else {
                failed.status()
            };
            return self.error_response(status, self.error_index());
        }

        let mut varbinds: Vec<VarBind> = self
            .sub_requests
            .iter()
            .map(|s| s.varbind().clone())
            .collect();

        let fits = |vbs: &[VarBind]| ber::pdu_encoded_len(self.request_id(), 0, 0, vbs) <= self.max_size;
        if !fits(&varbinds) {
            if self.pdu_type == PduType::GetBulk {
                while varbinds.len() > self.non_repeaters && !fits(&varbinds) {
                    varbinds.pop();
                }
            }
            if !fits(&varbinds) {
                tracing::debug!(
                    snmp.request_id = self.request_id(),
                    snmp.max_size = self.max_size,
                    "response exceeds size limit"
                );
                return Response {
                    request_id: self.request_id(),
                    varbinds: Vec::new(),
                    error_status: ErrorStatus::TooBig,
                    error_index: 0,
                };
            }
        }

        Response {
            request_id: self.request_id(),
            varbinds,
            error_status: ErrorStatus::NoError,
            error_index: 0,
        }
    }

    fn error_response(&self, status: ErrorStatus, index: u32) -> Response {
        Response {
            request_id: self.request_id(),
            varbinds: self.requested.clone(),
            error_status: status,
            error_index: index,
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("transaction_id", &self.transaction_id())
            .field("request_id", &self.request_id())
            .field("pdu_type", &self.pdu_type)
            .field("non_repeaters", &self.non_repeaters)
            .field("max_repetitions", &self.max_repetitions)
            .field("sub_requests", &self.sub_requests)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::oid::Oid;
    use std::collections::BTreeMap;

    fn ctx(version: Version) -> RequestContext {
        RequestContext::new(version)
    }

    fn table(rows: &[u32]) -> BTreeMap<Oid, Value> {
        rows.iter()
            .map(|r| (oid!(1, *r), Value::Integer(*r as i32)))
            .collect()
    }

    /// Answer every sub-request from `data` the way a walk would.
    fn walk(request: &mut Request, data: &BTreeMap<Oid, Value>) {
        let mut cursor = request.cursor();
        while let Some(sub) = cursor.next(request) {
            if sub.is_complete() {
                continue;
            }
            match sub.scope().first_entry(data) {
                Some((oid, value)) => sub.complete_with(VarBind::new(oid.clone(), value.clone())),
                None => sub.complete_with_value(Value::EndOfMibView),
            }
        }
    }

    fn oids(response: &Response) -> Vec<Oid> {
        response.varbinds.iter().map(|vb| vb.oid.clone()).collect()
    }

    #[test]
    fn test_transaction_ids_increase() {
        let a = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1)]), 1472);
        let b = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1)]), 1472);
        assert!(b.transaction_id() > a.transaction_id());
        assert_eq!(a.context().transaction_id, a.transaction_id());
    }

    #[test]
    fn test_scopes_per_operation() {
        let get = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1, 3)]), 1472);
        assert!(get.sub_requests()[0].scope().contains(&oid!(1, 3)));
        assert!(!get.sub_requests()[0].scope().contains(&oid!(1, 3, 0)));

        let next = Request::new(ctx(Version::V2c), Pdu::get_next(1, &[oid!(1, 3)]), 1472);
        assert!(!next.sub_requests()[0].scope().contains(&oid!(1, 3)));
        assert!(next.sub_requests()[0].scope().contains(&oid!(1, 3, 0)));
        assert_eq!(next.view_kind(), ViewKind::Read);

        let set = Request::new(
            ctx(Version::V2c),
            Pdu::set(1, vec![VarBind::new(oid!(1, 3), Value::Integer(5))]),
            1472,
        );
        assert_eq!(set.sub_requests()[0].varbind().value, Value::Integer(5));
        assert_eq!(set.view_kind(), ViewKind::Write);
    }

    #[test]
    fn test_bulk_parameter_clamping() {
        let oids = [oid!(1, 1), oid!(1, 2)];
        let r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, -3, -1, &oids), 1472);
        assert_eq!((r.non_repeaters(), r.max_repetitions()), (0, 0));
        assert!(r.is_empty());

        let r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, 9, 4, &oids), 1472);
        assert_eq!(r.non_repeaters(), 2);
        assert_eq!(r.repeater_count(), 0);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_v1_bulk_is_get_next() {
        let r = Request::new(
            ctx(Version::V1),
            Pdu::get_bulk(1, 0, 10, &[oid!(1, 1), oid!(1, 2)]),
            1472,
        );
        assert_eq!(r.pdu_type(), PduType::GetNext);
        assert_eq!(r.context().pdu_type, PduType::GetNext);
        assert_eq!(r.repeater_count(), 0);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_bulk_stops_after_last_row() {
        let data = table(&[1, 2, 3]);
        let mut r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, 0, 5, &[oid!(1, 0)]), 1472);
        walk(&mut r, &data);
        let response = r.response();
        assert_eq!(oids(&response), vec![oid!(1, 1), oid!(1, 2), oid!(1, 3)]);
        assert_eq!(r.complete_repetitions(), 3);
    }

    #[test]
    fn test_bulk_end_row_dropped_at_repetition_cap() {
        let data = table(&[1, 2, 3]);
        for max_repetitions in [4, 5, 8] {
            let mut r = Request::new(
                ctx(Version::V2c),
                Pdu::get_bulk(1, 0, max_repetitions, &[oid!(1, 0)]),
                1472,
            );
            walk(&mut r, &data);
            assert_eq!(oids(&r.response()), vec![oid!(1, 1), oid!(1, 2), oid!(1, 3)]);
            assert_eq!(r.len(), 3);
        }
    }

    #[test]
    fn test_bulk_first_row_end_of_mib_is_kept() {
        let data = table(&[]);
        let mut r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, 0, 5, &[oid!(1, 0)]), 1472);
        walk(&mut r, &data);
        let response = r.response();
        assert_eq!(response.varbinds.len(), 1);
        assert_eq!(response.varbinds[0].value, Value::EndOfMibView);
    }

    #[test]
    fn test_bulk_respects_max_repetitions() {
        let data = table(&[1, 2, 3, 4, 5, 6]);
        let mut r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, 0, 2, &[oid!(1, 0)]), 1472);
        walk(&mut r, &data);
        assert_eq!(oids(&r.response()), vec![oid!(1, 1), oid!(1, 2)]);
    }

    #[test]
    fn test_bulk_non_repeaters_and_columns() {
        let mut data = table(&[1, 2]);
        data.insert(oid!(2, 1), Value::Integer(21));
        data.insert(oid!(2, 2), Value::Integer(22));
        data.insert(oid!(3, 1), Value::Integer(31));

        let mut r = Request::new(
            ctx(Version::V2c),
            Pdu::get_bulk(1, 1, 3, &[oid!(0), oid!(1), oid!(2)]),
            1472,
        );
        walk(&mut r, &data);
        let response = r.response();
        // non-repeater, then rows (1.1, 2.1) (1.2, 2.2) (2.1, 3.1)
        assert_eq!(
            oids(&response),
            vec![
                oid!(1, 1),
                oid!(1, 1),
                oid!(2, 1),
                oid!(1, 2),
                oid!(2, 2),
                oid!(2, 1),
                oid!(3, 1),
            ]
        );
        assert_eq!(r.repetitions(1).count(), 2);
        assert_eq!(r.repetitions(0).count(), 0);
    }

    #[test]
    fn test_bulk_size_limit() {
        let data = table(&(1..200).collect::<Vec<_>>());
        let mut r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, 0, 150, &[oid!(1, 0)]), 200);
        walk(&mut r, &data);
        let response = r.response();
        assert!(!response.is_error());
        assert!(response.varbinds.len() < 150);
        assert!(ber::pdu_encoded_len(1, 0, 0, &response.varbinds) <= 200);
    }

    #[test]
    fn test_update_next_repetition_propagates_exception() {
        let mut r = Request::new(ctx(Version::V2c), Pdu::get_bulk(1, 0, 3, &[oid!(1, 0)]), 1472);
        let data = table(&[1, 2, 3, 4]);
        walk(&mut r, &data);
        r.sub_request_mut(0)
            .unwrap()
            .complete_with_value(Value::EndOfMibView);
        assert_eq!(r.update_next_repetition(0), 2);
        assert!(
            r.repetitions(0)
                .all(|s| s.varbind().value == Value::EndOfMibView)
        );
    }

    #[test]
    fn test_error_index_is_lowest_position() {
        let mut r = Request::new(
            ctx(Version::V2c),
            Pdu::get(1, &[oid!(1), oid!(2), oid!(3)]),
            1472,
        );
        r.sub_request_mut(2)
            .unwrap()
            .set_error(ErrorStatus::ResourceUnavailable);
        r.sub_request_mut(1).unwrap().set_error(ErrorStatus::GenErr);
        assert_eq!(r.error_status(), ErrorStatus::GenErr);
        assert_eq!(r.error_index(), 2);

        let response = r.response();
        assert_eq!(response.error_index, 2);
        assert_eq!(response.varbinds, r.requested().to_vec());
    }

    #[test]
    fn test_v1_remaps_status() {
        let mut r = Request::new(
            ctx(Version::V1),
            Pdu::set(1, vec![VarBind::new(oid!(1), Value::Integer(1))]),
            1472,
        );
        r.sub_request_mut(0)
            .unwrap()
            .set_error(ErrorStatus::NotWritable);
        let response = r.response();
        assert_eq!(response.error_status, ErrorStatus::NoSuchName);
        assert_eq!(response.error_index, 1);
    }

    #[test]
    fn test_v1_exception_becomes_no_such_name() {
        let mut r = Request::new(ctx(Version::V1), Pdu::get(1, &[oid!(1), oid!(2)]), 1472);
        r.sub_request_mut(0)
            .unwrap()
            .complete_with_value(Value::Integer(1));
        r.sub_request_mut(1)
            .unwrap()
            .complete_with_value(Value::NoSuchInstance);
        let response = r.response();
        assert_eq!(response.error_status, ErrorStatus::NoSuchName);
        assert_eq!(response.error_index, 2);
        assert_eq!(response.varbinds[1].value, Value::Null);
    }

    #[test]
    fn test_v1_exception_outranks_recorded_error() {
        let mut r = Request::new(ctx(Version::V1), Pdu::get(1, &[oid!(1), oid!(2)]), 1472);
        r.sub_request_mut(0)
            .unwrap()
            .complete_with_value(Value::NoSuchObject);
        r.sub_request_mut(1)
            .unwrap()
            .set_error(ErrorStatus::ResourceUnavailable);
        let response = r.response();
        assert_eq!(response.error_status, ErrorStatus::NoSuchName);
        assert_eq!(response.error_index, 1);
        assert!(response.varbinds.iter().all(|vb| vb.value == Value::Null));

        // v2c reports the recorded error
        let mut r = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1), oid!(2)]), 1472);
        r.sub_request_mut(0)
            .unwrap()
            .complete_with_value(Value::NoSuchObject);
        r.sub_request_mut(1)
            .unwrap()
            .set_error(ErrorStatus::ResourceUnavailable);
        let response = r.response();
        assert_eq!(response.error_status, ErrorStatus::ResourceUnavailable);
        assert_eq!(response.error_index, 2);
    }

    #[test]
    fn test_v2_passes_exceptions_through() {
        let mut r = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1)]), 1472);
        r.sub_request_mut(0)
            .unwrap()
            .complete_with_value(Value::NoSuchObject);
        let response = r.response();
        assert!(!response.is_error());
        assert_eq!(response.varbinds[0].value, Value::NoSuchObject);
    }

    #[test]
    fn test_too_big() {
        let mut r = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1, 3)]), 20);
        r.sub_request_mut(0)
            .unwrap()
            .complete_with_value(Value::from("a long description that will not fit"));
        let response = r.response();
        assert_eq!(response.error_status, ErrorStatus::TooBig);
        assert!(response.varbinds.is_empty());
    }

    #[test]
    fn test_user_objects() {
        let mut r = Request::new(ctx(Version::V2c), Pdu::get(1, &[oid!(1)]), 1472);
        r.set_user_object("retries", 3u32);
        assert_eq!(r.user_object::<u32>("retries"), Some(&3));
        assert_eq!(r.user_object::<i64>("retries"), None);
        assert_eq!(r.user_object::<u32>("missing"), None);
    }
}
