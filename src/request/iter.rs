//! Processing-order traversal of a request's sub-requests.

use super::{Request, SubRequest};

/// Walks the sub-requests of a [`Request`] in processing order.
///
/// A cursor does not borrow the request between steps, so the caller can
/// look things up in the request (or mutate other sub-requests) while
/// walking. For GETBULK, each step past the materialized sub-requests
/// derives the next repetition from its row predecessor, which must be
/// complete by then. Expansion stops when the previous row ended entirely
/// in `endOfMibView`, when another row would not fit the response size, or
/// when `max-repetitions` rows exist.
///
/// ```rust
/// use snmp_agent_core::handler::RequestContext;
/// use snmp_agent_core::{oid, Pdu, Request, Value, Version};
///
/// let pdu = Pdu::get(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]);
/// let mut request = Request::new(RequestContext::new(Version::V2c), pdu, 1472);
///
/// let mut cursor = request.cursor();
/// while let Some(sub) = cursor.next(&mut request) {
///     sub.complete_with_value(Value::from("router"));
/// }
/// assert!(request.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The next sub-request to process, or `None` when the request has no
    /// further work.
    pub fn next<'r>(&mut self, request: &'r mut Request) -> Option<&'r mut SubRequest> {
        if !request.has_next(self.position) {
            return None;
        }
        let index = self.position;
        self.position += 1;
        request.materialize(index);
        request.sub_request_mut(index)
    }

    /// Number of sub-requests handed out so far.
    pub fn position(&self) -> usize {
        self.position
    }
}
