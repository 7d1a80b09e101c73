//! In-flight request tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{Error, Result};

type Key = (Bytes, i32);

/// Requests currently being processed, keyed by principal and request id.
///
/// A retransmission that arrives while the original is still being
/// processed is rejected instead of running a second time. Entries older
/// than the maturity are dropped lazily, so a request whose worker never
/// finished does not block its id forever.
#[derive(Debug)]
pub struct PendingRequests {
    maturity: Duration,
    entries: Mutex<HashMap<Key, Instant>>,
}

impl PendingRequests {
    /// Track requests for at most `maturity`.
    pub fn new(maturity: Duration) -> Self {
        Self {
            maturity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record the start of a request. The entry is removed when the
    /// returned guard is dropped.
    ///
    /// Fails with [`Error::DuplicateRequest`] if the same principal already
    /// has a live request with this id.
    pub fn begin(&self, principal: Bytes, request_id: i32) -> Result<PendingGuard<'_>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, deadline| *deadline > now);

        let key = (principal, request_id);
        if entries.contains_key(&key) {
            tracing::debug!(
                snmp.request_id = request_id,
                snmp.principal = %String::from_utf8_lossy(&key.0),
                "duplicate request still in progress"
            );
            return Err(Error::DuplicateRequest { request_id });
        }
        entries.insert(key.clone(), now + self.maturity);
        Ok(PendingGuard { pending: self, key })
    }

    /// Returns `true` if a live request with this key exists.
    pub fn contains(&self, principal: &[u8], request_id: i32) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .iter()
            .any(|((p, id), deadline)| *id == request_id && p.as_ref() == principal && *deadline > now)
    }

    /// Number of tracked requests, expired ones included until the next
    /// [`begin`](PendingRequests::begin).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its request from [`PendingRequests`] when dropped.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    pending: &'a PendingRequests,
    key: Key,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.entries.lock().remove(&self.key);
    }
}
