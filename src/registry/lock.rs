//! Advisory per-object locks.
//!
//! Locks are keyed by object identity and owned by a [`LockOwner`] (the
//! request engine uses the transaction id). A lock is reentrant for its
//! owner: every successful acquisition increments the hold count and the
//! entry disappears once the count drops back to zero.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::handler::ManagedObject;

/// Identity of a managed object, derived from its address.
///
/// Two `Arc`s pointing at the same object have the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Identity of `object`.
    pub fn of(object: &dyn ManagedObject) -> Self {
        Self(object as *const dyn ManagedObject as *const () as usize)
    }
}

/// Owner of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockOwner(pub u64);

impl From<u64> for LockOwner {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LockOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a lock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The caller now holds the lock.
    Acquired,
    /// Another owner kept the lock for the whole timeout.
    TimedOut,
    /// The wait was cut short by [`LockTable::interrupt_waiters`].
    Interrupted,
}

impl LockOutcome {
    /// Returns `true` for [`LockOutcome::Acquired`].
    pub fn is_acquired(self) -> bool {
        matches!(self, LockOutcome::Acquired)
    }
}

/// Snapshot of a held lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockInfo {
    /// Current owner.
    pub owner: LockOwner,
    /// When the owner first acquired the lock.
    pub acquired_at: Instant,
    /// Number of unreleased acquisitions.
    pub hold_count: u32,
}

#[derive(Debug, Default)]
struct LockState {
    held: HashMap<ObjectId, LockInfo>,
    // bumped by interrupt_waiters; waiters compare against the value they saw
    epoch: u64,
}

impl LockState {
    fn try_acquire(&mut self, owner: LockOwner, object: ObjectId) -> bool {
        match self.held.get_mut(&object) {
            None => {
                self.held.insert(
                    object,
                    LockInfo {
                        owner,
                        acquired_at: Instant::now(),
                        hold_count: 1,
                    },
                );
                true
            }
            Some(info) if info.owner == owner => {
                info.hold_count += 1;
                true
            }
            Some(_) => false,
        }
    }
}

/// Table of held locks with blocking acquisition.
#[derive(Debug, Default)]
pub struct LockTable {
    state: Mutex<LockState>,
    released: Condvar,
}

impl LockTable {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock on `object` for `owner`.
    ///
    /// Blocks while a different owner holds it, for at most `timeout`
    /// (`None`, or a timeout too large to represent as a deadline, waits
    /// indefinitely). Re-acquiring a lock the owner already holds never
    /// blocks.
    pub fn lock(&self, owner: LockOwner, object: ObjectId, timeout: Option<Duration>) -> LockOutcome {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.state.lock();
        let epoch = state.epoch;

        loop {
            if state.try_acquire(owner, object) {
                tracing::trace!(snmp.lock_owner = %owner, "lock acquired");
                return LockOutcome::Acquired;
            }

            let timed_out = match deadline {
                Some(deadline) => self.released.wait_until(&mut state, deadline).timed_out(),
                None => {
                    self.released.wait(&mut state);
                    false
                }
            };

            if state.epoch != epoch {
                tracing::warn!(snmp.lock_owner = %owner, "lock wait interrupted");
                return LockOutcome::Interrupted;
            }
            if timed_out {
                if state.try_acquire(owner, object) {
                    return LockOutcome::Acquired;
                }
                tracing::debug!(snmp.lock_owner = %owner, ?timeout, "lock wait timed out");
                return LockOutcome::TimedOut;
            }
        }
    }

    /// Release one hold of `owner` on `object`.
    ///
    /// Releasing a lock the caller does not hold is a no-op and returns
    /// `false`.
    pub fn unlock(&self, owner: LockOwner, object: ObjectId) -> bool {
        let mut state = self.state.lock();
        let Some(info) = state.held.get_mut(&object) else {
            return false;
        };
        if info.owner != owner {
            tracing::debug!(
                snmp.lock_owner = %owner,
                snmp.lock_holder = %info.owner,
                "ignoring unlock by non-owner"
            );
            return false;
        }
        info.hold_count -= 1;
        if info.hold_count == 0 {
            state.held.remove(&object);
            drop(state);
            self.released.notify_all();
        }
        true
    }

    /// Current holder of `object`'s lock, if any.
    pub fn info(&self, object: ObjectId) -> Option<LockInfo> {
        self.state.lock().held.get(&object).copied()
    }

    /// Number of objects currently locked.
    pub fn len(&self) -> usize {
        self.state.lock().held.len()
    }

    /// Returns `true` if no object is locked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wake every blocked `lock` call and make it return
    /// [`LockOutcome::Interrupted`].
    pub fn interrupt_waiters(&self) {
        self.state.lock().epoch += 1;
        self.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    const OBJ: ObjectId = ObjectId(0x1000);

    #[test]
    fn test_reentrant_for_owner() {
        let table = LockTable::new();
        let a = LockOwner(1);
        assert!(table.lock(a, OBJ, None).is_acquired());
        assert!(table.lock(a, OBJ, None).is_acquired());
        assert_eq!(table.info(OBJ).unwrap().hold_count, 2);

        assert!(table.unlock(a, OBJ));
        assert_eq!(table.info(OBJ).unwrap().hold_count, 1);
        assert!(table.unlock(a, OBJ));
        assert!(table.info(OBJ).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_unlock_by_non_owner_is_noop() {
        let table = LockTable::new();
        assert!(table.lock(LockOwner(1), OBJ, None).is_acquired());
        assert!(!table.unlock(LockOwner(2), OBJ));
        let info = table.info(OBJ).unwrap();
        assert_eq!(info.owner, LockOwner(1));
        assert_eq!(info.hold_count, 1);
        assert!(!table.unlock(LockOwner(1), ObjectId(0x2000)));
    }

    #[test]
    fn test_timeout_without_acquiring() {
        let table = LockTable::new();
        assert!(table.lock(LockOwner(1), OBJ, None).is_acquired());
        let outcome = table.lock(LockOwner(2), OBJ, Some(Duration::from_millis(20)));
        assert_eq!(outcome, LockOutcome::TimedOut);
        assert_eq!(table.info(OBJ).unwrap().owner, LockOwner(1));
    }

    #[test]
    fn test_waiter_acquires_after_release() {
        let table = Arc::new(LockTable::new());
        assert!(table.lock(LockOwner(1), OBJ, None).is_acquired());

        let waiter = {
            let table = table.clone();
            thread::spawn(move || table.lock(LockOwner(2), OBJ, Some(Duration::from_secs(5))))
        };
        thread::sleep(Duration::from_millis(20));
        assert!(table.unlock(LockOwner(1), OBJ));

        assert_eq!(waiter.join().unwrap(), LockOutcome::Acquired);
        assert_eq!(table.info(OBJ).unwrap().owner, LockOwner(2));
    }

    #[test]
    fn test_interrupt_wakes_waiter() {
        let table = Arc::new(LockTable::new());
        assert!(table.lock(LockOwner(1), OBJ, None).is_acquired());

        let waiter = {
            let table = table.clone();
            thread::spawn(move || table.lock(LockOwner(2), OBJ, None))
        };
        // keep interrupting until the waiter has actually started waiting
        while !waiter.is_finished() {
            table.interrupt_waiters();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(waiter.join().unwrap(), LockOutcome::Interrupted);
        assert_eq!(table.info(OBJ).unwrap().owner, LockOwner(1));
    }

    #[test]
    fn test_unrepresentable_timeout_waits_indefinitely() {
        let table = Arc::new(LockTable::new());
        assert!(table.lock(LockOwner(1), OBJ, None).is_acquired());

        let waiter = {
            let table = table.clone();
            thread::spawn(move || table.lock(LockOwner(2), OBJ, Some(Duration::MAX)))
        };
        while !waiter.is_finished() {
            table.interrupt_waiters();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(waiter.join().unwrap(), LockOutcome::Interrupted);
        assert!(table.lock(LockOwner(1), OBJ, Some(Duration::MAX)).is_acquired());
        assert_eq!(table.info(OBJ).unwrap().hold_count, 2);
    }

    #[test]
    fn test_mutual_exclusion() {
        let table = Arc::new(LockTable::new());
        let inside = Arc::new(AtomicU32::new(0));
        let handles: Vec<_> = (0..8u64)
            .map(|owner| {
                let table = table.clone();
                let inside = inside.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        assert!(table.lock(LockOwner(owner), OBJ, None).is_acquired());
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                        assert!(table.unlock(LockOwner(owner), OBJ));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(table.is_empty());
    }
}
