//! Registry observers.
//!
//! Listener lists are copy-on-write: callbacks run over a snapshot taken
//! under the list's lock, so a listener may add or remove listeners (or
//! touch the registry) without deadlocking or invalidating the iteration.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::handler::ManagedObject;
use crate::oid::Oid;
use crate::query::Query;
use crate::scope::ContextScope;

/// A lookup touching one registered object.
pub struct LookupEvent<'a> {
    /// The candidate object.
    pub object: &'a Arc<dyn ManagedObject>,
    /// The scope the object is registered under.
    pub scope: &'a ContextScope,
    /// The query being answered.
    pub query: &'a Query,
}

/// Observer of lookups on a particular object.
pub trait LookupListener: Send + Sync {
    /// The object is being considered for `event.query`, before the query's
    /// match test. Objects can use this to refresh themselves.
    fn query_event(&self, _event: &LookupEvent<'_>) {}

    /// The object was returned as the answer to `event.query`.
    fn lookup_event(&self, _event: &LookupEvent<'_>) {}
}

/// Kind of change to the context set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextChange {
    /// The context became supported.
    Added,
    /// The context was dropped.
    Removed,
}

/// A change to the set of supported contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEvent {
    /// Context name.
    pub context: Bytes,
    /// What happened.
    pub change: ContextChange,
}

/// Observer of the context set.
pub trait ContextListener: Send + Sync {
    /// Called after the context set changed.
    fn context_changed(&self, event: &ContextEvent);
}

/// Kind of row change in a conceptual table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// A row was added.
    Created,
    /// A row's columns changed.
    Updated,
    /// A row was removed.
    Deleted,
}

/// A row change published by a [`TableObject`](crate::handler::TableObject).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEvent {
    /// Entry OID of the table.
    pub table: Oid,
    /// Row index.
    pub index: Oid,
    /// What happened.
    pub change: RowChange,
}

/// Observer of table rows.
pub trait RowListener: Send + Sync {
    /// Called after a row changed.
    fn row_changed(&self, event: &RowEvent);
}

/// Copy-on-write list of listeners.
pub struct ListenerList<L: ?Sized> {
    listeners: Mutex<Arc<Vec<Arc<L>>>>,
}

impl<L: ?Sized> ListenerList<L> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Arc::new(Vec::new())),
        }
    }

    /// Add a listener.
    pub fn add(&self, listener: Arc<L>) {
        let mut guard = self.listeners.lock();
        Arc::make_mut(&mut guard).push(listener);
    }

    /// Remove a listener by identity. Returns `true` if it was present.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut guard = self.listeners.lock();
        let Some(pos) = guard.iter().position(|l| Arc::ptr_eq(l, listener)) else {
            return false;
        };
        Arc::make_mut(&mut guard).remove(pos);
        true
    }

    /// The current listeners.
    pub fn snapshot(&self) -> Arc<Vec<Arc<L>>> {
        self.listeners.lock().clone()
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Returns `true` if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> std::fmt::Debug for ListenerList<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerList").field("len", &self.len()).finish()
    }
}
