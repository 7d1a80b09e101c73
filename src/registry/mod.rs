//! Managed-object registry.
//!
//! The registry maps context-tagged OID ranges to managed objects. Entries
//! are kept in one sorted partition per context, ordered by
//! [`ordering::compare`](crate::ordering::compare), so a lookup is a binary
//! search followed by a short forward scan.
//!
//! # Contexts
//!
//! - A query in the default context sees only default-context registrations.
//! - A query in context `C` sees registrations in `C` and in the default
//!   context, merged in scope order (at equal lower bounds the `C` entry
//!   wins). [`Registry::lookup_specific`] skips the default context.
//! - Registering in the default context fails if the range overlaps an
//!   existing registration in *any* context; registering in `C` only checks
//!   `C`.
//!
//! # Concurrency
//!
//! The store is copy-on-write behind a mutex. Readers take a snapshot and
//! work on it without holding the lock; writers clone the store only when
//! a snapshot is still alive. Object refreshes, listener callbacks and query
//! filters always run outside the lock.

mod listener;
mod lock;
mod update;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::iter::Peekable;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::handler::ManagedObject;
use crate::oid::Oid;
use crate::ordering::{Ordered, compare};
use crate::query::Query;
use crate::scope::{ContextScope, Scope, normalize_context};

pub use listener::{
    ContextChange, ContextEvent, ContextListener, ListenerList, LookupEvent, LookupListener,
    RowChange, RowEvent, RowListener,
};
pub use lock::{LockInfo, LockOutcome, LockOwner, LockTable, ObjectId};
pub use update::{AlwaysUpdate, SourceChangeUpdate, UpdateStrategy};

/// A registered object and the scope it is registered under.
#[derive(Clone)]
pub struct RegistryEntry {
    scope: ContextScope,
    object: Arc<dyn ManagedObject>,
}

impl RegistryEntry {
    /// Registered scope (may be narrower than the object's own scope).
    pub fn scope(&self) -> &ContextScope {
        &self.scope
    }

    /// The object.
    pub fn object(&self) -> &Arc<dyn ManagedObject> {
        &self.object
    }

    /// Identity of the object.
    pub fn id(&self) -> ObjectId {
        ObjectId::of(self.object.as_ref())
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("scope", &self.scope)
            .field("object", &self.id())
            .finish()
    }
}

#[derive(Clone, Default)]
struct Store {
    // None (the default context) sorts first
    partitions: BTreeMap<Option<Bytes>, Vec<RegistryEntry>>,
}

impl Store {
    fn partition(&self, context: &Option<Bytes>) -> &[RegistryEntry] {
        self.partitions.get(context).map(Vec::as_slice).unwrap_or(&[])
    }

    fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.partitions.values().flatten()
    }

    fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }
}

/// Entries of one partition that overlap `probe`, in order.
///
/// Entries in a partition never overlap each other, so their upper bounds
/// ascend with their lower bounds and the first candidate can be found by
/// binary search.
fn overlapping<'a>(
    partition: &'a [RegistryEntry],
    probe: &'a Query,
) -> impl Iterator<Item = &'a RegistryEntry> + 'a {
    let window = probe.scope().scope();
    let start = partition.partition_point(|e| {
        compare(Ordered::Scope(&e.scope), Ordered::Query(probe)) == Ordering::Less
    });
    partition[start..]
        .iter()
        .take_while(move |e| !starts_after(e.scope.scope(), window))
        .filter(move |e| e.scope.scope().overlaps(window))
}

/// Returns `true` if `scope` begins beyond the end of `window`.
fn starts_after(scope: &Scope, window: &Scope) -> bool {
    let Some(upper) = window.upper_bound() else {
        return false;
    };
    match scope.lower_bound().cmp(upper) {
        Ordering::Greater => true,
        Ordering::Equal => !(scope.is_lower_included() && window.is_upper_included()),
        Ordering::Less => false,
    }
}

/// Merge of a context partition and the default partition in scope order.
struct Merged<'a, A, B>
where
    A: Iterator<Item = &'a RegistryEntry>,
    B: Iterator<Item = &'a RegistryEntry>,
{
    specific: Peekable<A>,
    fallback: Peekable<B>,
}

impl<'a, A, B> Iterator for Merged<'a, A, B>
where
    A: Iterator<Item = &'a RegistryEntry>,
    B: Iterator<Item = &'a RegistryEntry>,
{
    type Item = &'a RegistryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.specific.peek(), self.fallback.peek()) {
            (Some(s), Some(f)) => {
                if compare(Ordered::Scope(&s.scope), Ordered::Scope(&f.scope)) == Ordering::Greater {
                    self.fallback.next()
                } else {
                    self.specific.next()
                }
            }
            (Some(_), None) => self.specific.next(),
            (None, _) => self.fallback.next(),
        }
    }
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    update_strategy: Option<Arc<dyn UpdateStrategy>>,
    contexts: BTreeSet<Bytes>,
}

impl RegistryBuilder {
    /// Create a builder with no update strategy and no contexts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh [`Refreshable`](crate::handler::Refreshable) objects during
    /// lookups according to `strategy`. Without a strategy objects are never
    /// refreshed by the registry.
    pub fn update_strategy(mut self, strategy: impl UpdateStrategy + 'static) -> Self {
        self.update_strategy = Some(Arc::new(strategy));
        self
    }

    /// Support `context` from the start.
    pub fn context(mut self, context: impl Into<Bytes>) -> Self {
        let context = context.into();
        if !context.is_empty() {
            self.contexts.insert(context);
        }
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry {
            store: Mutex::new(Arc::new(Store::default())),
            contexts: RwLock::new(self.contexts),
            locks: LockTable::new(),
            update_strategy: self.update_strategy,
            lookup_listeners: Mutex::new(HashMap::new()),
            context_listeners: ListenerList::new(),
        }
    }
}

/// Context-aware registry of managed objects.
///
/// Share it between workers with `Arc<Registry>`; every method takes
/// `&self`.
pub struct Registry {
    store: Mutex<Arc<Store>>,
    contexts: RwLock<BTreeSet<Bytes>>,
    locks: LockTable,
    update_strategy: Option<Arc<dyn UpdateStrategy>>,
    lookup_listeners: Mutex<HashMap<ObjectId, Arc<ListenerList<dyn LookupListener>>>>,
    context_listeners: ListenerList<dyn ContextListener>,
}

impl Registry {
    /// Create an empty registry without an update strategy.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Create a builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    fn snapshot(&self) -> Arc<Store> {
        self.store.lock().clone()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register `object` under its own scope in `context` (`None` for the
    /// default context).
    ///
    /// Fails with [`Error::DuplicateRegistration`] if the scope overlaps an
    /// existing registration it conflicts with, and with
    /// [`Error::InvalidScope`] if the object's scope is empty. Registering in
    /// a context not yet supported adds it to the context set.
    pub fn register(&self, object: Arc<dyn ManagedObject>, context: Option<Bytes>) -> Result<()> {
        let scope = ContextScope::new(context, object.scope());
        if scope.scope().is_empty() {
            return Err(Error::invalid_scope("registered scope is empty"));
        }

        {
            let mut guard = self.store.lock();
            let probe = Query::new(scope.clone());
            let conflict = if scope.is_default_context() {
                guard
                    .partitions
                    .values()
                    .find_map(|part| overlapping(part, &probe).next())
            } else {
                overlapping(guard.partition(&scope.context().cloned()), &probe).next()
            };
            if let Some(existing) = conflict {
                return Err(Error::DuplicateRegistration {
                    scope,
                    existing: existing.scope.clone(),
                });
            }

            let store = Arc::make_mut(&mut guard);
            let partition = store.partitions.entry(scope.context().cloned()).or_default();
            let pos = partition.partition_point(|e| {
                compare(Ordered::Scope(&e.scope), Ordered::Scope(&scope)) == Ordering::Less
            });
            partition.insert(
                pos,
                RegistryEntry {
                    scope: scope.clone(),
                    object,
                },
            );
        }

        tracing::info!(snmp.scope = %scope, "registered managed object");
        if let Some(context) = scope.context() {
            self.add_context(context.clone());
        }
        Ok(())
    }

    /// Remove `object`'s registration in `context`.
    ///
    /// The entry is located by the object's current scope. If that fails
    /// (the registration was narrowed since) the partition is scanned from
    /// the scope's lower bound for the same object. Returns the removed
    /// entry; an object that is not registered is logged and ignored.
    /// Lookup listeners of the object are dropped with its last
    /// registration.
    pub fn unregister(
        &self,
        object: &Arc<dyn ManagedObject>,
        context: Option<Bytes>,
    ) -> Option<RegistryEntry> {
        let id = ObjectId::of(object.as_ref());
        let scope = ContextScope::new(context, object.scope());
        let key = scope.context().cloned();

        let removed = {
            let mut guard = self.store.lock();
            let partition = guard.partition(&key);
            let exact = partition
                .binary_search_by(|e| compare(Ordered::Scope(&e.scope), Ordered::Scope(&scope)))
                .ok()
                .filter(|&i| partition[i].id() == id);
            let position = exact.or_else(|| {
                let from = partition
                    .partition_point(|e| e.scope.scope().lower_bound() < scope.scope().lower_bound());
                partition[from..]
                    .iter()
                    .position(|e| e.id() == id)
                    .map(|offset| from + offset)
            });

            position.map(|pos| {
                let store = Arc::make_mut(&mut guard);
                let mut removed = None;
                if let Some(partition) = store.partitions.get_mut(&key) {
                    removed = Some(partition.remove(pos));
                    if partition.is_empty() {
                        store.partitions.remove(&key);
                    }
                }
                removed
            })
        };

        match removed.flatten() {
            Some(entry) => {
                tracing::info!(snmp.scope = %entry.scope, "unregistered managed object");
                // ids are addresses and get reused after the object is dropped
                if !self.snapshot().entries().any(|e| e.id() == id) {
                    self.lookup_listeners.lock().remove(&id);
                }
                Some(entry)
            }
            None => {
                tracing::warn!(snmp.scope = %scope, "unregister: object is not registered");
                None
            }
        }
    }

    /// Narrow the registered scope of `object` in `context` so it no longer
    /// overlaps `by` (see [`Scope::subtract`]).
    ///
    /// Returns `Ok(false)` if the object is not registered in `context`.
    pub fn narrow(
        &self,
        object: &Arc<dyn ManagedObject>,
        context: Option<Bytes>,
        by: &Scope,
    ) -> Result<bool> {
        let id = ObjectId::of(object.as_ref());
        let key = normalize_context(context);

        let mut guard = self.store.lock();
        let Some(pos) = guard.partition(&key).iter().position(|e| e.id() == id) else {
            return Ok(false);
        };
        let mut narrowed = guard.partition(&key)[pos].scope.clone();
        narrowed.scope_mut().subtract(by)?;

        let store = Arc::make_mut(&mut guard);
        if let Some(entry) = store.partitions.get_mut(&key).and_then(|p| p.get_mut(pos)) {
            tracing::debug!(snmp.scope = %narrowed, "narrowed registration");
            entry.scope = narrowed;
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// First registered object overlapping `query` that the query matches.
    ///
    /// A query in a named context also sees default-context registrations.
    pub fn lookup(&self, query: &Query) -> Option<RegistryEntry> {
        self.lookup_inner(query, false)
    }

    /// Like [`lookup`](Registry::lookup), without falling back to the
    /// default context.
    pub fn lookup_specific(&self, query: &Query) -> Option<RegistryEntry> {
        self.lookup_inner(query, true)
    }

    fn lookup_inner(&self, query: &Query, specific_only: bool) -> Option<RegistryEntry> {
        let store = self.snapshot();
        let context = query.context().cloned();
        let specific: &[RegistryEntry] = match &context {
            Some(_) => store.partition(&context),
            None => &[],
        };
        let fallback: &[RegistryEntry] = if context.is_none() || !specific_only {
            store.partition(&None)
        } else {
            &[]
        };

        let candidates = Merged {
            specific: overlapping(specific, query).peekable(),
            fallback: overlapping(fallback, query).peekable(),
        };

        for entry in candidates {
            let listeners = self.lookup_listeners_of(entry.id());
            let event = LookupEvent {
                object: &entry.object,
                scope: &entry.scope,
                query,
            };
            // listeners see the object before it refreshes
            if let Some(listeners) = &listeners {
                for l in listeners.snapshot().iter() {
                    l.query_event(&event);
                }
            }
            self.refresh_if_needed(entry, query);
            if query.matches(entry.object.as_ref()) {
                if let Some(listeners) = &listeners {
                    for l in listeners.snapshot().iter() {
                        l.lookup_event(&event);
                    }
                }
                tracing::trace!(snmp.query = %query, snmp.scope = %entry.scope, "lookup hit");
                return Some(entry.clone());
            }
        }
        tracing::trace!(snmp.query = %query, "lookup miss");
        None
    }

    fn refresh_if_needed(&self, entry: &RegistryEntry, query: &Query) {
        let Some(strategy) = &self.update_strategy else {
            return;
        };
        if let Some(refreshable) = entry.object.as_refreshable()
            && strategy.is_update_needed(entry.id(), query)
        {
            refreshable.update(query);
        }
    }

    /// The object serving exactly `oid` in `context`.
    pub fn get_object(&self, oid: &Oid, context: Option<Bytes>) -> Option<Arc<dyn ManagedObject>> {
        self.lookup(&Query::exact(context, oid.clone()))
            .map(|entry| entry.object)
    }

    /// Every context `object` is registered in (`None` is the default).
    pub fn registered_contexts(&self, object: &Arc<dyn ManagedObject>) -> Vec<Option<Bytes>> {
        let id = ObjectId::of(object.as_ref());
        self.snapshot()
            .partitions
            .iter()
            .filter(|(_, part)| part.iter().any(|e| e.id() == id))
            .map(|(context, _)| context.clone())
            .collect()
    }

    /// Snapshot of all registrations: default context first, then contexts
    /// in ascending order, each in scope order.
    ///
    /// Later registrations do not affect a snapshot already taken.
    pub fn iter(&self) -> std::vec::IntoIter<RegistryEntry> {
        self.snapshot()
            .entries()
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Locks
    // ------------------------------------------------------------------

    /// Acquire `object`'s lock for `owner`, waiting at most `timeout`
    /// (`Duration::ZERO` waits indefinitely). Returns `false` if the lock
    /// was not acquired.
    pub fn lock(&self, owner: LockOwner, object: &dyn ManagedObject, timeout: Duration) -> bool {
        self.lock_with_outcome(owner, object, timeout).is_acquired()
    }

    /// Like [`lock`](Registry::lock), telling a timeout apart from an
    /// interrupted wait.
    pub fn lock_with_outcome(
        &self,
        owner: LockOwner,
        object: &dyn ManagedObject,
        timeout: Duration,
    ) -> LockOutcome {
        let timeout = (!timeout.is_zero()).then_some(timeout);
        self.locks.lock(owner, ObjectId::of(object), timeout)
    }

    /// Release one hold of `owner` on `object`. A no-op if `owner` does not
    /// hold the lock.
    pub fn unlock(&self, owner: LockOwner, object: &dyn ManagedObject) -> bool {
        self.locks.unlock(owner, ObjectId::of(object))
    }

    /// Current lock state of `object`.
    pub fn lock_info(&self, object: &dyn ManagedObject) -> Option<LockInfo> {
        self.locks.info(ObjectId::of(object))
    }

    /// Wake every thread blocked in [`lock`](Registry::lock); they give up
    /// with [`LockOutcome::Interrupted`].
    pub fn interrupt_lock_waiters(&self) {
        self.locks.interrupt_waiters();
    }

    // ------------------------------------------------------------------
    // Contexts
    // ------------------------------------------------------------------

    /// Support `context`. Returns `false` if it was already supported or is
    /// empty.
    pub fn add_context(&self, context: impl Into<Bytes>) -> bool {
        let context = context.into();
        if context.is_empty() || !self.contexts.write().insert(context.clone()) {
            return false;
        }
        tracing::debug!(snmp.context = %String::from_utf8_lossy(&context), "context added");
        self.fire_context_event(ContextEvent {
            context,
            change: ContextChange::Added,
        });
        true
    }

    /// Drop support for `context`. Registrations in it are kept.
    pub fn remove_context(&self, context: &[u8]) -> bool {
        let Some(context) = self.contexts.write().take(context) else {
            return false;
        };
        tracing::debug!(snmp.context = %String::from_utf8_lossy(&context), "context removed");
        self.fire_context_event(ContextEvent {
            context,
            change: ContextChange::Removed,
        });
        true
    }

    /// Supported contexts, in ascending order. The default context is
    /// implicit and not listed.
    pub fn contexts(&self) -> Vec<Bytes> {
        self.contexts.read().iter().cloned().collect()
    }

    /// Returns `true` if requests for `context` can be served. The default
    /// context (`None` or empty) always can.
    pub fn is_context_supported(&self, context: Option<&[u8]>) -> bool {
        match context {
            None => true,
            Some(c) if c.is_empty() => true,
            Some(c) => self.contexts.read().contains(c),
        }
    }

    /// Observe changes to the context set.
    pub fn add_context_listener(&self, listener: Arc<dyn ContextListener>) {
        self.context_listeners.add(listener);
    }

    /// Stop observing the context set.
    pub fn remove_context_listener(&self, listener: &Arc<dyn ContextListener>) -> bool {
        self.context_listeners.remove(listener)
    }

    fn fire_context_event(&self, event: ContextEvent) {
        for l in self.context_listeners.snapshot().iter() {
            l.context_changed(&event);
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Observe lookups that consider `object`.
    pub fn add_lookup_listener(
        &self,
        object: &dyn ManagedObject,
        listener: Arc<dyn LookupListener>,
    ) {
        self.lookup_listeners
            .lock()
            .entry(ObjectId::of(object))
            .or_insert_with(|| Arc::new(ListenerList::new()))
            .add(listener);
    }

    /// Stop observing lookups of `object`.
    pub fn remove_lookup_listener(
        &self,
        object: &dyn ManagedObject,
        listener: &Arc<dyn LookupListener>,
    ) -> bool {
        let id = ObjectId::of(object);
        let mut map = self.lookup_listeners.lock();
        let Some(list) = map.get(&id) else {
            return false;
        };
        let removed = list.remove(listener);
        if list.is_empty() {
            map.remove(&id);
        }
        removed
    }

    fn lookup_listeners_of(&self, id: ObjectId) -> Option<Arc<ListenerList<dyn LookupListener>>> {
        self.lookup_listeners.lock().get(&id).cloned()
    }

    /// Attach `listener` to every registered object with the table
    /// capability. Returns the number of tables it was attached to.
    pub fn add_row_listener(&self, listener: Arc<dyn RowListener>) -> usize {
        let mut count = 0;
        for entry in self.iter() {
            if let Some(table) = entry.object.as_table() {
                table.add_row_listener(listener.clone());
                count += 1;
            }
        }
        count
    }

    /// Detach `listener` from every registered table. Returns the number of
    /// tables it was removed from.
    pub fn remove_row_listener(&self, listener: &Arc<dyn RowListener>) -> usize {
        self.iter()
            .filter_map(|entry| entry.object.as_table().map(|t| t.remove_row_listener(listener)))
            .filter(|removed| *removed)
            .count()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .field("contexts", &self.contexts())
            .field("locks", &self.locks.len())
            .finish()
    }
}
