//! One unit of work per addressed variable.

use crate::error::ErrorStatus;
use crate::query::Query;
use crate::registry::RegistryEntry;
use crate::scope::Scope;
use crate::value::Value;
use crate::varbind::VarBind;

/// The work for one variable binding of a [`Request`](super::Request).
///
/// Sub-requests live in the request's arena. A bulk repetition refers to the
/// sub-request it was derived from by index, never by reference.
#[derive(Debug, Clone)]
pub struct SubRequest {
    index: usize,
    varbind: VarBind,
    scope: Scope,
    predecessor: Option<usize>,
    query: Option<Query>,
    target: Option<RegistryEntry>,
    status: ErrorStatus,
    complete: bool,
    undo: Option<Value>,
    pub(crate) validated: bool,
    pub(crate) applied: bool,
    pub(crate) locked: bool,
}

impl SubRequest {
    pub(crate) fn new(index: usize, varbind: VarBind, scope: Scope) -> Self {
        Self {
            index,
            varbind,
            scope,
            predecessor: None,
            query: None,
            target: None,
            status: ErrorStatus::NoError,
            complete: false,
            undo: None,
            validated: false,
            applied: false,
            locked: false,
        }
    }

    /// Repetition of `predecessor`, searching after its resulting OID.
    ///
    /// A predecessor that ended in an exception has nothing further to
    /// offer; the repetition inherits the exception and starts complete.
    pub(crate) fn repetition_of(index: usize, predecessor_index: usize, predecessor: &SubRequest) -> Self {
        let oid = predecessor.varbind.oid.clone();
        let mut sub = if predecessor.varbind.is_exception() {
            let mut sub = Self::new(index, predecessor.varbind.clone(), Scope::after(oid));
            sub.complete = true;
            sub
        } else {
            Self::new(index, VarBind::null(oid.clone()), Scope::after(oid))
        };
        sub.predecessor = Some(predecessor_index);
        sub
    }

    /// Position of this sub-request in its request (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current variable binding: the requested OID until the sub-request
    /// completes, then the result.
    pub fn varbind(&self) -> &VarBind {
        &self.varbind
    }

    /// OID window this sub-request searches.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Index of the sub-request this repetition was derived from.
    pub fn predecessor(&self) -> Option<usize> {
        self.predecessor
    }

    /// Query the engine resolved the target with.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Store the query used to resolve the target.
    pub fn set_query(&mut self, query: Query) {
        self.query = Some(query);
    }

    /// Registry entry of the object handling this variable.
    pub fn target(&self) -> Option<&RegistryEntry> {
        self.target.as_ref()
    }

    /// Record the object handling this variable.
    pub fn set_target(&mut self, target: RegistryEntry) {
        self.target = Some(target);
    }

    /// Per-variable status, `NoError` unless [`set_error`](Self::set_error)
    /// was called.
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Returns `true` if this variable failed.
    pub fn has_error(&self) -> bool {
        self.status.is_error()
    }

    /// Record a failure. The sub-request counts as complete afterwards.
    pub fn set_error(&mut self, status: ErrorStatus) {
        self.status = status;
        self.complete = true;
    }

    /// Returns `true` once the variable has a final result or error.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Mark the sub-request complete without changing its binding.
    pub fn complete(&mut self) {
        self.complete = true;
    }

    /// Store the result and mark the sub-request complete.
    pub fn complete_with(&mut self, varbind: VarBind) {
        self.varbind = varbind;
        self.complete = true;
    }

    /// Replace only the value of the binding (keeps the OID).
    pub fn complete_with_value(&mut self, value: Value) {
        self.varbind.value = value;
        self.complete = true;
    }

    /// State recorded by a write for reverting it.
    pub fn undo_value(&self) -> Option<&Value> {
        self.undo.as_ref()
    }

    pub(crate) fn undo_slot(&mut self) -> &mut Option<Value> {
        &mut self.undo
    }
}
