//! Refresh policies for lazily updated objects.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::query::Query;

use super::ObjectId;

/// Decides whether a [`Refreshable`](crate::handler::Refreshable) object
/// must be updated before it is matched against a query.
pub trait UpdateStrategy: Send + Sync {
    /// Returns `true` if `object` should refresh for `query`.
    fn is_update_needed(&self, object: ObjectId, query: &Query) -> bool;
}

/// Refresh on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysUpdate;

impl UpdateStrategy for AlwaysUpdate {
    fn is_update_needed(&self, _object: ObjectId, _query: &Query) -> bool {
        true
    }
}

/// Refresh once per issuing operation.
///
/// Remembers the last query source seen for each object and only asks for
/// a refresh when it changes. Queries without a source always refresh.
#[derive(Debug, Default)]
pub struct SourceChangeUpdate {
    last_source: Mutex<HashMap<ObjectId, u64>>,
}

impl SourceChangeUpdate {
    /// Create the strategy with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the history of `object`.
    pub fn forget(&self, object: ObjectId) {
        self.last_source.lock().remove(&object);
    }
}

impl UpdateStrategy for SourceChangeUpdate {
    fn is_update_needed(&self, object: ObjectId, query: &Query) -> bool {
        let Some(source) = query.source() else {
            return true;
        };
        self.last_source.lock().insert(object, source) != Some(source)
    }
}
